//! Email service for sending verification codes and order receipts.
//!
//! Uses SMTP via lettre. The service is optional: without SMTP configured
//! the OTP flow logs the code instead of mailing it, which keeps local
//! development free of mail infrastructure.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send an email verification code.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send.
    pub async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let body = format!(
            "Your VeriQuick verification code is: {code}\n\n\
             The code expires in 10 minutes. If you did not request it, you\n\
             can ignore this email.\n"
        );

        self.send_plain_email(to, "Your VeriQuick verification code", &body)
            .await
    }

    /// Send an order activation receipt.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send.
    pub async fn send_order_receipt(
        &self,
        to: &str,
        order_ref: &str,
        service_name: &str,
        amount: &str,
    ) -> Result<(), EmailError> {
        let body = format!(
            "Thanks for your purchase!\n\n\
             Order: {order_ref}\n\
             Service: {service_name}\n\
             Amount paid: {amount}\n\n\
             Your service is now active. You can view your orders and\n\
             remaining verifications from your account dashboard.\n"
        );

        self.send_plain_email(to, &format!("Order {order_ref} is active"), &body)
            .await
    }

    /// Send a plain text email.
    async fn send_plain_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.mailer.send(email).await?;
        tracing::debug!(to = %to, subject = %subject, "email sent");

        Ok(())
    }
}
