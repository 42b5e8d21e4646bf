//! Admin user management commands.

use veriquick_api::db::users::UserRepository;
use veriquick_api::services::auth::hash_password;
use veriquick_core::Email;

use super::CommandError;

/// Create an admin user.
///
/// The account is created with the `admin` role, a verified email and an
/// argon2-hashed password (same parameters as the API's auth service).
///
/// # Errors
///
/// Returns an error when the email is invalid, already registered, or the
/// database write fails.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let email =
        Email::parse(email).map_err(|e| CommandError::InvalidInput(format!("email: {e}")))?;

    if password.len() < 8 {
        return Err(CommandError::InvalidInput(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let pool = super::connect().await?;
    let users = UserRepository::new(&pool);

    let password_hash = hash_password(password)?;
    let user = users.create(&email, &password_hash, name, None).await?;

    sqlx::query("UPDATE users SET role = 'admin', email_verified = TRUE WHERE id = $1")
        .bind(user.id.as_i32())
        .execute(&pool)
        .await?;

    tracing::info!(user_id = %user.id, email = %email, "admin user created");
    Ok(())
}
