//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use veriquick_core::VerificationKind;

use crate::config::ApiConfig;
use crate::models::pricing::PricingPlan;
use crate::providers::{GridlinesClient, ProviderError, QuickEkycClient};
use crate::services::email::EmailService;
use crate::services::razorpay::{RazorpayClient, RazorpayError};

/// Pricing catalog cache TTL. Prices change through the admin surface a few
/// times a month at most.
const PRICING_CACHE_TTL: Duration = Duration::from_secs(300);

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("razorpay client: {0}")]
    Razorpay(#[from] RazorpayError),
    #[error("provider client: {0}")]
    Provider(#[from] ProviderError),
    #[error("smtp transport: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    razorpay: RazorpayClient,
    gridlines: GridlinesClient,
    quickekyc: QuickEkycClient,
    email: Option<EmailService>,
    pricing_cache: Cache<VerificationKind, PricingPlan>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the outbound clients fail to build.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        let razorpay = RazorpayClient::new(&config.razorpay)?;
        let gridlines = GridlinesClient::new(&config.providers)?;
        let quickekyc = QuickEkycClient::new(&config.providers)?;
        let email = config.email.as_ref().map(EmailService::new).transpose()?;

        let pricing_cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(PRICING_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                razorpay,
                gridlines,
                quickekyc,
                email,
                pricing_cache,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Razorpay client.
    #[must_use]
    pub fn razorpay(&self) -> &RazorpayClient {
        &self.inner.razorpay
    }

    /// Get a reference to the Gridlines provider client.
    #[must_use]
    pub fn gridlines(&self) -> &GridlinesClient {
        &self.inner.gridlines
    }

    /// Get a reference to the `QuickEKYC` provider client.
    #[must_use]
    pub fn quickekyc(&self) -> &QuickEkycClient {
        &self.inner.quickekyc
    }

    /// Get a reference to the email service, when SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Get a reference to the pricing catalog cache.
    #[must_use]
    pub fn pricing_cache(&self) -> &Cache<VerificationKind, PricingPlan> {
        &self.inner.pricing_cache
    }
}
