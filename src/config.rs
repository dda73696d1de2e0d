use std::time::Duration;

use crate::gateway::{Result, error::GatewayError};

pub const DEFAULT_BASE_URL: &str = "https://api.mundipagg.com/core/v1/";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the gateway needs to talk to the processor
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    /// Test and live environments share this url
    pub base_url: String,
    pub default_currency: String,
    /// Reported back on every response
    pub test: bool,
    pub timeout: Duration,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("default_currency", &self.default_currency)
            .field("test", &self.test)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GatewayError::MissingConfig("api_key"));
        }
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_owned(),
            default_currency: DEFAULT_CURRENCY.to_owned(),
            test: false,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `MUNDIPAGG_*` variables, only the api key is required
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MUNDIPAGG_API_KEY")
            .map_err(|_| GatewayError::MissingConfig("MUNDIPAGG_API_KEY"))?;
        let mut config = Self::new(api_key)
            .map_err(|_| GatewayError::MissingConfig("MUNDIPAGG_API_KEY"))?;

        if let Ok(base_url) = std::env::var("MUNDIPAGG_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(currency) = std::env::var("MUNDIPAGG_CURRENCY") {
            config = config.with_default_currency(currency);
        }
        if let Ok(test) = std::env::var("MUNDIPAGG_TEST") {
            config = config.with_test(matches!(test.to_lowercase().as_str(), "1" | "true" | "yes"));
        }
        match std::env::var("MUNDIPAGG_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            Ok(Ok(secs)) if secs > 0 => config = config.with_timeout(Duration::from_secs(secs)),
            Ok(_) => tracing::warn!("Invalid MUNDIPAGG_TIMEOUT_SECS, using default timeout"),
            Err(_) => {}
        }
        tracing::debug!(
            base_url = %config.base_url,
            currency = %config.default_currency,
            test = config.test,
            "Loaded gateway configuration"
        );
        Ok(config)
    }
}
