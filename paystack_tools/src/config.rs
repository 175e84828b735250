use std::time::Duration;

use fee_common::{helpers::parse_env_var, Secret};
use log::*;

pub const DEFAULT_PAYSTACK_BASE_URL: &str = "https://api.paystack.co";
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct PaystackConfig {
    /// e.g. "https://api.paystack.co". Tests point this at a local server.
    pub base_url: String,
    /// The secret key sent as the bearer credential on every request.
    pub secret_key: Secret<String>,
    /// Applied to every individual request, including retries.
    pub timeout: Duration,
    /// How many times a transient failure is retried. Zero disables retries.
    pub max_retries: u32,
    /// The first backoff pause. It doubles on every subsequent retry.
    pub retry_base_delay: Duration,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PAYSTACK_BASE_URL.to_string(),
            secret_key: Secret::default(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

impl PaystackConfig {
    pub fn new<S: Into<String>>(base_url: S, secret_key: Secret<String>) -> Self {
        Self { base_url: base_url.into(), secret_key, ..Default::default() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay = base_delay;
        self
    }

    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("FEE_PAYSTACK_BASE_URL").unwrap_or_else(|_| {
            debug!("🪛️ FEE_PAYSTACK_BASE_URL not set, using {DEFAULT_PAYSTACK_BASE_URL}");
            DEFAULT_PAYSTACK_BASE_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("FEE_PAYSTACK_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ FEE_PAYSTACK_SECRET_KEY not set. Every verification request will be rejected by Paystack.");
            String::default()
        }));
        let timeout = parse_env_var::<u64>("FEE_GATEWAY_TIMEOUT_MS")
            .unwrap_or_else(|e| {
                warn!("🪛️ {e}. Using the default gateway timeout.");
                None
            })
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);
        let max_retries = parse_env_var::<u32>("FEE_GATEWAY_MAX_RETRIES")
            .unwrap_or_else(|e| {
                warn!("🪛️ {e}. Using the default number of gateway retries.");
                None
            })
            .unwrap_or(defaults.max_retries);
        Self { base_url, secret_key, timeout, max_retries, retry_base_delay: defaults.retry_base_delay }
    }
}
