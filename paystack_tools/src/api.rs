use std::sync::Arc;

use fee_common::helpers::is_valid_reference;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{
    config::PaystackConfig,
    data_objects::PaystackEnvelope,
    helpers::backoff_delay,
    PaystackApiError,
    VerificationResult,
};

#[derive(Clone)]
pub struct PaystackApi {
    config: PaystackConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for PaystackApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaystackApi ({})", self.config.base_url)
    }
}

impl PaystackApi {
    pub fn new(config: PaystackConfig) -> Result<Self, PaystackApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaystackApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PaystackConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Sends a request to the Paystack API, retrying transient failures with an exponential backoff.
    pub async fn rest_query<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, PaystackApiError> {
        let mut attempt = 0;
        loop {
            match self.send_once::<T>(method.clone(), path).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = backoff_delay(self.config.retry_base_delay, attempt);
                    attempt += 1;
                    warn!(
                        "💳️ Paystack request to {path} failed ({e}). Retry {attempt}/{} in {}ms",
                        self.config.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                },
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, PaystackApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let response = self.client.request(method, url).send().await?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ REST query successful. {status}");
            let body = response.text().await?;
            serde_json::from_str::<T>(&body).map_err(|e| PaystackApiError::JsonError(e.to_string()))
        } else {
            let message = response.text().await.unwrap_or_else(|e| format!("Could not read response body. {e}"));
            Err(PaystackApiError::QueryError { status: status.as_u16(), message })
        }
    }

    /// Asks Paystack for the status of the transaction identified by `reference`.
    ///
    /// A non-2xx response (after retries) is an error. A 2xx response always produces a [`VerificationResult`], even
    /// when the payload is missing or malformed; check [`VerificationResult::success`].
    pub async fn verify_transaction(&self, reference: &str) -> Result<VerificationResult, PaystackApiError> {
        if !is_valid_reference(reference) {
            return Err(PaystackApiError::InvalidReference(reference.to_string()));
        }
        let path = format!("/transaction/verify/{}", urlencoding::encode(reference));
        debug!("💳️ Verifying transaction {reference}");
        let result = match self.rest_query::<PaystackEnvelope>(Method::GET, &path).await {
            Ok(envelope) => VerificationResult::from_envelope(envelope),
            Err(PaystackApiError::JsonError(e)) => {
                warn!("💳️ Paystack returned an unreadable verification response for {reference}. {e}");
                VerificationResult::unreadable(format!("Unreadable response. {e}"))
            },
            Err(e) => return Err(e),
        };
        info!(
            "💳️ Transaction {reference} verified. Status: {}",
            result.status.as_deref().unwrap_or("unknown")
        );
        Ok(result)
    }
}
