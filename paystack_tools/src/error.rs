use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaystackApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid transaction reference: {0}")]
    InvalidReference(String),
    #[error("Could not reach the gateway: {0}")]
    RestRequestError(String),
    #[error("The gateway did not respond in time: {0}")]
    Timeout(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl PaystackApiError {
    /// Transient failures that are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RestRequestError(_) | Self::Timeout(_) => true,
            Self::QueryError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for PaystackApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::JsonError(e.to_string())
        } else {
            Self::RestRequestError(e.to_string())
        }
    }
}
