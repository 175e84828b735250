use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use fee_payment_engine::{FulfillmentError, PaymentStoreError};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Missing reference")]
    MissingReference,
    #[error("{0}")]
    ValidationError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("The payment was not confirmed. {0}")]
    PaymentNotConfirmed(String),
    #[error("Verification failed")]
    VerificationFailed,
    #[error("{0}")]
    FulfillmentFailed(String),
    #[error("A successful payment with reference {0} already exists")]
    DuplicatePayment(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingReference => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::PaymentNotConfirmed(_) => StatusCode::BAD_REQUEST,
            Self::DuplicatePayment(_) => StatusCode::CONFLICT,
            Self::AuthenticationError(e) => match e {
                AuthError::SigningError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::VerificationFailed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FulfillmentFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::PaymentNotConfirmed(reason) => json!({ "status": "failed", "message": reason }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

impl From<FulfillmentError> for ServerError {
    fn from(e: FulfillmentError) -> Self {
        match e {
            FulfillmentError::ValidationError(msg) if msg == "Missing reference" => Self::MissingReference,
            FulfillmentError::ValidationError(msg) => Self::ValidationError(msg),
            FulfillmentError::VerificationRejected { reason, .. } => Self::PaymentNotConfirmed(reason),
            FulfillmentError::GatewayUnavailable { .. } => Self::VerificationFailed,
            FulfillmentError::StorageError(e) => Self::from(e),
            e @ (FulfillmentError::RenderFailed { .. } | FulfillmentError::NotifyFailed { .. }) => {
                Self::FulfillmentFailed(e.to_string())
            },
            FulfillmentError::FulfillmentNotFound(reference) => Self::NoRecordFound(reference),
        }
    }
}

impl From<PaymentStoreError> for ServerError {
    fn from(e: PaymentStoreError) -> Self {
        match e {
            PaymentStoreError::FulfillmentNotFound(reference) => Self::NoRecordFound(reference),
            e => {
                error!("🗃️ {e}");
                Self::BackendError(e.to_string())
            },
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is not in the correct format.")]
    MalformedToken,
    #[error("Signature is invalid.")]
    InvalidSignature,
    #[error("The token or link has expired.")]
    Expired,
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("Could not sign or check a token. {0}")]
    SigningError(String),
}
