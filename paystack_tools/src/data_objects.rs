use fee_common::Kobo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The outer object of every Paystack response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PaystackEnvelope {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// The subset of the Paystack transaction object that receipts and records are built from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaystackTransaction {
    /// "success", "failed", "abandoned", "ongoing", "pending", "reversed" ...
    pub status: String,
    pub reference: String,
    pub amount: Kobo,
    /// e.g. "2024-01-01T10:00:00.000Z". Absent for transactions that were never paid.
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
    pub customer: PaystackCustomer,
    #[serde(default)]
    pub authorization: Option<PaystackAuthorization>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaystackCustomer {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaystackAuthorization {
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
}

impl PaystackTransaction {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    pub fn bank(&self) -> Option<&str> {
        self.authorization.as_ref().and_then(|a| a.bank.as_deref())
    }
}

/// The outcome of a verification call that reached Paystack and received a 2xx response.
///
/// `success` is true iff Paystack reports the transaction status as `"success"`. Any other status, or a `data` object
/// that is missing or cannot be read, produces `success == false`. Callers must branch on this flag; it is not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub success: bool,
    /// The transaction status reported by the gateway, if one could be read.
    pub status: Option<String>,
    /// The gateway's message, or a description of why the payload could not be read.
    pub message: String,
    pub payload: Option<PaystackTransaction>,
}

impl VerificationResult {
    pub(crate) fn from_envelope(envelope: PaystackEnvelope) -> Self {
        let PaystackEnvelope { message, data, .. } = envelope;
        let data = match data {
            Some(d) if d.is_object() => d,
            _ => return Self::unreadable(format!("Response has no transaction data. {message}")),
        };
        let status = data.get("status").and_then(Value::as_str).map(String::from);
        match serde_json::from_value::<PaystackTransaction>(data) {
            Ok(tx) => Self { success: tx.is_success(), status, message, payload: Some(tx) },
            Err(e) => Self { success: false, status, message: format!("Malformed transaction data. {e}"), payload: None },
        }
    }

    pub(crate) fn unreadable<S: Into<String>>(message: S) -> Self {
        Self { success: false, status: None, message: message.into(), payload: None }
    }
}
