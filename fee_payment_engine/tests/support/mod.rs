#![allow(dead_code)]
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
};

use fee_payment_engine::{
    db_types::{Kobo, VerifiedPayment},
    GatewayError,
    GatewayVerification,
    NotifyError,
    PaymentVerifier,
    ReceiptNotifier,
};
pub use fee_payment_engine::test_utils::prepare_env::{prepare_test_env, TestEnv};

pub fn verified_payment(reference: &str, email: &str, amount: i64) -> VerifiedPayment {
    VerifiedPayment {
        reference: reference.to_string(),
        email: email.to_string(),
        payer_name: "Ada".to_string(),
        amount: Kobo::from(amount),
        status: "success".to_string(),
        paid_at: Some("2024-01-15T10:30:00.000Z".to_string()),
        channel: Some("card".to_string()),
        bank: Some("Test Bank".to_string()),
    }
}

/// A gateway with canned answers. Unknown references are reported as unavailable.
#[derive(Clone, Default)]
pub struct FakeGateway {
    answers: Arc<Mutex<HashMap<String, Result<GatewayVerification, GatewayError>>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeGateway {
    pub fn with_answer(self, reference: &str, answer: Result<GatewayVerification, GatewayError>) -> Self {
        self.answers.lock().unwrap().insert(reference.to_string(), answer);
        self
    }

    pub fn paid(self, payment: VerifiedPayment) -> Self {
        let reference = payment.reference.clone();
        self.with_answer(&reference, Ok(GatewayVerification::confirmed(payment)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentVerifier for FakeGateway {
    async fn verify(&self, reference: &str) -> Result<GatewayVerification, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.answers
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .unwrap_or_else(|| Err(GatewayError::Unavailable(format!("no answer for {reference}"))))
    }
}

/// Remembers every receipt it was asked to send, and can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, PathBuf)>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(String, PathBuf)> {
        self.sent.lock().unwrap().clone()
    }
}

impl ReceiptNotifier for RecordingNotifier {
    async fn send(&self, to: &str, document: &Path) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::TransportError("connection refused".into()));
        }
        self.sent.lock().unwrap().push((to.to_string(), document.to_path_buf()));
        Ok(())
    }
}
