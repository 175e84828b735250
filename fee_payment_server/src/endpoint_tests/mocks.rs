use std::path::Path;

use fee_payment_engine::{
    db_types::VerifiedPayment,
    traits::{
        GatewayError,
        GatewayVerification,
        NotifyError,
        PaymentVerifier,
        ReceiptLocation,
        ReceiptNotifier,
        ReceiptRenderer,
        RenderError,
    },
};
use mockall::mock;

mock! {
    pub Verifier {}
    impl PaymentVerifier for Verifier {
        async fn verify(&self, reference: &str) -> Result<GatewayVerification, GatewayError>;
    }
}

mock! {
    pub Renderer {}
    impl ReceiptRenderer for Renderer {
        async fn render(&self, payment: &VerifiedPayment) -> Result<ReceiptLocation, RenderError>;
    }
}

mock! {
    pub Notifier {}
    impl ReceiptNotifier for Notifier {
        async fn send(&self, to: &str, document: &Path) -> Result<(), NotifyError>;
    }
}

/// Backends that fail the test if they are used at all.
pub fn unused_backends() -> (MockVerifier, MockRenderer, MockNotifier) {
    let mut gateway = MockVerifier::new();
    gateway.expect_verify().never();
    let mut renderer = MockRenderer::new();
    renderer.expect_render().never();
    let mut notifier = MockNotifier::new();
    notifier.expect_send().never();
    (gateway, renderer, notifier)
}
