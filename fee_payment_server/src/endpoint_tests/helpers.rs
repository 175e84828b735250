use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use actix_web::{
    body::MessageBody,
    cookie::Cookie,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    App,
    ResponseError,
};
use fee_payment_engine::{
    db_types::{Kobo, VerifiedPayment},
    receipts::receipt_file_name,
    test_utils::prepare_env::{prepare_test_env, TestEnv},
    traits::{GatewayVerification, PaymentVerifier, ReceiptLocation, ReceiptNotifier, ReceiptRenderer},
    FulfillmentApi,
    PaymentsApi,
    ReferenceLocks,
    SqliteDatabase,
};

use super::mocks::{MockNotifier, MockRenderer, MockVerifier};
use crate::{
    auth::{ReceiptLinkSigner, TokenIssuer},
    config::{AdminCredentials, AuthConfig, ServerOptions},
    data_objects::ReceiptDirectory,
    routes::{
        admin_login,
        health,
        logout,
        receipt,
        thank_you,
        DashboardRoute,
        SavePaymentRoute,
        StalledFulfillmentsRoute,
        VerifyPaymentRoute,
    },
    server::{form_config, json_config},
};

pub const ADMIN_USER: &str = "bursar";
pub const ADMIN_PASS: &str = "correct horse battery staple";

// Only used to sign test tokens. DO NOT re-use this key anywhere.
pub fn auth_config() -> AuthConfig {
    AuthConfig::new("endpoint-tests-4e1f0c7b9d2a")
}

pub struct TestServer {
    pub env: TestEnv,
    pub issuer: TokenIssuer,
    pub signer: ReceiptLinkSigner,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub cookies: Vec<Cookie<'static>>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| panic!("Not JSON ({e}): {}", self.text()))
    }
}

impl TestServer {
    pub async fn new() -> Self {
        let env = prepare_test_env().await;
        let config = auth_config();
        Self { env, issuer: TokenIssuer::new(&config), signer: ReceiptLinkSigner::new(&config) }
    }

    pub fn db(&self) -> &SqliteDatabase {
        &self.env.db
    }

    pub fn receipt_dir(&self) -> PathBuf {
        self.env.receipt_dir()
    }

    pub fn admin_token(&self) -> String {
        self.issuer.issue(ADMIN_USER).expect("Could not issue token").0
    }

    /// Runs `requests` in order against one app instance, so that mock expectations span all of them.
    pub async fn call_all<G, R, N>(
        &self,
        gateway: G,
        renderer: R,
        notifier: N,
        requests: Vec<TestRequest>,
    ) -> Vec<TestResponse>
    where
        G: PaymentVerifier + 'static,
        R: ReceiptRenderer + 'static,
        N: ReceiptNotifier + 'static,
    {
        let db = self.env.db.clone();
        let api = FulfillmentApi::new(db.clone(), gateway, renderer, notifier, ReferenceLocks::new());
        let app = App::new()
            .app_data(json_config())
            .app_data(form_config())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(PaymentsApi::new(db)))
            .app_data(web::Data::new(self.issuer.clone()))
            .app_data(web::Data::new(self.signer.clone()))
            .app_data(web::Data::new(AdminCredentials::new(ADMIN_USER, ADMIN_PASS)))
            .app_data(web::Data::new(ServerOptions::default()))
            .app_data(web::Data::new(ReceiptDirectory::new(self.receipt_dir())))
            .service(health)
            .service(admin_login)
            .service(logout)
            .service(thank_you)
            .service(receipt)
            .service(SavePaymentRoute::<SqliteDatabase>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, G, R, N>::new())
            .service(DashboardRoute::<SqliteDatabase>::new())
            .service(StalledFulfillmentsRoute::<SqliteDatabase>::new());
        let service = test::init_service(app).await;
        let mut responses = Vec::with_capacity(requests.len());
        for req in requests {
            let response = match test::try_call_service(&service, req.to_request()).await {
                Ok(res) => {
                    let status = res.status();
                    let content_type = content_type(res.headers());
                    let cookies = res.response().cookies().map(|c| c.into_owned()).collect();
                    let body = res.into_body().try_into_bytes().map(|b| b.to_vec()).unwrap_or_default();
                    TestResponse { status, content_type, cookies, body }
                },
                // Errors raised by middleware never reach a handler, so they are rendered here
                Err(e) => {
                    let res = e.as_response_error().error_response();
                    let status = res.status();
                    let content_type = content_type(res.headers());
                    let body = res.into_body().try_into_bytes().map(|b| b.to_vec()).unwrap_or_default();
                    TestResponse { status, content_type, cookies: vec![], body }
                },
            };
            responses.push(response);
        }
        responses
    }

    pub async fn call<G, R, N>(&self, gateway: G, renderer: R, notifier: N, request: TestRequest) -> TestResponse
    where
        G: PaymentVerifier + 'static,
        R: ReceiptRenderer + 'static,
        N: ReceiptNotifier + 'static,
    {
        let mut responses = self.call_all(gateway, renderer, notifier, vec![request]).await;
        responses.remove(0)
    }
}

fn content_type(headers: &actix_web::http::header::HeaderMap) -> Option<String> {
    headers.get("content-type").and_then(|v| v.to_str().ok()).map(String::from)
}

pub fn paid(reference: &str, email: &str, amount: i64) -> VerifiedPayment {
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

/// A gateway that confirms `payment` every time it is asked, and expects to be asked `times` times.
pub fn confirming_gateway(payment: VerifiedPayment, times: usize) -> MockVerifier {
    let mut gateway = MockVerifier::new();
    gateway.expect_verify().times(times).returning(move |_| Ok(GatewayVerification::confirmed(payment.clone())));
    gateway
}

/// A renderer that writes a small stand-in PDF to `dir`.
pub fn writing_renderer(dir: PathBuf, times: usize) -> MockRenderer {
    let mut renderer = MockRenderer::new();
    renderer.expect_render().times(times).returning(move |payment| {
        let file_name = receipt_file_name(&payment.reference)?;
        std::fs::create_dir_all(&dir).expect("Could not create receipt dir");
        let path = dir.join(file_name);
        std::fs::write(&path, pdf_bytes(&payment.reference)).expect("Could not write receipt");
        Ok(ReceiptLocation::new(path))
    });
    renderer
}

pub fn pdf_bytes(reference: &str) -> Vec<u8> {
    format!("%PDF-1.3\n% receipt for {reference}\n%%EOF\n").into_bytes()
}

/// A notifier that records every (recipient, attachment file name) it is asked to send.
pub fn recording_notifier(times: usize) -> (MockNotifier, Arc<Mutex<Vec<(String, String)>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&sent);
    let mut notifier = MockNotifier::new();
    notifier.expect_send().times(times).returning(move |to, document| {
        let file_name = document.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
        log.lock().unwrap().push((to.to_string(), file_name));
        Ok(())
    });
    (notifier, sent)
}
