use actix_web::{http::StatusCode, test::TestRequest};
use fee_payment_engine::{
    db_types::{FulfillmentStage, Kobo},
    traits::{FulfillmentStore, GatewayError, GatewayVerification, NotifyError, PaymentStore},
};
use serde_json::json;

use super::{helpers::*, mocks::*};
use crate::auth::ACCESS_TOKEN_NAME;

fn verify_request(body: serde_json::Value) -> TestRequest {
    TestRequest::post().uri("/verify_payment").set_json(body)
}

#[actix_web::test]
async fn verify_payment_txn100() {
    let server = TestServer::new().await;
    let gateway = confirming_gateway(paid("TXN100", "a@x.com", 500_000), 1);
    let renderer = writing_renderer(server.receipt_dir(), 1);
    let (notifier, sent) = recording_notifier(1);
    let res = server
        .call(gateway, renderer, notifier, verify_request(json!({"reference": "TXN100", "student_id": "S-42"})))
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    let body = res.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["reference"], "TXN100");
    assert_eq!(body["amount"], 500_000);
    let url = body["receipt_url"].as_str().unwrap();
    assert!(url.starts_with("/receipts/receipt-TXN100.pdf?expires="), "{url}");
    assert!(url.contains("&signature="));

    let sent = sent.lock().unwrap().clone();
    assert_eq!(sent, vec![("a@x.com".to_string(), "receipt-TXN100.pdf".to_string())]);

    let payments = server.db().fetch_all_payments().await.unwrap();
    assert_eq!(payments.len(), 1);
    let record = &payments[0];
    assert_eq!(record.reference, "TXN100");
    assert_eq!(record.amount, Kobo::from(500_000));
    assert_eq!(record.status, "success");
    assert_eq!(record.email, "a@x.com");
    assert_eq!(record.student_id.as_deref(), Some("S-42"));
    assert!(record.verified);

    let fulfillment = server.db().fetch_fulfillment("TXN100").await.unwrap().unwrap();
    assert_eq!(fulfillment.stage, FulfillmentStage::Notified);
}

#[actix_web::test]
async fn signed_receipt_url_downloads_the_receipt() {
    let server = TestServer::new().await;
    let gateway = confirming_gateway(paid("TXN200", "b@x.com", 250_000), 1);
    let renderer = writing_renderer(server.receipt_dir(), 1);
    let (notifier, _) = recording_notifier(1);
    let res = server.call(gateway, renderer, notifier, verify_request(json!({"reference": "TXN200"}))).await;
    assert_eq!(res.status, StatusCode::OK);
    let url = res.json()["receipt_url"].as_str().unwrap().to_string();

    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, TestRequest::get().uri(&url)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    assert_eq!(res.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(res.body, pdf_bytes("TXN200"));
}

#[actix_web::test]
async fn missing_reference() {
    let server = TestServer::new().await;
    for body in [json!({}), json!({"reference": ""}), json!({"reference": "   ", "student_id": "S-1"})] {
        let (gateway, renderer, notifier) = unused_backends();
        let res = server.call(gateway, renderer, notifier, verify_request(body)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json(), json!({"error": "Missing reference"}));
    }
    assert!(server.db().fetch_all_payments().await.unwrap().is_empty());
}

#[actix_web::test]
async fn unsafe_reference_is_refused_before_the_gateway() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, verify_request(json!({"reference": "../../etc/passwd"}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().contains("Invalid reference"));
}

#[actix_web::test]
async fn malformed_body() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let req = TestRequest::post()
        .uri("/verify_payment")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"reference\": ");
    let res = server.call(gateway, renderer, notifier, req).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().starts_with("Could not read request body"));
}

#[actix_web::test]
async fn unconfirmed_payment() {
    let server = TestServer::new().await;
    let mut gateway = MockVerifier::new();
    gateway
        .expect_verify()
        .times(1)
        .returning(|_| Ok(GatewayVerification::rejected(Some("abandoned".into()), "Payment was abandoned")));
    let (_, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, verify_request(json!({"reference": "TXN300"}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["status"], "failed");
    assert!(server.db().fetch_all_payments().await.unwrap().is_empty());
}

#[actix_web::test]
async fn gateway_unavailable() {
    let server = TestServer::new().await;
    let mut gateway = MockVerifier::new();
    gateway.expect_verify().times(1).returning(|_| Err(GatewayError::Unavailable("HTTP 503".into())));
    let (_, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, verify_request(json!({"reference": "TXN400"}))).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({"error": "Verification failed"}));
    assert!(server.db().fetch_all_payments().await.unwrap().is_empty());
}

#[actix_web::test]
async fn failed_email_is_reported_and_left_for_reconciliation() {
    let server = TestServer::new().await;
    let gateway = confirming_gateway(paid("TXN500", "c@x.com", 100_000), 1);
    let renderer = writing_renderer(server.receipt_dir(), 1);
    let mut notifier = MockNotifier::new();
    notifier.expect_send().times(1).returning(|_, _| Err(NotifyError::TransportError("relay is down".into())));
    let res = server.call(gateway, renderer, notifier, verify_request(json!({"reference": "TXN500"}))).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = res.json()["error"].as_str().unwrap().to_string();
    assert!(error.contains("was recorded"), "{error}");

    // The payment is stored, and the fulfillment waits at the documented stage
    let record = server.db().fetch_payment_by_reference("TXN500").await.unwrap();
    assert!(record.is_some());
    let (gateway, renderer, notifier) = unused_backends();
    let req = TestRequest::get().uri("/api/fulfillments/stalled").insert_header((ACCESS_TOKEN_NAME, server.admin_token()));
    let res = server.call(gateway, renderer, notifier, req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    let stalled = res.json();
    assert_eq!(stalled.as_array().unwrap().len(), 1);
    assert_eq!(stalled[0]["reference"], "TXN500");
    assert_eq!(stalled[0]["stage"], "documented");
    assert_eq!(stalled[0]["attempts"], 1);
}

#[actix_web::test]
async fn verifying_twice_sends_one_receipt() {
    let server = TestServer::new().await;
    let gateway = confirming_gateway(paid("TXN600", "d@x.com", 75_000), 2);
    let renderer = writing_renderer(server.receipt_dir(), 1);
    let (notifier, sent) = recording_notifier(1);
    let responses = server
        .call_all(gateway, renderer, notifier, vec![
            verify_request(json!({"reference": "TXN600"})),
            verify_request(json!({"reference": "TXN600"})),
        ])
        .await;
    for res in &responses {
        assert_eq!(res.status, StatusCode::OK, "{}", res.text());
        assert_eq!(res.json()["status"], "success");
    }
    assert!(responses[1].json()["message"].as_str().unwrap().contains("already verified"));
    assert_eq!(sent.lock().unwrap().len(), 1);
    assert_eq!(server.db().fetch_all_payments().await.unwrap().len(), 1);
}

//----------------------------------------------   save_payment  ------------------------------------------------
fn save_request(reference: &str, status: &str) -> TestRequest {
    TestRequest::post().uri("/save_payment").set_json(json!({
        "student_id": "S-7",
        "name": "Ada",
        "email": "a@x.com",
        "amount": 500000,
        "reference": reference,
        "status": status,
    }))
}

#[actix_web::test]
async fn save_payment_stores_the_record_as_given() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, save_request("RAW1", "success")).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    assert_eq!(res.json()["message"], "Payment saved");

    let payments = server.db().fetch_all_payments().await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].reference, "RAW1");
    assert_eq!(payments[0].status, "success");
    assert_eq!(payments[0].name, "Ada");
    assert_eq!(payments[0].student_id.as_deref(), Some("S-7"));
    assert_eq!(payments[0].amount, Kobo::from(500_000));
}

#[actix_web::test]
async fn save_payment_duplicates() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let responses = server
        .call_all(gateway, renderer, notifier, vec![
            save_request("RAW2", "success"),
            save_request("RAW2", "success"),
            save_request("RAW3", "failed"),
            save_request("RAW3", "failed"),
        ])
        .await;
    let statuses = responses.iter().map(|r| r.status).collect::<Vec<_>>();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT, StatusCode::OK, StatusCode::OK]);
    assert_eq!(server.db().fetch_all_payments().await.unwrap().len(), 3);
}

#[actix_web::test]
async fn saved_payment_does_not_answer_for_the_gateway() {
    let server = TestServer::new().await;
    let forged = TestRequest::post().uri("/save_payment").set_json(json!({
        "name": "Mallory",
        "email": "m@evil.com",
        "amount": 1,
        "reference": "TXN100",
        "status": "success",
        "verified": true,
    }));
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, forged).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());

    let gateway = confirming_gateway(paid("TXN100", "a@x.com", 500_000), 1);
    let renderer = writing_renderer(server.receipt_dir(), 1);
    let (notifier, sent) = recording_notifier(1);
    let res = server.call(gateway, renderer, notifier, verify_request(json!({"reference": "TXN100"}))).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    assert_eq!(res.json()["amount"], 500_000);
    assert_eq!(sent.lock().unwrap()[0].0, "a@x.com");

    let payments = server.db().fetch_all_payments().await.unwrap();
    assert_eq!(payments.len(), 2);
    assert!(payments[0].verified);
    assert_eq!(payments[0].email, "a@x.com");
    assert!(!payments[1].verified);

    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, save_request("TXN100", "success")).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn save_payment_requires_a_reference() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, save_request(" ", "success")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"error": "Missing reference"}));
}

#[actix_web::test]
async fn thank_you_echoes_the_student() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, TestRequest::get().uri("/thank_you?student_id=S-42")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["student_id"], "S-42");
}

#[actix_web::test]
async fn health() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, TestRequest::get().uri("/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "👍️\n");
}
