use actix_web::{http::StatusCode, test::TestRequest};
use chrono::Utc;

use super::{helpers::*, mocks::unused_backends};
use crate::auth::ACCESS_TOKEN_NAME;

const FILE_NAME: &str = "receipt-TXN700.pdf";

fn store_receipt(server: &TestServer) {
    let dir = server.receipt_dir();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(FILE_NAME), pdf_bytes("TXN700")).unwrap();
}

async fn get(server: &TestServer, req: TestRequest) -> TestResponse {
    let (gateway, renderer, notifier) = unused_backends();
    server.call(gateway, renderer, notifier, req).await
}

#[actix_web::test]
async fn signed_link() {
    let server = TestServer::new().await;
    store_receipt(&server);
    let url = server.signer.signed_url(FILE_NAME).unwrap();
    let res = get(&server, TestRequest::get().uri(&url)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(res.body, pdf_bytes("TXN700"));
}

#[actix_web::test]
async fn unsigned_requests_are_forbidden() {
    let server = TestServer::new().await;
    store_receipt(&server);
    let res = get(&server, TestRequest::get().uri(&format!("/receipts/{FILE_NAME}"))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn tampered_links_are_forbidden() {
    let server = TestServer::new().await;
    store_receipt(&server);
    let expires = Utc::now().timestamp() + 3600;
    let signature = server.signer.sign(FILE_NAME, expires).unwrap();
    // Someone else's receipt, with this receipt's signature
    let other = format!("/receipts/receipt-TXN701.pdf?expires={expires}&signature={signature}");
    // A later expiry than the one that was signed
    let extended = format!("/receipts/{FILE_NAME}?expires={}&signature={signature}", expires + 86_400);
    let first = if signature.starts_with('0') { '1' } else { '0' };
    let garbled = format!("/receipts/{FILE_NAME}?expires={expires}&signature={first}{}", &signature[1..]);
    for url in [other, extended, garbled] {
        let res = get(&server, TestRequest::get().uri(&url)).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN, "{url}");
    }
}

#[actix_web::test]
async fn expired_links_are_forbidden() {
    let server = TestServer::new().await;
    store_receipt(&server);
    let expires = Utc::now().timestamp() - 60;
    let signature = server.signer.sign(FILE_NAME, expires).unwrap();
    let url = format!("/receipts/{FILE_NAME}?expires={expires}&signature={signature}");
    let res = get(&server, TestRequest::get().uri(&url)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admins_need_no_signature() {
    let server = TestServer::new().await;
    store_receipt(&server);
    let req = TestRequest::get().uri(&format!("/receipts/{FILE_NAME}")).insert_header((ACCESS_TOKEN_NAME, server.admin_token()));
    let res = get(&server, req).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, pdf_bytes("TXN700"));
}

#[actix_web::test]
async fn only_receipt_names_are_served() {
    let server = TestServer::new().await;
    for name in ["notes.txt", "receipt-.pdf", "receipt-TXN700.pdf.partial", "fee_payments.db"] {
        let expires = Utc::now().timestamp() + 3600;
        let signature = server.signer.sign(name, expires).unwrap();
        let url = format!("/receipts/{name}?expires={expires}&signature={signature}");
        let res = get(&server, TestRequest::get().uri(&url)).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{name}");
    }
}

#[actix_web::test]
async fn missing_receipt() {
    let server = TestServer::new().await;
    let url = server.signer.signed_url("receipt-NOPE.pdf").unwrap();
    let res = get(&server, TestRequest::get().uri(&url)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
