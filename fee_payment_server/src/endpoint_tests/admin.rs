use actix_web::{cookie::Cookie, http::StatusCode, test::TestRequest};
use chrono::{Duration, Utc};
use fee_common::Kobo;
use fee_payment_engine::{db_types::NewPaymentRecord, traits::PaymentStore};

use super::{helpers::*, mocks::unused_backends};
use crate::{
    auth::{TokenIssuer, ACCESS_TOKEN_NAME},
    config::AuthConfig,
};

fn login_request(username: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/admin").set_form([("username", username), ("password", password)])
}

#[actix_web::test]
async fn admin_login_issues_a_token_and_cookie() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, login_request(ADMIN_USER, ADMIN_PASS)).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    let body = res.json();
    let token = body["token"].as_str().unwrap();
    let claims = server.issuer.validate(token).expect("Token should be valid");
    assert_eq!(claims.username, ADMIN_USER);
    assert!(body["expires_at"].is_string());

    let cookie = res.cookies.iter().find(|c| c.name() == ACCESS_TOKEN_NAME).expect("No access cookie");
    assert_eq!(cookie.value(), token);
    assert_eq!(cookie.http_only(), Some(true));
}

#[actix_web::test]
async fn admin_login_with_wrong_password() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, login_request(ADMIN_USER, "hunter2")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.cookies.is_empty());
    assert!(res.json()["error"].as_str().unwrap().contains("Invalid username or password"));
}

#[actix_web::test]
async fn dashboard_requires_a_token() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, TestRequest::get().uri("/dashboard")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.json()["error"].as_str().unwrap().contains("No access token"));
}

#[actix_web::test]
async fn dashboard_rejects_bad_tokens() {
    let server = TestServer::new().await;
    let mut tampered = server.admin_token();
    let n = tampered.len();
    tampered.replace_range(n - 6..n - 1, "AAAAA");
    let foreign = TokenIssuer::new(&AuthConfig::new("some-other-server")).issue(ADMIN_USER).unwrap().0;
    for token in [tampered, foreign, "garbage".to_string()] {
        let (gateway, renderer, notifier) = unused_backends();
        let req = TestRequest::get().uri("/dashboard").insert_header((ACCESS_TOKEN_NAME, token));
        let res = server.call(gateway, renderer, notifier, req).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{}", res.text());
    }
}

#[actix_web::test]
async fn dashboard_rejects_expired_tokens() {
    let server = TestServer::new().await;
    let (token, _) = server.issuer.issue_at(ADMIN_USER, Utc::now() - Duration::days(1)).unwrap();
    let (gateway, renderer, notifier) = unused_backends();
    let req = TestRequest::get().uri("/dashboard").insert_header((ACCESS_TOKEN_NAME, token));
    let res = server.call(gateway, renderer, notifier, req).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.json()["error"].as_str().unwrap().contains("expired"));
}

#[actix_web::test]
async fn dashboard_lists_newest_first() {
    let server = TestServer::new().await;
    for reference in ["R1", "R2"] {
        let record = NewPaymentRecord::new("Ada", "a@x.com", Kobo::from(1000), reference, "success");
        server.db().insert_payment(record).await.unwrap();
    }
    let (gateway, renderer, notifier) = unused_backends();
    let req = TestRequest::get().uri("/dashboard").cookie(Cookie::new(ACCESS_TOKEN_NAME, server.admin_token()));
    let res = server.call(gateway, renderer, notifier, req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    let payments = res.json();
    let references =
        payments.as_array().unwrap().iter().map(|p| p["reference"].as_str().unwrap().to_string()).collect::<Vec<_>>();
    assert_eq!(references, vec!["R2", "R1"]);
}

#[actix_web::test]
async fn logout_expires_the_cookie() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, TestRequest::get().uri("/logout")).await;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.cookies.iter().find(|c| c.name() == ACCESS_TOKEN_NAME).expect("No removal cookie");
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
}

#[actix_web::test]
async fn stalled_fulfillments_require_a_token() {
    let server = TestServer::new().await;
    let (gateway, renderer, notifier) = unused_backends();
    let res = server.call(gateway, renderer, notifier, TestRequest::get().uri("/api/fulfillments/stalled")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}
