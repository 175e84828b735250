use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    HttpRequest,
};

use crate::auth::ACCESS_TOKEN_NAME;

/// Fetches the admin access token from the `fee_access_token` header, falling back to the cookie of the same name.
pub fn access_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(ACCESS_TOKEN_NAME)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| req.cookie(ACCESS_TOKEN_NAME).map(|c| c.value().to_string()))
        .filter(|s| !s.is_empty())
}

pub fn access_cookie(token: &str, max_age: chrono::Duration) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_NAME, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(max_age.num_seconds()))
        .finish()
}

/// A cookie that replaces the access token with an empty, already expired one.
pub fn expired_access_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(ACCESS_TOKEN_NAME, "").path("/").http_only(true).finish();
    cookie.make_removal();
    cookie
}
