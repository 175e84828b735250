//! Admin access tokens and signed receipt links.
//!
//! Both are HMAC-SHA256 constructions keyed with the server secret (`FEE_SECRET_KEY`). An admin token is
//! `{base64url(json claims)}.{base64url(mac)}` where the MAC covers `admin-token:{payload}`. A receipt link carries
//! `expires` and a hex `signature` over `{filename}:{expires}` in its query string.
use chrono::{DateTime, Duration, Utc};
use fee_common::Secret;
use hmac::{Hmac, Mac};
use log::*;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    config::{AdminCredentials, AuthConfig},
    errors::AuthError,
};

type HmacSha256 = Hmac<Sha256>;

pub const ACCESS_TOKEN_NAME: &str = "fee_access_token";
const TOKEN_DOMAIN: &str = "admin-token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub username: String,
    /// Unix timestamp after which the token is no longer accepted.
    pub exp: i64,
}

impl AdminClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

fn mac_for(key: &Secret<String>) -> Result<HmacSha256, AuthError> {
    HmacSha256::new_from_slice(key.reveal().as_bytes()).map_err(|e| AuthError::SigningError(e.to_string()))
}

//--------------------------------------------------  TokenIssuer  -----------------------------------------------------
#[derive(Clone)]
pub struct TokenIssuer {
    key: Secret<String>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: config.secret_key.clone(), ttl: config.admin_token_ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `username` that expires `ttl` from now.
    pub fn issue(&self, username: &str) -> Result<(String, AdminClaims), AuthError> {
        self.issue_at(username, Utc::now())
    }

    pub(crate) fn issue_at(&self, username: &str, now: DateTime<Utc>) -> Result<(String, AdminClaims), AuthError> {
        let claims = AdminClaims { username: username.to_string(), exp: (now + self.ttl).timestamp() };
        let json = serde_json::to_vec(&claims).map_err(|e| AuthError::SigningError(e.to_string()))?;
        let payload = base64::encode_config(json, base64::URL_SAFE_NO_PAD);
        let mut mac = mac_for(&self.key)?;
        mac.update(format!("{TOKEN_DOMAIN}:{payload}").as_bytes());
        let signature = base64::encode_config(mac.finalize().into_bytes(), base64::URL_SAFE_NO_PAD);
        Ok((format!("{payload}.{signature}"), claims))
    }

    /// Compares the submitted credentials with the configured administrator account and issues a token if they
    /// match. Both fields are always compared.
    pub fn login(
        &self,
        admin: &AdminCredentials,
        username: &str,
        password: &str,
    ) -> Result<(String, AdminClaims), AuthError> {
        if !admin.is_configured() {
            warn!("🔐️ Admin login attempted, but no admin credentials are configured");
            return Err(AuthError::InvalidCredentials);
        }
        let user_ok = credentials_match(&self.key, username, &admin.username);
        let pass_ok = credentials_match(&self.key, password, admin.password.reveal());
        if !(user_ok & pass_ok) {
            info!("🔐️ Failed admin login attempt for '{username}'");
            return Err(AuthError::InvalidCredentials);
        }
        info!("🔐️ Admin '{username}' logged in");
        self.issue(username)
    }

    /// Checks the signature, then the expiry. The claims are only decoded once the signature is known to be good.
    pub fn validate(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::MalformedToken)?;
        let signature =
            base64::decode_config(signature, base64::URL_SAFE_NO_PAD).map_err(|_| AuthError::MalformedToken)?;
        let mut mac = mac_for(&self.key)?;
        mac.update(format!("{TOKEN_DOMAIN}:{payload}").as_bytes());
        mac.verify_slice(&signature).map_err(|_| AuthError::InvalidSignature)?;
        let json = base64::decode_config(payload, base64::URL_SAFE_NO_PAD).map_err(|_| AuthError::MalformedToken)?;
        let claims = serde_json::from_slice::<AdminClaims>(&json).map_err(|_| AuthError::MalformedToken)?;
        if claims.exp <= Utc::now().timestamp() {
            debug!("🔐️ Rejected an expired admin token for {}", claims.username);
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}

/// Constant-time comparison of a submitted credential against the configured one.
///
/// Both sides are run through the same keyed MAC, so the comparison does not leak the length or a common prefix.
pub fn credentials_match(key: &Secret<String>, submitted: &str, expected: &str) -> bool {
    let Ok(mut expected_mac) = mac_for(key) else {
        return false;
    };
    expected_mac.update(expected.as_bytes());
    let expected = expected_mac.finalize().into_bytes();
    let Ok(mut submitted_mac) = mac_for(key) else {
        return false;
    };
    submitted_mac.update(submitted.as_bytes());
    submitted_mac.verify_slice(&expected).is_ok()
}

//-----------------------------------------------  ReceiptLinkSigner  --------------------------------------------------
#[derive(Clone)]
pub struct ReceiptLinkSigner {
    key: Secret<String>,
    ttl: Duration,
}

impl ReceiptLinkSigner {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: config.secret_key.clone(), ttl: config.receipt_link_ttl }
    }

    /// The relative URL of a receipt, valid for the configured lifetime.
    pub fn signed_url(&self, file_name: &str) -> Result<String, AuthError> {
        let expires = (Utc::now() + self.ttl).timestamp();
        let signature = self.sign(file_name, expires)?;
        Ok(format!("/receipts/{file_name}?expires={expires}&signature={signature}"))
    }

    pub fn sign(&self, file_name: &str, expires: i64) -> Result<String, AuthError> {
        let mut mac = mac_for(&self.key)?;
        mac.update(format!("{file_name}:{expires}").as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn verify(&self, file_name: &str, expires: i64, signature: &str) -> Result<(), AuthError> {
        let signature = hex::decode(signature).map_err(|_| AuthError::InvalidSignature)?;
        let mut mac = mac_for(&self.key)?;
        mac.update(format!("{file_name}:{expires}").as_bytes());
        mac.verify_slice(&signature).map_err(|_| AuthError::InvalidSignature)?;
        if expires <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(())
    }
}
