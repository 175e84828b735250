use std::{env, path::PathBuf, time::Duration as StdDuration};

use chrono::Duration;
use fee_common::{helpers::env_or, Secret};
use fee_payment_engine::notifier::MailerConfig;
use log::*;
use paystack_tools::PaystackConfig;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

const DEFAULT_FEE_HOST: &str = "127.0.0.1";
const DEFAULT_FEE_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/fee_payments.db";
const DEFAULT_RECEIPT_DIR: &str = "receipts";
const DEFAULT_ADMIN_TOKEN_TTL: Duration = Duration::hours(12);
const DEFAULT_RECEIPT_LINK_TTL: Duration = Duration::hours(72);
const DEFAULT_RECONCILE_INTERVAL: StdDuration = StdDuration::from_secs(300);
const DEFAULT_RECONCILE_MAX_ATTEMPTS: i64 = 5;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub admin: AdminCredentials,
    pub paystack: PaystackConfig,
    pub mailer: MailerConfig,
    /// Where receipt PDFs are written and served from.
    pub receipt_dir: PathBuf,
    /// How often the reconciliation worker looks for stalled fulfillments.
    pub reconcile_interval: StdDuration,
    /// Fulfillments that have failed this many times are left for an administrator.
    pub reconcile_max_attempts: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FEE_HOST.to_string(),
            port: DEFAULT_FEE_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            admin: AdminCredentials::default(),
            paystack: PaystackConfig::default(),
            mailer: MailerConfig::default(),
            receipt_dir: PathBuf::from(DEFAULT_RECEIPT_DIR),
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            reconcile_max_attempts: DEFAULT_RECONCILE_MAX_ATTEMPTS,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FEE_HOST").ok().unwrap_or_else(|| DEFAULT_FEE_HOST.into());
        let port = env_or("FEE_PORT", DEFAULT_FEE_PORT);
        let database_url = env::var("FEE_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ FEE_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::from_env_or_default();
        let admin = AdminCredentials::from_env();
        let paystack = PaystackConfig::new_from_env_or_default();
        let mailer = MailerConfig::from_env();
        let receipt_dir = env::var("FEE_RECEIPT_DIR").map(PathBuf::from).unwrap_or_else(|_| DEFAULT_RECEIPT_DIR.into());
        let reconcile_interval =
            StdDuration::from_secs(env_or("FEE_RECONCILE_INTERVAL_SECS", DEFAULT_RECONCILE_INTERVAL.as_secs()));
        let reconcile_max_attempts = env_or("FEE_RECONCILE_MAX_ATTEMPTS", DEFAULT_RECONCILE_MAX_ATTEMPTS);
        Self {
            host,
            port,
            database_url,
            auth,
            admin,
            paystack,
            mailer,
            receipt_dir,
            reconcile_interval,
            reconcile_max_attempts,
        }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Signs admin access tokens and receipt links.
    pub secret_key: Secret<String>,
    pub admin_token_ttl: Duration,
    pub receipt_link_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ FEE_SECRET_KEY has not been set. I'm using a random value for this session. Admin tokens and \
             receipt links will stop working when the server restarts. DO NOT operate in production like this. 🚨️🚨️🚨️"
        );
        let key = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self {
            secret_key: Secret::new(key),
            admin_token_ttl: DEFAULT_ADMIN_TOKEN_TTL,
            receipt_link_ttl: DEFAULT_RECEIPT_LINK_TTL,
        }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret_key: S) -> Self {
        Self {
            secret_key: Secret::new(secret_key.into()),
            admin_token_ttl: DEFAULT_ADMIN_TOKEN_TTL,
            receipt_link_ttl: DEFAULT_RECEIPT_LINK_TTL,
        }
    }

    pub fn from_env_or_default() -> Self {
        let mut config = match env::var("FEE_SECRET_KEY").ok().filter(|s| !s.trim().is_empty()) {
            Some(key) => Self::new(key),
            None => Self::default(),
        };
        config.admin_token_ttl =
            Duration::hours(env_or("FEE_ADMIN_TOKEN_TTL_HOURS", DEFAULT_ADMIN_TOKEN_TTL.num_hours()));
        config.receipt_link_ttl =
            Duration::hours(env_or("FEE_RECEIPT_LINK_TTL_HOURS", DEFAULT_RECEIPT_LINK_TTL.num_hours()));
        config
    }
}

//--------------------------------------------------  Admin  -----------------------------------------------------------
/// The single administrator account. If either value is missing, nobody can log in.
#[derive(Clone, Debug, Default)]
pub struct AdminCredentials {
    pub username: String,
    pub password: Secret<String>,
}

impl AdminCredentials {
    pub fn new<S: Into<String>>(username: S, password: S) -> Self {
        Self { username: username.into(), password: Secret::new(password.into()) }
    }

    pub fn from_env() -> Self {
        let username = env::var("FEE_ADMIN_USER").unwrap_or_default();
        let password = env::var("FEE_ADMIN_PASS").unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            warn!("🪛️ FEE_ADMIN_USER or FEE_ADMIN_PASS is not set. The admin dashboard is inaccessible.");
        }
        Self { username, password: Secret::new(password) }
    }

    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that handlers need. It excludes secrets, so that they are not passed around
/// the system.
#[derive(Clone, Copy, Debug)]
pub struct ServerOptions {
    pub reconcile_max_attempts: i64,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { reconcile_max_attempts: config.reconcile_max_attempts }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { reconcile_max_attempts: DEFAULT_RECONCILE_MAX_ATTEMPTS }
    }
}
