use std::{fmt::Display, str::FromStr, time::Duration};

use fee_common::{helpers::env_or, Secret};
use log::*;

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SmtpTls {
    /// TLS from the first byte (SMTPS)
    #[default]
    Tls,
    StartTls,
    /// Plain text. Only for local relays and tests.
    None,
}

impl FromStr for SmtpTls {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tls" | "ssl" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            "none" => Ok(Self::None),
            other => Err(format!("unknown SMTP TLS mode '{other}'")),
        }
    }
}

impl Display for SmtpTls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmtpTls::Tls => write!(f, "tls"),
            SmtpTls::StartTls => write!(f, "starttls"),
            SmtpTls::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    /// The sender address, also used as the SMTP username.
    pub username: Option<String>,
    pub password: Secret<String>,
    pub timeout: Duration,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            tls: SmtpTls::default(),
            username: None,
            password: Secret::default(),
            timeout: DEFAULT_SMTP_TIMEOUT,
        }
    }
}

impl MailerConfig {
    pub fn new<S: Into<String>>(host: S, port: u16, tls: SmtpTls) -> Self {
        Self { host: host.into(), port, tls, ..Default::default() }
    }

    pub fn with_credentials<S: Into<String>>(mut self, username: S, password: Secret<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("FEE_SMTP_HOST").unwrap_or_else(|_| {
            debug!("🪛️ FEE_SMTP_HOST not set, using {DEFAULT_SMTP_HOST}");
            defaults.host.clone()
        });
        let port = env_or("FEE_SMTP_PORT", defaults.port);
        let tls = env_or("FEE_SMTP_TLS", defaults.tls);
        let timeout = env_or::<u64>("FEE_SMTP_TIMEOUT_SECS", defaults.timeout.as_secs());
        let username = std::env::var("FEE_EMAIL_USER").ok().filter(|s| !s.trim().is_empty());
        if username.is_none() {
            warn!("🪛️ FEE_EMAIL_USER is not set. Receipts cannot be emailed until it is.");
        }
        let password = Secret::new(std::env::var("FEE_EMAIL_PASS").unwrap_or_default());
        Self { host, port, tls, username, password, timeout: Duration::from_secs(timeout) }
    }
}
