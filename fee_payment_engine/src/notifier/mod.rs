//! Email delivery of receipts over SMTP, using [lettre](https://lettre.rs).
//!
//! [`MailerConfig::from_env`] reads:
//!
//! | Variable                | Default          | Description                              |
//! |-------------------------|------------------|------------------------------------------|
//! | `FEE_EMAIL_USER`        |                  | Sender address and SMTP username         |
//! | `FEE_EMAIL_PASS`        |                  | SMTP password                            |
//! | `FEE_SMTP_HOST`         | `smtp.gmail.com` | SMTP relay                               |
//! | `FEE_SMTP_PORT`         | `465`            | Relay port                               |
//! | `FEE_SMTP_TLS`          | `tls`            | `tls` (implicit), `starttls`, or `none`  |
//! | `FEE_SMTP_TIMEOUT_SECS` | `30`             | Connection and command timeout           |
mod config;
mod smtp;

pub use config::{MailerConfig, SmtpTls};
pub use smtp::{build_receipt_message, SmtpNotifier, RECEIPT_EMAIL_BODY, RECEIPT_EMAIL_SUBJECT};
