//! The server has no command line options. Any argument prints the help and the current configuration instead.
use std::{
    env::{self, VarError},
    fmt::Write,
};

struct EnvVar {
    name: &'static str,
    help: &'static str,
    /// Secrets are reported as set or not set, never by value.
    secret: bool,
}

const fn var(name: &'static str, help: &'static str) -> EnvVar {
    EnvVar { name, help, secret: false }
}

const fn secret(name: &'static str, help: &'static str) -> EnvVar {
    EnvVar { name, help, secret: true }
}

const INTRO: &str = "\
School Fee Payment Server
=========================

Verifies school fee payments with Paystack, records them, and emails a PDF receipt to the payer.

The server takes no command line arguments. It is configured entirely from environment variables, which may also be
placed in a `.env` file in the working directory.";

const OUTRO: &str = "Logging is controlled with RUST_LOG, e.g. RUST_LOG=info,fee::access_log=debug";

const SETTINGS: &[(&str, &[EnvVar])] = &[
    ("Server", &[
        var("FEE_HOST", "Address to bind to (default: 127.0.0.1)"),
        var("FEE_PORT", "Port to listen on (default: 8360)"),
        var("FEE_DATABASE_URL", "SQLite database URL (default: sqlite://data/fee_payments.db)"),
        secret(
            "FEE_SECRET_KEY",
            "Signs admin tokens and receipt links. If unset, a random key is used and every token and link \
             becomes invalid when the server restarts.",
        ),
        var("FEE_RECEIPT_DIR", "Where receipts are written (default: receipts)"),
    ]),
    ("Paystack", &[
        secret("FEE_PAYSTACK_SECRET_KEY", "Your Paystack secret key"),
        var("FEE_PAYSTACK_BASE_URL", "API base URL (default: https://api.paystack.co)"),
        var("FEE_GATEWAY_TIMEOUT_MS", "Per-request timeout (default: 10000)"),
        var("FEE_GATEWAY_MAX_RETRIES", "Retries for timeouts, 429 and 5xx responses (default: 2)"),
    ]),
    ("Email", &[
        var("FEE_EMAIL_USER", "Sender address and SMTP username"),
        secret("FEE_EMAIL_PASS", "SMTP password"),
        var("FEE_SMTP_HOST", "SMTP relay (default: smtp.gmail.com)"),
        var("FEE_SMTP_PORT", "SMTP port (default: 465)"),
        var("FEE_SMTP_TLS", "tls, starttls or none (default: tls)"),
        var("FEE_SMTP_TIMEOUT_SECS", "SMTP timeout (default: 30)"),
    ]),
    ("Administration", &[
        var("FEE_ADMIN_USER", "Admin username. The dashboard is disabled if this is not set."),
        secret("FEE_ADMIN_PASS", "Admin password"),
        var("FEE_ADMIN_TOKEN_TTL_HOURS", "Lifetime of an admin token (default: 12)"),
        var("FEE_RECEIPT_LINK_TTL_HOURS", "Lifetime of a receipt download link (default: 72)"),
        var("FEE_RECONCILE_INTERVAL_SECS", "How often stalled fulfillments are retried (default: 300)"),
        var(
            "FEE_RECONCILE_MAX_ATTEMPTS",
            "Stalled fulfillments are retried until they have failed this often (default: 5)",
        ),
    ]),
];

/// Prints the help and returns `true` if any argument was given, in which case the server should not start.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        println!("\n{}\n", help_text());
        println!("{}", current_values(|name| env::var(name)));
    }
    has_cli_args
}

fn help_text() -> String {
    let mut text = format!("{INTRO}\n");
    for (group, vars) in SETTINGS {
        let _ = writeln!(text, "\n{group}");
        for v in *vars {
            let _ = writeln!(text, "  {:<30}{}", v.name, v.help);
        }
    }
    let _ = write!(text, "\n{OUTRO}");
    text
}

fn current_values<F>(lookup: F) -> String
where F: Fn(&str) -> Result<String, VarError> {
    let mut text = String::from("Current environment values:\n");
    let rust_log = var("RUST_LOG", "");
    for v in std::iter::once(&rust_log).chain(SETTINGS.iter().flat_map(|(_, vars)| vars.iter())) {
        let value = match lookup(v.name) {
            Ok(_) if v.secret => "(set, hidden)".to_string(),
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(_)) if v.secret => "Invalid value".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        let _ = writeln!(text, "  {:<35} {value}", v.name);
    }
    text
}
