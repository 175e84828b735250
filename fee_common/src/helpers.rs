use std::{env, fmt::Display, str::FromStr};

use log::warn;

/// Reads and parses the environment variable `name`.
///
/// Returns `Ok(None)` if the variable is not set, and an error message naming the variable if it is set but cannot be
/// parsed. Callers decide whether to fall back to a default.
pub fn parse_env_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().map(Some).map_err(|e| format!("Invalid value for {name} ({s}): {e}")),
        Err(_) => Ok(None),
    }
}

/// The parsed value of `name`, or `default` if it is unset. An unparseable value is logged and also gives `default`.
pub fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    parse_env_var::<T>(name)
        .unwrap_or_else(|e| {
            warn!("🪛️ {e}. Using the default, {default}, instead.");
            None
        })
        .unwrap_or(default)
}

/// Transaction references are alphanumeric, plus `-`, `.`, `=` and `_`, and at most 100 characters long.
///
/// References end up in URL paths and receipt file names, so anything else is refused at the boundary.
pub fn is_valid_reference(reference: &str) -> bool {
    !reference.is_empty() &&
        reference.len() <= 100 &&
        reference.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '=' | '_'))
}
