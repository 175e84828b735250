use std::time::Duration;

/// Upper bound for a single backoff pause, however many retries are configured.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// The pause before retry number `attempt` (zero-based): `base * 2^attempt`, capped at 10 seconds.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    base.checked_mul(factor).unwrap_or(MAX_BACKOFF).min(MAX_BACKOFF)
}
