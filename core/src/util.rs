use std::time::Duration;

use rand::Rng;

/// Exponential back-off with jitter: 200ms -> 400ms -> 800ms -> 1600ms.
/// Used only around opening the vendor stream; appends and local exec
/// failures are not retried (no retries inside the core, per the error
/// handling policy).
pub fn backoff(attempt: u64) -> Duration {
    let base_delay_ms = 200u64 * (1u64 << attempt.saturating_sub(1).min(8));
    let jitter = rand::rng().random_range(0.8..1.2);
    let delay_ms = (base_delay_ms as f64 * jitter) as u64;
    Duration::from_millis(delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_with_attempt_number() {
        let short = backoff(1);
        let long = backoff(4);
        assert!(short.as_millis() < long.as_millis() * 2);
    }
}
