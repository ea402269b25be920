use std::time::Duration;

/// High-level classification of a failed attempt for retry purposes.
///
/// Only transport failures reach the policy; an HTTP response of any status
/// is a completed request and is handed back to the caller untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection refused/reset, DNS, empty reply).
    Connection,
    /// Anything else (bad URL, unsupported protocol, TLS setup). Not retried.
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff with jitter and caps.
///
/// Delay before attempt `n + 1` is `base_delay * multiplier^(n - 1)`, capped at
/// `max_delay`, then spread by `jitter_factor` (0.1 = +/-5%).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
    /// Relative jitter in `[0, 1]`.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            multiplier: 2.0,
            max_delay: Duration::from_secs(5),
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries immediately, for tests and local sources.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            multiplier: 1.0,
            max_delay: Duration::ZERO,
            jitter_factor: 0.0,
        }
    }

    /// Decide whether to retry after attempt `attempt` (1-based) failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::Timeout | ErrorKind::Connection => {
                RetryDecision::RetryAfter(self.backoff_delay(attempt))
            }
        }
    }

    /// Delay to wait after the given failed attempt (1-based), jitter applied.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16) as i32;
        let base_ms = self.base_delay.as_secs_f64() * 1000.0;
        let max_ms = self.max_delay.as_secs_f64() * 1000.0;
        let delay_ms = (base_ms * self.multiplier.max(1.0).powi(exp)).min(max_ms);

        let jitter = self.jitter_factor.clamp(0.0, 1.0);
        let spread = if jitter > 0.0 {
            delay_ms * jitter * (rand::random::<f64>() - 0.5)
        } else {
            0.0
        };
        let final_ms = (delay_ms + spread).max(0.0).round() as u64;
        Duration::from_millis(final_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_retry_for_other() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::Other), RetryDecision::NoRetry);
    }

    #[test]
    fn default_allows_three_attempts() {
        let p = RetryPolicy::default();
        assert!(matches!(
            p.decide(1, ErrorKind::Connection),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(2, ErrorKind::Timeout),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::Connection), RetryDecision::NoRetry);
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let p = RetryPolicy {
            max_attempts: 20,
            jitter_factor: 0.0,
            ..RetryPolicy::default()
        };
        assert_eq!(p.backoff_delay(1), Duration::from_millis(250));
        assert_eq!(p.backoff_delay(2), Duration::from_millis(500));
        assert_eq!(p.backoff_delay(3), Duration::from_millis(1000));
        assert_eq!(p.backoff_delay(12), p.max_delay);
    }

    #[test]
    fn jitter_stays_within_factor() {
        let p = RetryPolicy {
            base_delay: Duration::from_millis(1000),
            jitter_factor: 0.2,
            ..RetryPolicy::default()
        };
        for _ in 0..50 {
            let d = p.backoff_delay(1).as_millis();
            assert!((900..=1100).contains(&d), "delay {d}ms out of range");
        }
    }

    #[test]
    fn immediate_policy_never_waits() {
        let p = RetryPolicy::immediate(3);
        assert_eq!(
            p.decide(1, ErrorKind::Connection),
            RetryDecision::RetryAfter(Duration::ZERO)
        );
        assert_eq!(p.decide(3, ErrorKind::Connection), RetryDecision::NoRetry);
    }
}
