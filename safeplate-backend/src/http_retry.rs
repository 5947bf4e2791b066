//! HTTP retry helper with exponential backoff
//!
//! Transient failures talking to the agent service (timeouts, connection
//! errors, 408/429 and gateway 5xx codes) are retried a bounded number of
//! times. Each retry waits twice as long as the previous one, capped.

use std::time::Duration;

/// Default first backoff delay in milliseconds
pub const MIN_BACKOFF_MS: u64 = 1_000;
/// Default backoff cap in milliseconds
pub const MAX_BACKOFF_MS: u64 = 8_000;

/// Doubling backoff schedule for one request
#[derive(Debug, Clone)]
pub struct Backoff {
    current_ms: u64,
    max_ms: u64,
    retries_left: u32,
    error_count: u32,
}

impl Backoff {
    pub fn with_delays(max_retries: u32, min_ms: u64, max_ms: u64) -> Self {
        Backoff {
            current_ms: min_ms,
            max_ms: max_ms.max(min_ms),
            retries_left: max_retries,
            error_count: 0,
        }
    }

    /// Record a failed try. Returns how long to wait before the next one,
    /// or None once the retry budget is spent.
    pub fn next_delay(&mut self, key: &str) -> Option<Duration> {
        if self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;
        self.error_count += 1;

        let delay = self.current_ms;
        self.current_ms = (self.current_ms * 2).min(self.max_ms);

        log::warn!(
            "[HTTP_RETRY] Error #{} for '{}', backoff: {}ms",
            self.error_count,
            key,
            delay
        );

        Some(Duration::from_millis(delay))
    }
}

/// Check if an HTTP status code indicates a retryable error
pub fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        408 | // Request Timeout
        429 | // Too Many Requests
        500 | // Internal Server Error (sometimes transient)
        502 | // Bad Gateway
        503 | // Service Unavailable
        504 | // Gateway Timeout
        520 | // Cloudflare - Web Server Returned an Unknown Error
        521 | // Cloudflare - Web Server Is Down
        522 | // Cloudflare - Connection Timed Out
        523 | // Cloudflare - Origin Is Unreachable
        524   // Cloudflare - A Timeout Occurred
    )
}

/// Helper function to check if a reqwest error is retryable
pub fn is_reqwest_error_retryable(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err.is_request()
        || err.status().map(|s| is_retryable_status(s.as_u16())).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let mut backoff = Backoff::with_delays(6, 1_000, 8_000);

        assert_eq!(backoff.next_delay("test"), Some(Duration::from_millis(1_000)));
        assert_eq!(backoff.next_delay("test"), Some(Duration::from_millis(2_000)));
        assert_eq!(backoff.next_delay("test"), Some(Duration::from_millis(4_000)));
        assert_eq!(backoff.next_delay("test"), Some(Duration::from_millis(8_000)));

        // Capped
        assert_eq!(backoff.next_delay("test"), Some(Duration::from_millis(8_000)));
        assert_eq!(backoff.next_delay("test"), Some(Duration::from_millis(8_000)));

        // Budget spent
        assert_eq!(backoff.next_delay("test"), None);
    }

    #[test]
    fn test_zero_retries() {
        let mut backoff = Backoff::with_delays(0, MIN_BACKOFF_MS, MAX_BACKOFF_MS);
        assert_eq!(backoff.next_delay("test"), None);
    }

    #[test]
    fn test_zero_delay_schedule() {
        let mut backoff = Backoff::with_delays(2, 0, 0);
        assert_eq!(backoff.next_delay("test"), Some(Duration::ZERO));
        assert_eq!(backoff.next_delay("test"), Some(Duration::ZERO));
        assert_eq!(backoff.next_delay("test"), None);
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(502));
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(504));
        assert!(is_retryable_status(429));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(200));
    }
}
