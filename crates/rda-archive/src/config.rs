use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the bounded convergence waits.
///
/// The creation path and the map-resolution path historically used different
/// constants; nothing semantic hangs on the values, so both sets live here
/// as configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    /// Maximum polls for the linear-backoff convergence wait.
    pub max_polls: u32,
    /// Base delay for the linear backoff: poll `i` sleeps `i × poll_delay`
    /// first, so the worst-case wall clock is
    /// `poll_delay × max_polls × (max_polls - 1) / 2`.
    pub poll_delay: Duration,
    /// Maximum attempts for the wait-for-pending resolve policy.
    pub resolve_attempts: u32,
    /// Fixed delay between wait-for-pending attempts.
    pub resolve_delay: Duration,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            max_polls: 20,
            poll_delay: Duration::from_millis(500),
            resolve_attempts: 12,
            resolve_delay: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_bounds() {
        let cfg = ConvergenceConfig::default();
        assert_eq!(cfg.max_polls, 20);
        assert_eq!(cfg.poll_delay, Duration::from_millis(500));
        assert_eq!(cfg.resolve_attempts, 12);
        assert_eq!(cfg.resolve_delay, Duration::from_secs(10));
    }
}
