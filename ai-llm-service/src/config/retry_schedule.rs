use std::time::Duration;

use crate::error_handler::{AiLlmError, ConfigError};

/// Ordered backoff delays between provider attempts.
///
/// The first attempt always runs immediately; each delay in the schedule
/// buys one more attempt. A schedule of `[1s, 2s]` therefore allows three
/// attempts in total, sleeping 1s before the second and 2s before the third.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ai_llm_service::config::retry_schedule::RetrySchedule;
///
/// let s = RetrySchedule::from_secs(&[1, 2, 4]);
/// assert_eq!(s.max_attempts(), 4);
/// assert_eq!(s.delay_before(2), Some(Duration::from_secs(1)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
}

impl RetrySchedule {
    /// Default backoff in seconds.
    pub const DEFAULT_DELAYS_SECS: [u64; 5] = [1, 2, 4, 8, 16];

    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn from_secs(secs: &[u64]) -> Self {
        Self::new(secs.iter().copied().map(Duration::from_secs).collect())
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    /// Parses a comma-separated list of whole seconds, e.g. `"1, 2, 4"`.
    ///
    /// An empty string yields [`RetrySchedule::none`].
    ///
    /// # Errors
    /// [`ConfigError::InvalidNumber`] if any element is not a `u64`.
    pub fn parse_secs(var: &'static str, raw: &str) -> Result<Self, AiLlmError> {
        let secs = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                    var,
                    reason: "expected comma-separated whole seconds",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_secs(&secs))
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// One immediate attempt plus one per scheduled delay.
    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Delay to wait before 1-based `attempt`. `None` for the first attempt
    /// or past the end of the schedule.
    pub fn delay_before(&self, attempt: usize) -> Option<Duration> {
        attempt
            .checked_sub(2)
            .and_then(|idx| self.delays.get(idx).copied())
    }

    /// Upper bound on time spent sleeping across a full retry sequence.
    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self::from_secs(&Self::DEFAULT_DELAYS_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule() {
        let s = RetrySchedule::default();
        assert_eq!(s.max_attempts(), 6);
        assert_eq!(s.total_delay(), Duration::from_secs(31));
        assert_eq!(s.delay_before(1), None);
        assert_eq!(s.delay_before(6), Some(Duration::from_secs(16)));
        assert_eq!(s.delay_before(7), None);
    }

    #[test]
    fn parse_list() {
        let s = RetrySchedule::parse_secs("RETRY_DELAYS_S", " 0, 3 ,5,").unwrap();
        assert_eq!(s, RetrySchedule::from_secs(&[0, 3, 5]));
        assert_eq!(RetrySchedule::parse_secs("X", "").unwrap(), RetrySchedule::none());
        assert!(RetrySchedule::parse_secs("X", "1,two").is_err());
    }
}
