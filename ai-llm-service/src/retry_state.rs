//! Retry state machine for provider calls.
//!
//! The machine only decides *what happens next*; it never sleeps or performs
//! I/O. The caller drives it:
//!
//! ```text
//!  Attempting(n) --success------------------------> Succeeded
//!  Attempting(n) --fatal--------------------------> FailedTerminal
//!  Attempting(n) --transient, delay left----------> Waiting(n+1, delay)
//!  Attempting(n) --transient, schedule exhausted--> FailedTerminal
//!  Waiting(n, _) --wait elapsed-------------------> Attempting(n)
//! ```

use std::time::Duration;

use crate::config::retry_schedule::RetrySchedule;

/// Classified result of one attempt, as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Transient,
    Fatal,
}

/// Current state of a retry sequence. Attempts are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Attempting { attempt: usize },
    Waiting { next_attempt: usize, delay: Duration },
    Succeeded,
    FailedTerminal,
}

impl RetryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryState::Succeeded | RetryState::FailedTerminal)
    }
}

#[derive(Debug)]
pub struct RetryMachine<'a> {
    schedule: &'a RetrySchedule,
    state: RetryState,
}

impl<'a> RetryMachine<'a> {
    pub fn new(schedule: &'a RetrySchedule) -> Self {
        Self {
            schedule,
            state: RetryState::Attempting { attempt: 1 },
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Applies the outcome of the current attempt.
    ///
    /// Ignored unless the machine is in [`RetryState::Attempting`].
    pub fn record(&mut self, outcome: AttemptOutcome) -> RetryState {
        if let RetryState::Attempting { attempt } = self.state {
            self.state = match outcome {
                AttemptOutcome::Success => RetryState::Succeeded,
                AttemptOutcome::Fatal => RetryState::FailedTerminal,
                AttemptOutcome::Transient => match self.schedule.delay_before(attempt + 1) {
                    Some(delay) => RetryState::Waiting {
                        next_attempt: attempt + 1,
                        delay,
                    },
                    None => RetryState::FailedTerminal,
                },
            };
        }
        self.state
    }

    /// Marks the backoff wait as finished.
    ///
    /// Ignored unless the machine is in [`RetryState::Waiting`].
    pub fn wait_elapsed(&mut self) -> RetryState {
        if let RetryState::Waiting { next_attempt, .. } = self.state {
            self.state = RetryState::Attempting {
                attempt: next_attempt,
            };
        }
        self.state
    }
}
