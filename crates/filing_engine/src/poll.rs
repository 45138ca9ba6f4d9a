use std::thread;
use std::time::Duration;

/// Fixed interval times a fixed number of attempts; the upper bound of
/// every wait in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub interval: Duration,
    pub attempts: u32,
}

impl PollBudget {
    pub const fn new(interval: Duration, attempts: u32) -> Self {
        Self { interval, attempts }
    }

    /// Budget covering `timeout` at `interval`; always at least one attempt.
    pub fn from_timeout(timeout: Duration, interval: Duration) -> Self {
        let attempts = if interval.is_zero() {
            1
        } else {
            let ratio = timeout.as_nanos().div_ceil(interval.as_nanos());
            u32::try_from(ratio).unwrap_or(u32::MAX).max(1)
        };
        Self { interval, attempts }
    }

    pub fn total(&self) -> Duration {
        self.interval.saturating_mul(self.attempts)
    }
}

/// Runs `probe` until it yields a value or the budget is spent.
///
/// The probe receives the zero-based attempt number. Errors from the probe
/// end the poll immediately; transient conditions should be reported as
/// `Ok(None)`. No sleep follows the final attempt.
pub fn poll_until<T, E>(
    budget: PollBudget,
    mut probe: impl FnMut(u32) -> Result<Option<T>, E>,
) -> Result<Option<T>, E> {
    let attempts = budget.attempts.max(1);
    for attempt in 0..attempts {
        if let Some(value) = probe(attempt)? {
            return Ok(Some(value));
        }
        if attempt + 1 < attempts {
            thread::sleep(budget.interval);
        }
    }
    Ok(None)
}
