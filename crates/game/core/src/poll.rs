//! Deadline-bounded polling.
//!
//! Run scripts constantly wait for the client to catch up ("wait until the
//! teleport landed", "wait until the portal is open"). [`poll_until`] is the
//! single helper for that: it probes at a fixed interval and gives up with a
//! typed [`PollTimeout`] once the deadline passes.

use std::time::Duration;

use crate::env::Clock;

/// The probed condition did not hold before the deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("condition not met within {timeout:?} after {attempts} attempts")]
pub struct PollTimeout {
    pub timeout: Duration,
    pub attempts: u32,
}

/// Probes `probe` every `interval` until it yields a value or `timeout` elapses.
///
/// The probe always runs at least once, and once more right before the
/// deadline when the interval would overshoot it.
pub fn poll_until<T>(
    clock: &dyn Clock,
    timeout: Duration,
    interval: Duration,
    mut probe: impl FnMut() -> Option<T>,
) -> Result<T, PollTimeout> {
    let deadline = clock.now() + timeout;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if let Some(value) = probe() {
            return Ok(value);
        }

        let now = clock.now();
        if now >= deadline {
            tracing::debug!(?timeout, attempts, "poll_until: deadline reached");
            return Err(PollTimeout { timeout, attempts });
        }

        clock.sleep(interval.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ManualClock;

    #[test]
    fn returns_first_value() {
        let clock = ManualClock::new();
        let mut calls = 0;
        let result = poll_until(
            &clock,
            Duration::from_secs(1),
            Duration::from_millis(100),
            || {
                calls += 1;
                (calls == 3).then_some(calls)
            },
        );
        assert_eq!(result, Ok(3));
        assert_eq!(clock.elapsed(), Duration::from_millis(200));
    }

    #[test]
    fn times_out_with_attempt_count() {
        let clock = ManualClock::new();
        let result: Result<(), _> = poll_until(
            &clock,
            Duration::from_millis(250),
            Duration::from_millis(100),
            || None,
        );
        let err = result.unwrap_err();
        // t=0, 100, 200, 250
        assert_eq!(err.attempts, 4);
        assert_eq!(clock.elapsed(), Duration::from_millis(250));
    }
}
