//! Pure retry state machine for windowed fetches.
//!
//! The transition function is independent of the transport so the retry
//! policy can be tested without any I/O. The fetcher drives the machine:
//! it performs one attempt per `Attempting` state, sleeps through `Backoff`,
//! and stops on `Succeeded` or `Exhausted`.

use std::time::Duration;

/// Bounded-retry policy: fixed backoff, fixed attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed per window, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(2),
        }
    }
}

/// Classified result of a single fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 2xx response with a body.
    Success,
    /// HTTP 503 — the distinguished server-overload condition.
    Overloaded,
    /// Any other response or transport failure.
    Failed,
}

/// Retry progress for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// A request may be issued; `attempt` is 1-based.
    Attempting { attempt: u32 },
    /// Wait `delay` before resuming with `next_attempt`.
    Backoff { next_attempt: u32, delay: Duration },
    /// Terminal: the window fetch succeeded.
    Succeeded,
    /// Terminal: the attempt budget is spent.
    Exhausted { attempts: u32 },
}

impl RetryPolicy {
    /// State for a fresh window. Retry state never carries over between
    /// windows.
    pub fn initial(&self) -> RetryState {
        RetryState::Attempting { attempt: 1 }
    }

    /// Transition after observing the outcome of one attempt.
    ///
    /// Overload and generic failure share the same backoff and budget; the
    /// distinction only matters for logging and classification.
    pub fn observe(&self, state: RetryState, outcome: AttemptOutcome) -> RetryState {
        match (state, outcome) {
            (RetryState::Attempting { .. }, AttemptOutcome::Success) => RetryState::Succeeded,
            (RetryState::Attempting { attempt }, _) if attempt >= self.max_attempts => {
                RetryState::Exhausted { attempts: attempt }
            }
            (RetryState::Attempting { attempt }, _) => RetryState::Backoff {
                next_attempt: attempt + 1,
                delay: self.backoff,
            },
            // Terminal states absorb further observations.
            (terminal, _) => terminal,
        }
    }

    /// Leave a backoff state once its delay has elapsed.
    pub fn resume(&self, state: RetryState) -> RetryState {
        match state {
            RetryState::Backoff { next_attempt, .. } => RetryState::Attempting {
                attempt: next_attempt,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy::default()
    }

    #[test]
    fn success_terminates_immediately() {
        let state = policy().observe(policy().initial(), AttemptOutcome::Success);
        assert_eq!(state, RetryState::Succeeded);
    }

    #[test]
    fn failures_back_off_until_the_budget_is_spent() {
        let policy = policy();
        let mut state = policy.initial();
        for expected_attempt in 1..policy.max_attempts {
            assert_eq!(
                state,
                RetryState::Attempting {
                    attempt: expected_attempt
                }
            );
            state = policy.observe(state, AttemptOutcome::Overloaded);
            assert_eq!(
                state,
                RetryState::Backoff {
                    next_attempt: expected_attempt + 1,
                    delay: policy.backoff,
                }
            );
            state = policy.resume(state);
        }
        state = policy.observe(state, AttemptOutcome::Failed);
        assert_eq!(state, RetryState::Exhausted { attempts: 5 });
    }

    #[test]
    fn success_on_final_attempt_still_succeeds() {
        let policy = policy();
        let mut state = policy.initial();
        for _ in 0..4 {
            state = policy.resume(policy.observe(state, AttemptOutcome::Overloaded));
        }
        assert_eq!(state, RetryState::Attempting { attempt: 5 });
        assert_eq!(
            policy.observe(state, AttemptOutcome::Success),
            RetryState::Succeeded
        );
    }

    #[test]
    fn terminal_states_absorb_observations() {
        let policy = policy();
        assert_eq!(
            policy.observe(RetryState::Succeeded, AttemptOutcome::Failed),
            RetryState::Succeeded
        );
        assert_eq!(
            policy.observe(RetryState::Exhausted { attempts: 5 }, AttemptOutcome::Success),
            RetryState::Exhausted { attempts: 5 }
        );
        assert_eq!(policy.resume(RetryState::Succeeded), RetryState::Succeeded);
    }
}
