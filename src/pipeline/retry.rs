//! Bounded retry with a fixed pause between attempts.
//!
//! [`RetryPolicy::run`] knows nothing about rendering: it calls an operation
//! until it succeeds or the attempt budget is spent. The pause goes through a
//! [`Sleeper`] so tests can count delays instead of waiting for them.
//!
//! The delay is fixed, not exponential: attempt N+1 starts `delay` after
//! attempt N failed.

use std::time::Duration;
use tracing::warn;

/// Blocks the current thread between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// The production sleeper: `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub max_attempts: u32,
    /// Pause after each failed attempt except the last.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Every attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetriesExhausted<E> {
    pub attempts: u32,
    /// Error from the final attempt.
    pub last_error: E,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Run `op` until it returns `Ok` or the budget is spent.
    ///
    /// `op` receives the 1-indexed attempt number. On exhaustion `op` has been
    /// called `max_attempts` times and `sleeper` `max_attempts - 1` times.
    pub fn run<T, E, F>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, RetriesExhausted<E>>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= max_attempts => {
                    warn!("attempt {}/{} failed — {}", attempt, max_attempts, e);
                    return Err(RetriesExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    warn!(
                        "attempt {}/{} failed — {}; retrying in {}ms",
                        attempt,
                        max_attempts,
                        e,
                        self.delay.as_millis()
                    );
                    sleeper.sleep(self.delay);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    /// An operation that fails `failures` times, then succeeds.
    fn flaky(failures: u32) -> impl FnMut(u32) -> Result<&'static str, String> {
        let mut calls = 0;
        move |_attempt| {
            calls += 1;
            if calls <= failures {
                Err(format!("boom {calls}"))
            } else {
                Ok("done")
            }
        }
    }

    #[test]
    fn first_try_success_never_sleeps() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(3, Duration::from_millis(5));
        assert_eq!(policy.run(&sleeper, flaky(0)), Ok("done"));
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[test]
    fn recovers_after_transient_failures() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(3, Duration::from_millis(5));
        assert_eq!(policy.run(&sleeper, flaky(2)), Ok("done"));
        assert_eq!(
            *sleeper.slept.lock().unwrap(),
            vec![Duration::from_millis(5); 2]
        );
    }

    #[test]
    fn exhausts_after_max_attempts_with_one_fewer_delay() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        let mut seen = Vec::new();
        let result: Result<(), _> = policy.run(&sleeper, |attempt| {
            seen.push(attempt);
            Err(format!("fail {attempt}"))
        });
        assert_eq!(
            result,
            Err(RetriesExhausted {
                attempts: 3,
                last_error: "fail 3".to_string()
            })
        );
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(sleeper.slept.lock().unwrap().len(), 2);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::new(0, Duration::from_millis(1));
        let result: Result<(), _> = policy.run(&sleeper, |_| Err("nope"));
        assert_eq!(result.unwrap_err().attempts, 1);
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    #[test]
    fn default_policy_is_three_attempts_two_seconds() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.delay, Duration::from_secs(2));
    }
}
