//! Bounded waits with a polling interval.
//!
//! Every wait in the harness blocks the calling thread until its condition
//! holds or the window elapses; there is no cancellation beyond the
//! timeout. The ticker schedules polls so that the Nth poll is due no
//! earlier than `interval * N` after the first one started, sleeping only
//! for however much of that interval the condition check did not consume.

use std::thread;
use std::time::{Duration, Instant};

use stringmatch::Needle;

use crate::backend::{find_opt, Backend, Element};
use crate::error::{HarnessError, HarnessResult};
use crate::selector::Locator;

/// A bounded-wait policy: total window, polling interval and a minimum
/// number of condition checks (at least one is always performed).
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    pub timeout: Duration,
    pub interval: Duration,
    pub min_tries: u32,
}

impl Wait {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            min_tries: 1,
        }
    }

    /// Check the condition exactly once, without sleeping.
    pub fn no_wait() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn with_min_tries(mut self, min_tries: u32) -> Self {
        self.min_tries = min_tries;
        self
    }
}

pub(crate) struct Ticker {
    timeout: Duration,
    interval: Duration,
    min_tries: u32,
    start: Instant,
    tries: u32,
}

impl Ticker {
    pub(crate) fn new(wait: Wait) -> Self {
        Self {
            timeout: wait.timeout,
            interval: wait.interval,
            min_tries: wait.min_tries,
            start: Instant::now(),
            tries: 0,
        }
    }

    /// Advance to the next poll, sleeping as needed. Returns false once
    /// the window has elapsed and the minimum tries are done.
    pub(crate) fn tick(&mut self) -> bool {
        self.tries += 1;

        if self.start.elapsed() >= self.timeout && self.tries >= self.min_tries {
            return false;
        }

        // Next poll is due no earlier than this long after the start.
        let due = self.interval * self.tries;
        let elapsed = self.start.elapsed();
        if elapsed < due {
            thread::sleep(due - elapsed);
        }

        true
    }
}

/// Poll `condition` under the given policy; a condition that never holds
/// yields [`HarnessError::Timeout`] carrying `message`.
pub fn wait_for<F>(wait: Wait, message: &str, mut condition: F) -> HarnessResult<()>
where
    F: FnMut() -> HarnessResult<bool>,
{
    let mut ticker = Ticker::new(wait);
    loop {
        if condition()? {
            return Ok(());
        }
        if !ticker.tick() {
            return Err(HarnessError::Timeout {
                message: message.to_string(),
                waited: wait.timeout,
            });
        }
    }
}

/// Convert condition-check failures into "condition not met" when the
/// waiter is in its default ignore-errors mode.
pub(crate) fn handle_errors(result: HarnessResult<bool>, ignore: bool) -> HarnessResult<bool> {
    match result {
        Ok(x) => Ok(x),
        Err(_) if ignore => Ok(false),
        Err(e) => Err(e),
    }
}

/// Builder for explicit waits against a locator.
///
/// Obtained from [`GenericSession::wait_until`](crate::GenericSession::wait_until).
///
/// # Example
/// ```no_run
/// # use webharness::{HarnessConfig, Locator, Session};
/// # fn main() -> webharness::HarnessResult<()> {
/// # let mut session = Session::new(HarnessConfig::new("http://localhost/"));
/// session.wait_until()?.visible(&Locator::id("report"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Waiter<'a, B: Backend> {
    backend: &'a B,
    wait: Wait,
    message: Option<String>,
    ignore_errors: bool,
}

impl<'a, B: Backend> Waiter<'a, B> {
    pub(crate) fn new(backend: &'a B, wait: Wait) -> Self {
        Self {
            backend,
            wait,
            message: None,
            ignore_errors: true,
        }
    }

    /// Override the wait window for this wait only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.wait.timeout = timeout;
        self
    }

    /// Override the polling interval for this wait only.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.wait.interval = interval;
        self
    }

    /// Human-readable message to carry in a timeout error.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// By default, errors raised while polling count as "condition not
    /// met". Disable to return early on the first error instead.
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    fn run<F>(self, default_message: String, mut condition: F) -> HarnessResult<()>
    where
        F: FnMut(&'a B) -> HarnessResult<bool>,
    {
        let message = self.message.unwrap_or(default_message);
        let ignore = self.ignore_errors;
        let backend = self.backend;
        wait_for(self.wait, &message, || {
            handle_errors(condition(backend), ignore)
        })
    }

    /// Wait for at least one matching element to exist.
    pub fn present(self, locator: &Locator) -> HarnessResult<()> {
        let msg = format!("waiting for {} to be present", locator);
        self.run(msg, |b| Ok(find_opt(b, locator)?.is_some()))
    }

    /// Wait for a matching element to exist and be displayed.
    pub fn visible(self, locator: &Locator) -> HarnessResult<()> {
        let msg = format!("waiting for {} to be visible", locator);
        self.run(msg, |b| match find_opt(b, locator)? {
            Some(elem) => elem.is_displayed(),
            None => Ok(false),
        })
    }

    /// Wait until no matching element is displayed (absence counts).
    pub fn not_visible(self, locator: &Locator) -> HarnessResult<()> {
        let msg = format!("waiting for {} to not be visible", locator);
        self.run(msg, |b| match find_opt(b, locator)? {
            Some(elem) => elem.is_displayed().map(|d| !d),
            None => Ok(true),
        })
    }

    /// Wait for a matching element to exist and be enabled.
    pub fn enabled(self, locator: &Locator) -> HarnessResult<()> {
        let msg = format!("waiting for {} to be enabled", locator);
        self.run(msg, |b| match find_opt(b, locator)? {
            Some(elem) => elem.is_enabled(),
            None => Ok(false),
        })
    }

    /// Wait for a matching element to be displayed and enabled.
    pub fn clickable(self, locator: &Locator) -> HarnessResult<()> {
        let msg = format!("waiting for {} to be clickable", locator);
        self.run(msg, |b| match find_opt(b, locator)? {
            Some(elem) => Ok(elem.is_displayed()? && elem.is_enabled()?),
            None => Ok(false),
        })
    }

    /// Wait for a matching element to be selected.
    pub fn selected(self, locator: &Locator) -> HarnessResult<()> {
        let msg = format!("waiting for {} to be selected", locator);
        self.run(msg, |b| match find_opt(b, locator)? {
            Some(elem) => elem.is_selected(),
            None => Ok(false),
        })
    }

    /// Wait for the element's text to match the needle.
    pub fn text<N>(self, locator: &Locator, needle: N) -> HarnessResult<()>
    where
        N: Needle,
    {
        let msg = format!("waiting for text in {}", locator);
        self.run(msg, |b| match find_opt(b, locator)? {
            Some(elem) => Ok(needle.is_match(&elem.text()?)),
            None => Ok(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn condition_met_on_first_try_does_not_sleep() {
        let started = Instant::now();
        let wait = Wait::new(Duration::from_secs(5), Duration::from_secs(1));
        wait_for(wait, "never", || Ok(true)).unwrap();
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn timeout_is_bounded() {
        let wait = Wait::new(Duration::from_millis(100), Duration::from_millis(20));
        let started = Instant::now();
        let err = wait_for(wait, "give up", || Ok(false)).unwrap_err();
        assert!(started.elapsed() < Duration::from_millis(600));
        match err {
            HarnessError::Timeout {
                message,
                waited,
            } => {
                assert_eq!(message, "give up");
                assert_eq!(waited, Duration::from_millis(100));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn min_tries_are_honoured() {
        let tries = Cell::new(0u32);
        let wait = Wait::no_wait().with_min_tries(3);
        let _ = wait_for(wait, "count", || {
            tries.set(tries.get() + 1);
            Ok(false)
        });
        assert_eq!(tries.get(), 3);
    }

    #[test]
    fn condition_errors_propagate() {
        let wait = Wait::no_wait();
        let err = wait_for(wait, "boom", || {
            Err(HarnessError::not_found("#missing")) as HarnessResult<bool>
        })
        .unwrap_err();
        assert!(matches!(err, HarnessError::NotFound(_)));
    }

    #[test]
    fn handle_errors_swallows_when_ignoring() {
        let swallowed = handle_errors(Err(HarnessError::not_found("x")), true).unwrap();
        assert!(!swallowed);
        assert!(handle_errors(Err(HarnessError::not_found("x")), false).is_err());
    }
}
