use std::time::Duration;

use thirtyfour_sync::error::WebDriverError;

/// Convenience type alias used by every fallible operation in this crate.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Error type for all harness operations.
///
/// Probes (`is_present()`, `is_visible()`, `is_authenticated()`, ...) never
/// return these; they convert every failure into `false`. Actions (click,
/// type, select, login, logout) return them and are never retried
/// internally. Retry, if desired, is the caller's responsibility.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// An element the operation depends on does not exist.
    #[error("element not found: {0}")]
    NotFound(String),

    /// A bounded wait elapsed without the condition being met.
    #[error("timed out after {waited:?}: {message}")]
    Timeout {
        message: String,
        waited: Duration,
    },

    /// The browser process or remote session became unreachable.
    #[error("browser session lost: {0}")]
    SessionLost(String),

    /// An element exists but is not in the state an action requires
    /// (e.g. not displayed, not enabled).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The session guard tripped on an earlier failure. `teardown()` is the
    /// only way out of this state.
    #[error("session previously failed to initialize; call teardown() before retrying")]
    SessionFailed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("webdriver error: {0}")]
    WebDriver(#[from] WebDriverError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Construct a `NotFound` error for the specified description.
    pub fn not_found(what: impl Into<String>) -> Self {
        HarnessError::NotFound(what.into())
    }

    /// Construct a `Precondition` error for the specified description.
    pub fn precondition(what: impl Into<String>) -> Self {
        HarnessError::Precondition(what.into())
    }
}
