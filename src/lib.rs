//! Webharness is a synchronous browser-test harness for Rust, built on the
//! `thirtyfour_sync` WebDriver library.
//!
//! It wraps a WebDriver session in the plumbing a UI-test suite needs but
//! should not have to repeat in every test: a one-shot login/session
//! guard, typed selectors, bounded waits with a polling interval, input
//! simulation, dropdown handling and navigation-menu extraction.
//!
//! ## Features
//!
//! - Lazy, idempotent session guard: the browser starts and the login flow
//!   runs at most once per session, no matter which helper is called first
//! - Explicit session lifecycle with a distinct failed state; no silently
//!   stuck guard after a failed login
//! - Typed selector construction (exact / starts-with / ends-with /
//!   contains, case folding) instead of ad-hoc XPath formatting
//! - Explicit waits for presence, visibility, enabledness and text
//! - Click, type, clear, radio, focus, hover and `<select>` helpers
//! - Navigation-menu snapshots as a plain serializable tree
//! - Backend trait with a mock implementation for testing harness code
//!   without a browser
//!
//! ## Example
//!
//! The following assumes chromedriver running at localhost:9515 and the
//! application under test at localhost:8080.
//!
//! ```no_run
//! use webharness::prelude::*;
//!
//! fn main() -> HarnessResult<()> {
//!     let config = HarnessConfig::new("http://localhost:8080/")
//!         .with_credentials("qa", "secret");
//!     let mut session = Session::new(config);
//!
//!     // Starts the browser and logs in, exactly once.
//!     session.ensure_ready(true)?;
//!
//!     session.menu("Reports", "Monthly")?;
//!     session.wait_until()?.visible(&Locator::id("report"))?;
//!     session.type_text(&Locator::id("filter"), "2026")?;
//!     session.click_button("Apply")?;
//!
//!     let menu = session.menu_tree(&Locator::css("#mainMenu > li"))?;
//!     assert!(!menu.is_empty());
//!
//!     session.teardown();
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub use backend::{Backend, ControlKey, Element, MockBackend, MockHandle, MockNode};
pub use backend::WebDriverBackend;
pub use config::{HarnessConfig, HubConfig, LoginLocators, WaitConfig};
pub use error::{HarnessError, HarnessResult};
pub use nav::{MenuItem, MAX_MENU_DEPTH};
pub use select::Select;
pub use selector::{escape_string, AttrQuery, Locator, TextMatch};
pub use session::{GenericSession, Session, SessionState};
pub use wait::{Wait, Waiter};

/// Re-export of the needle types accepted by text-matching APIs.
pub use stringmatch::{Needle, StringMatch};

pub mod prelude {
    pub use crate::backend::{Backend, ControlKey, Element};
    pub use crate::config::{HarnessConfig, LoginLocators};
    pub use crate::error::{HarnessError, HarnessResult};
    pub use crate::nav::MenuItem;
    pub use crate::select::Select;
    pub use crate::selector::{Locator, TextMatch};
    pub use crate::session::{GenericSession, Session, SessionState};
    pub use crate::wait::Wait;
}

pub mod backend;
pub mod config;
pub mod error;
mod input;
pub mod nav;
pub mod select;
pub mod selector;
pub mod session;
pub mod wait;
