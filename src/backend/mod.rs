//! The browser capability interface.
//!
//! The harness core never talks to a WebDriver server directly; it drives
//! an opaque [`Backend`], of which [`WebDriverBackend`] is the production
//! implementation and [`MockBackend`] an in-memory one for tests.

use crate::error::{HarnessError, HarnessResult};
use crate::selector::Locator;
use crate::HarnessConfig;

pub mod mock;
pub mod webdriver;

pub use mock::{MockBackend, MockHandle, MockNode};
pub use webdriver::WebDriverBackend;

/// Non-printing keys the harness can send to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Enter,
    Escape,
    Tab,
    /// The WebDriver NULL key; sending it focuses the element without
    /// typing anything.
    Null,
}

/// A single element within a browser session.
pub trait Element: Sized {
    fn click(&self) -> HarnessResult<()>;
    fn send_keys(&self, text: &str) -> HarnessResult<()>;
    fn send_key(&self, key: ControlKey) -> HarnessResult<()>;
    fn clear(&self) -> HarnessResult<()>;
    fn text(&self) -> HarnessResult<String>;
    fn attr(&self, name: &str) -> HarnessResult<Option<String>>;
    fn is_displayed(&self) -> HarnessResult<bool>;
    fn is_enabled(&self) -> HarnessResult<bool>;
    fn is_selected(&self) -> HarnessResult<bool>;
    /// Move the pointer over this element.
    fn hover(&self) -> HarnessResult<()>;
    /// Search below this element.
    fn find(&self, locator: &Locator) -> HarnessResult<Self>;
    /// Search below this element; no match yields an empty vec, not an error.
    fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<Self>>;
}

/// A browser session capability.
///
/// Any WebDriver-compatible automation backend satisfies this; the
/// session guard is generic over it, so harness logic can be exercised
/// against [`MockBackend`] as easily as against a real browser.
pub trait Backend: Sized {
    type Elem<'a>: Element
    where
        Self: 'a;

    /// Start a browser session as described by the configuration and
    /// prepare its viewport (maximized).
    fn create(config: &HarnessConfig) -> HarnessResult<Self>;

    fn navigate(&self, url: &str) -> HarnessResult<()>;
    fn current_url(&self) -> HarnessResult<String>;
    fn refresh(&self) -> HarnessResult<()>;

    /// Find the first element matching the locator. Absence is a
    /// [`HarnessError::NotFound`].
    fn find(&self, locator: &Locator) -> HarnessResult<Self::Elem<'_>>;

    /// Find all elements matching the locator, in document order. No match
    /// yields an empty vec.
    fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<Self::Elem<'_>>>;

    fn execute_script(&self, script: &str) -> HarnessResult<serde_json::Value>;

    /// Number of open windows/tabs in this session.
    fn window_count(&self) -> HarnessResult<usize>;

    /// End the browser session, releasing any resources it holds.
    fn quit(self) -> HarnessResult<()>;
}

/// Find the first match, mapping not-found to `None` and keeping every
/// other failure as an error.
pub(crate) fn find_opt<'a, B: Backend>(
    backend: &'a B,
    locator: &Locator,
) -> HarnessResult<Option<B::Elem<'a>>> {
    match backend.find(locator) {
        Ok(elem) => Ok(Some(elem)),
        Err(HarnessError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
