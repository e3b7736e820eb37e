//! Simulated user input and element-state probes.
//!
//! Actions (`click`, `type_text`, ...) propagate failures and are never
//! retried here; probes (`is_present`, `is_visible`, ...) never fail and
//! report `false` for missing elements and unreachable browsers alike.
//! Every operation readies the session first.

use stringmatch::Needle;

use crate::backend::{find_opt, Backend, ControlKey, Element};
use crate::error::{HarnessError, HarnessResult};
use crate::selector::{Locator, TextMatch};
use crate::session::{validate_element, GenericSession};

impl<B: Backend> GenericSession<B> {
    /// Click the first element matching the locator.
    pub fn click(&mut self, locator: &Locator) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        backend.find(locator)?.click()
    }

    /// Click a button (or other `tag` element) by its display text.
    pub fn click_button(&mut self, text: &str) -> HarnessResult<()> {
        self.click_button_tag("button", text)
    }

    pub fn click_button_tag(&mut self, tag: &str, text: &str) -> HarnessResult<()> {
        let locator = Locator::text(tag, text, TextMatch::Contains);
        self.click(&locator)
    }

    /// Type into the first element matching the locator. The element must
    /// be displayed and enabled.
    pub fn type_text(&mut self, locator: &Locator, text: &str) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        let element = backend.find(locator)?;
        validate_element(&element, "input element")?;
        element.send_keys(text)
    }

    /// Type into the input associated with a label, located via the
    /// label's `for` attribute.
    pub fn type_text_by_label(
        &mut self,
        label_text: &str,
        text: &str,
        mode: TextMatch,
    ) -> HarnessResult<()> {
        let locator = Locator::for_label(label_text, mode);
        match self.type_text(&locator, text) {
            Err(HarnessError::NotFound(_)) => Err(HarnessError::not_found(format!(
                "textbox with associated label text {:?}",
                label_text
            ))),
            other => other,
        }
    }

    /// Clear a textbox, optionally pressing Enter afterwards so the
    /// application reacts to the now-empty value.
    pub fn clear(&mut self, locator: &Locator, submit_after: bool) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        let element = backend.find(locator)?;
        validate_element(&element, "input element")?;
        element.clear()?;
        if submit_after {
            element.send_key(ControlKey::Enter)?;
        }
        Ok(())
    }

    /// Select a radio input by its `value` attribute.
    pub fn radio_select(&mut self, value: &str) -> HarnessResult<()> {
        self.click(&Locator::radio(value))
    }

    /// Focus an element without typing into it.
    pub fn focus(&mut self, locator: &Locator) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        let element = backend.find(locator)?;
        validate_element(&element, "element to focus")?;
        element.send_key(ControlKey::Null)
    }

    /// Move the pointer over an element.
    pub fn hover(&mut self, locator: &Locator) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        backend.find(locator)?.hover()
    }

    /// Text contents of the first matching element.
    pub fn text_of(&mut self, locator: &Locator) -> HarnessResult<String> {
        let backend = self.ready_backend()?;
        backend.find(locator)?.text()
    }

    /// Attribute of the first matching element.
    pub fn attr_of(&mut self, locator: &Locator, name: &str) -> HarnessResult<Option<String>> {
        let backend = self.ready_backend()?;
        backend.find(locator)?.attr(name)
    }

    /// The `value` attribute of the first matching element.
    pub fn value_of(&mut self, locator: &Locator) -> HarnessResult<Option<String>> {
        self.attr_of(locator, "value")
    }

    /// Whether the element's text matches the needle.
    pub fn text_matches<N>(&mut self, locator: &Locator, needle: N) -> HarnessResult<bool>
    where
        N: Needle,
    {
        Ok(needle.is_match(&self.text_of(locator)?))
    }

    /// Whether at least one element matches. Never fails.
    pub fn is_present(&mut self, locator: &Locator) -> bool {
        match self.ready_backend() {
            Ok(backend) => matches!(find_opt(backend, locator), Ok(Some(_))),
            Err(_) => false,
        }
    }

    /// Whether a matching element exists and is displayed. Never fails.
    pub fn is_visible(&mut self, locator: &Locator) -> bool {
        match self.ready_backend() {
            Ok(backend) => match find_opt(backend, locator) {
                Ok(Some(element)) => element.is_displayed().unwrap_or(false),
                _ => false,
            },
            Err(_) => false,
        }
    }

    /// Whether a matching element exists and is enabled. Never fails.
    pub fn is_enabled(&mut self, locator: &Locator) -> bool {
        match self.ready_backend() {
            Ok(backend) => match find_opt(backend, locator) {
                Ok(Some(element)) => element.is_enabled().unwrap_or(false),
                _ => false,
            },
            Err(_) => false,
        }
    }

    /// Whether a matching element exists and is selected. Never fails.
    pub fn is_selected(&mut self, locator: &Locator) -> bool {
        match self.ready_backend() {
            Ok(backend) => match find_opt(backend, locator) {
                Ok(Some(element)) => element.is_selected().unwrap_or(false),
                _ => false,
            },
            Err(_) => false,
        }
    }

    /// Scroll the page to the top.
    pub fn scroll_to_top(&mut self) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        backend.execute_script("window.scrollTo(0, 0);")?;
        Ok(())
    }

    /// Scroll the page to the bottom.
    pub fn scroll_to_bottom(&mut self) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        backend.execute_script("window.scrollTo(0, document.body.scrollHeight);")?;
        Ok(())
    }

    /// Scroll the page vertically by `delta` pixels (negative scrolls up).
    pub fn scroll_by(&mut self, delta: i64) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        backend.execute_script(&format!("window.scrollBy(0, {});", delta))?;
        Ok(())
    }
}
