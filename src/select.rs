//! Dropdown (`<select>`) handling.

use stringmatch::Needle;

use crate::backend::{Backend, Element};
use crate::error::{HarnessError, HarnessResult};
use crate::selector::{escape_string, Locator};
use crate::session::GenericSession;

/// Click an option if its selection state differs from the desired one.
fn set_selected<E: Element>(option: &E, select: bool) -> HarnessResult<()> {
    if option.is_selected()? != select {
        option.click()?;
    }
    Ok(())
}

/// Convenience wrapper for a `<select>` element.
pub struct Select<E: Element> {
    element: E,
    multiple: bool,
}

impl<E: Element> Select<E> {
    /// Wrap the specified element, which must be a `<select>` element.
    pub fn new(element: E) -> HarnessResult<Self> {
        let multiple = element.attr("multiple")?.filter(|x| x != "false").is_some();
        Ok(Select {
            element,
            multiple,
        })
    }

    /// Whether this is a multi-select.
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// All options belonging to this select, in document order.
    pub fn options(&self) -> HarnessResult<Vec<E>> {
        self.element.find_all(&Locator::tag("option"))
    }

    /// The first selected option.
    pub fn first_selected(&self) -> HarnessResult<E> {
        for option in self.options()? {
            if option.is_selected()? {
                return Ok(option);
            }
        }
        Err(HarnessError::not_found("no options are selected"))
    }

    /// The visible texts of all options, in document order.
    pub fn option_texts(&self) -> HarnessResult<Vec<String>> {
        self.options()?.iter().map(|o| o.text()).collect()
    }

    /// Select options whose `value` attribute equals the specified value.
    /// For a single select only the first match is selected.
    pub fn select_by_value(&self, value: &str) -> HarnessResult<()> {
        let locator = Locator::css(format!("option[value={}]", escape_string(value)));
        let options = self.element.find_all(&locator)?;
        if options.is_empty() {
            return Err(HarnessError::not_found(format!(
                "option with value {:?}",
                value
            )));
        }
        for option in options {
            set_selected(&option, true)?;
            if !self.multiple {
                break;
            }
        }
        Ok(())
    }

    /// Select the option at the specified position (zero-based, document
    /// order).
    pub fn select_by_index(&self, index: usize) -> HarnessResult<()> {
        let options = self.options()?;
        match options.get(index) {
            Some(option) => set_selected(option, true),
            None => Err(HarnessError::not_found(format!(
                "option at index {} (dropdown has {})",
                index,
                options.len()
            ))),
        }
    }

    /// Select options whose visible text matches the needle. For a single
    /// select only the first match is selected.
    pub fn select_by_text<N>(&self, needle: N) -> HarnessResult<()>
    where
        N: Needle,
    {
        let mut matched = false;
        for option in self.options()? {
            if needle.is_match(&option.text()?) {
                set_selected(&option, true)?;
                matched = true;
                if !self.multiple {
                    break;
                }
            }
        }
        if matched {
            Ok(())
        } else {
            Err(HarnessError::not_found(
                "option with matching visible text".to_string(),
            ))
        }
    }
}

impl<B: Backend> GenericSession<B> {
    /// Select a dropdown option by its `value` attribute.
    pub fn select_value(&mut self, locator: &Locator, value: &str) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        Select::new(backend.find(locator)?)?.select_by_value(value)
    }

    /// Select a dropdown option by position.
    pub fn select_index(&mut self, locator: &Locator, index: usize) -> HarnessResult<()> {
        let backend = self.ready_backend()?;
        Select::new(backend.find(locator)?)?.select_by_index(index)
    }

    /// Select a dropdown option by its visible text.
    pub fn select_text<N>(&mut self, locator: &Locator, needle: N) -> HarnessResult<()>
    where
        N: Needle,
    {
        let backend = self.ready_backend()?;
        Select::new(backend.find(locator)?)?.select_by_text(needle)
    }

    /// The visible text of the currently selected dropdown option.
    pub fn selected_text(&mut self, locator: &Locator) -> HarnessResult<String> {
        let backend = self.ready_backend()?;
        Select::new(backend.find(locator)?)?.first_selected()?.text()
    }
}
