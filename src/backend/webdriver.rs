//! Production backend over the `thirtyfour_sync` WebDriver binding.

use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use thirtyfour_sync::error::WebDriverError;
use thirtyfour_sync::prelude::*;
use thirtyfour_sync::ChromeCapabilities;

use crate::backend::{Backend, ControlKey, Element};
use crate::error::{HarnessError, HarnessResult};
use crate::selector::Locator;
use crate::HarnessConfig;

/// How long a freshly spawned driver process gets to start listening.
const DRIVER_STARTUP_WINDOW: Duration = Duration::from_secs(5);
const DRIVER_STARTUP_POLL: Duration = Duration::from_millis(250);

/// A browser session driven over the WebDriver protocol.
///
/// Created against either a locally spawned driver executable, an already
/// running local WebDriver server, or a remote hub, depending on the
/// configuration.
pub struct WebDriverBackend {
    driver: WebDriver,
    child: Option<Child>,
}

impl Backend for WebDriverBackend {
    type Elem<'a> = WdElement<'a> where Self: 'a;

    fn create(config: &HarnessConfig) -> HarnessResult<Self> {
        let server_url = config.server_url();

        let mut child = None;
        if config.hub.is_none() {
            if let Some(path) = &config.driver_path {
                let port = url_port(&config.webdriver_url).ok_or_else(|| {
                    HarnessError::Config(format!(
                        "webdriver_url {:?} has no port; one is required to spawn {:?}",
                        config.webdriver_url, path
                    ))
                })?;
                debug!("spawning driver {:?} on port {}", path, port);
                let process = Command::new(path)
                    .arg(format!("--port={}", port))
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()?;
                child = Some(process);
            }
        }

        let caps = DesiredCapabilities::chrome();
        let driver = match connect(&server_url, &caps, child.is_some()) {
            Ok(driver) => driver,
            Err(e) => {
                if let Some(mut process) = child {
                    let _ = process.kill();
                    let _ = process.wait();
                }
                return Err(e.into());
            }
        };

        if let Err(e) = driver.maximize_window() {
            warn!("could not maximize browser window: {}", e);
        }

        Ok(WebDriverBackend {
            driver,
            child,
        })
    }

    fn navigate(&self, url: &str) -> HarnessResult<()> {
        self.driver.get(url)?;
        Ok(())
    }

    fn current_url(&self) -> HarnessResult<String> {
        Ok(self.driver.current_url()?)
    }

    fn refresh(&self) -> HarnessResult<()> {
        self.driver.refresh()?;
        Ok(())
    }

    fn find(&self, locator: &Locator) -> HarnessResult<Self::Elem<'_>> {
        let elem = self
            .driver
            .find_element(to_by(locator))
            .map_err(|e| locate_err(e, locator))?;
        Ok(WdElement {
            inner: elem,
            driver: &self.driver,
        })
    }

    fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<Self::Elem<'_>>> {
        let elems = self
            .driver
            .find_elements(to_by(locator))
            .map_err(|e| locate_err(e, locator))?;
        Ok(elems
            .into_iter()
            .map(|inner| WdElement {
                inner,
                driver: &self.driver,
            })
            .collect())
    }

    fn execute_script(&self, script: &str) -> HarnessResult<serde_json::Value> {
        let ret = self.driver.execute_script(script)?;
        Ok(ret.value().clone())
    }

    fn window_count(&self) -> HarnessResult<usize> {
        Ok(self.driver.window_handles()?.len())
    }

    fn quit(mut self) -> HarnessResult<()> {
        let result = self.driver.quit();
        if let Some(mut process) = self.child.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
        result?;
        Ok(())
    }
}

/// Connect to the WebDriver server, polling briefly when the driver
/// process was spawned just now and may not be listening yet.
fn connect(
    server_url: &str,
    caps: &ChromeCapabilities,
    freshly_spawned: bool,
) -> Result<WebDriver, WebDriverError> {
    if !freshly_spawned {
        return WebDriver::new(server_url, caps);
    }

    let deadline = Instant::now() + DRIVER_STARTUP_WINDOW;
    loop {
        match WebDriver::new(server_url, caps) {
            Ok(driver) => return Ok(driver),
            Err(e) if Instant::now() >= deadline => return Err(e),
            Err(_) => thread::sleep(DRIVER_STARTUP_POLL),
        }
    }
}

/// An element handle paired with the driver that produced it, so that
/// pointer actions can build an action chain.
pub struct WdElement<'a> {
    inner: WebElement<'a>,
    driver: &'a WebDriver,
}

impl Element for WdElement<'_> {
    fn click(&self) -> HarnessResult<()> {
        self.inner.click()?;
        Ok(())
    }

    fn send_keys(&self, text: &str) -> HarnessResult<()> {
        self.inner.send_keys(text)?;
        Ok(())
    }

    fn send_key(&self, key: ControlKey) -> HarnessResult<()> {
        let keys = match key {
            ControlKey::Enter => Keys::Enter,
            ControlKey::Escape => Keys::Escape,
            ControlKey::Tab => Keys::Tab,
            ControlKey::Null => Keys::Null,
        };
        self.inner.send_keys(TypingData::from("") + keys)?;
        Ok(())
    }

    fn clear(&self) -> HarnessResult<()> {
        self.inner.clear()?;
        Ok(())
    }

    fn text(&self) -> HarnessResult<String> {
        Ok(self.inner.text()?)
    }

    fn attr(&self, name: &str) -> HarnessResult<Option<String>> {
        Ok(self.inner.get_attribute(name)?)
    }

    fn is_displayed(&self) -> HarnessResult<bool> {
        Ok(self.inner.is_displayed()?)
    }

    fn is_enabled(&self) -> HarnessResult<bool> {
        Ok(self.inner.is_enabled()?)
    }

    fn is_selected(&self) -> HarnessResult<bool> {
        Ok(self.inner.is_selected()?)
    }

    fn hover(&self) -> HarnessResult<()> {
        self.driver
            .action_chain()
            .move_to_element_center(&self.inner)
            .perform()?;
        Ok(())
    }

    fn find(&self, locator: &Locator) -> HarnessResult<Self> {
        let elem = self
            .inner
            .find_element(to_by(locator))
            .map_err(|e| locate_err(e, locator))?;
        Ok(self.rebind(&elem))
    }

    fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<Self>> {
        let elems = self
            .inner
            .find_elements(to_by(locator))
            .map_err(|e| locate_err(e, locator))?;
        Ok(elems.iter().map(|elem| self.rebind(elem)).collect())
    }
}

impl<'a> WdElement<'a> {
    /// Child lookups borrow the parent element; rebind the returned
    /// element id to the session so children live as long as the session
    /// rather than the parent handle.
    fn rebind(&self, elem: &WebElement<'_>) -> WdElement<'a> {
        WdElement {
            inner: WebElement::new(&self.driver.session, elem.element_id.clone()),
            driver: self.driver,
        }
    }
}

fn to_by(locator: &Locator) -> By<'_> {
    match locator {
        Locator::Css(s) => By::Css(s),
        Locator::XPath(s) => By::XPath(s),
        Locator::Id(s) => By::Id(s),
        Locator::Name(s) => By::Name(s),
        Locator::Tag(s) => By::Tag(s),
        Locator::LinkText(s) => By::LinkText(s),
    }
}

fn locate_err(e: WebDriverError, locator: &Locator) -> HarnessError {
    match e {
        WebDriverError::NoSuchElement(_) => HarnessError::NotFound(locator.to_string()),
        other => other.into(),
    }
}

fn url_port(url: &str) -> Option<u16> {
    let after_colon = url.rsplit(':').next()?;
    let digits: String = after_colon
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::url_port;

    #[test]
    fn port_extraction() {
        assert_eq!(url_port("http://localhost:9515"), Some(9515));
        assert_eq!(url_port("http://127.0.0.1:4444/wd/hub"), Some(4444));
        assert_eq!(url_port("http://localhost"), None);
    }
}
