//! Harness configuration.
//!
//! All options are read once, when the session first initializes a browser.
//! There is no hot-reload. The struct derives `Deserialize` so callers can
//! populate it from whatever source they use for test settings; the crate
//! itself never reads configuration files.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::selector::Locator;

/// Default local WebDriver endpoint (chromedriver).
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Remote execution endpoint (Selenium hub).
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    pub host: String,
    pub port: u16,
}

impl HubConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}/wd/hub", self.host, self.port)
    }
}

/// Locators for the login flow of the application under test.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginLocators {
    /// The username input field.
    pub username: Locator,
    /// The password input field.
    pub password: Locator,
    /// The control that submits the credentials.
    pub submit: Locator,
    /// An element that exists only while logged in. It is also the control
    /// clicked by `logout()`.
    pub marker: Locator,
}

impl Default for LoginLocators {
    fn default() -> Self {
        Self {
            username: Locator::id("username"),
            password: Locator::id("password"),
            submit: Locator::css("button[type='submit']"),
            marker: Locator::id("logoff"),
        }
    }
}

/// Bounded-wait window and polling interval.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            interval: Duration::from_millis(500),
        }
    }
}

/// Configuration for a harness session.
///
/// # Example
/// ```no_run
/// use webharness::HarnessConfig;
///
/// let config = HarnessConfig::new("http://localhost:8080/")
///     .with_credentials("qa", "secret");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URL of the application under test.
    pub site_url: String,
    /// Local WebDriver server endpoint. Ignored when `hub` is set.
    pub webdriver_url: String,
    /// Optional remote hub; takes precedence over `webdriver_url` and
    /// `driver_path`.
    pub hub: Option<HubConfig>,
    /// Optional driver executable to spawn locally. Only used when no hub
    /// is configured.
    pub driver_path: Option<PathBuf>,
    /// Default credentials used by `ensure_ready()`.
    pub username: String,
    pub password: String,
    pub login: LoginLocators,
    pub wait: WaitConfig,
    /// Bounded wait for the post-login marker element.
    pub login_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost/".to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            hub: None,
            driver_path: None,
            username: String::new(),
            password: String::new(),
            login: LoginLocators::default(),
            wait: WaitConfig::default(),
            login_timeout: Duration::from_secs(40),
        }
    }
}

impl HarnessConfig {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            ..Self::default()
        }
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    pub fn with_hub(mut self, host: impl Into<String>, port: u16) -> Self {
        self.hub = Some(HubConfig {
            host: host.into(),
            port,
        });
        self
    }

    pub fn with_driver_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.driver_path = Some(path.into());
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_login_locators(mut self, locators: LoginLocators) -> Self {
        self.login = locators;
        self
    }

    pub fn with_wait(mut self, timeout: Duration, interval: Duration) -> Self {
        self.wait = WaitConfig { timeout, interval };
        self
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// The WebDriver endpoint the session will be created against.
    pub fn server_url(&self) -> String {
        match &self.hub {
            Some(hub) => hub.url(),
            None => self.webdriver_url.clone(),
        }
    }
}
