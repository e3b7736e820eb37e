//! The session guard.
//!
//! A [`GenericSession`] owns at most one browser session and performs
//! browser creation and login each at most once for its lifetime. Every
//! UI helper in this crate goes through [`ensure_ready`] before touching
//! the DOM, so test code can call helpers in any order without caring
//! which one runs first.
//!
//! [`ensure_ready`]: GenericSession::ensure_ready

use log::{debug, error, info};

use crate::backend::{find_opt, Backend, Element, WebDriverBackend};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::wait::{Wait, Waiter};

/// Lifecycle state of a session.
///
/// There is no recovery transition out of `Failed`; a session that failed
/// to initialize or log in stays failed until [`GenericSession::teardown`]
/// resets it. A guard that silently no-ops after a failed login would turn
/// every later assertion into a misleading failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    ReadyUnauthenticated,
    ReadyAuthenticated,
    Failed,
}

/// A browser session plus its one-shot initialization and login guard,
/// generic over the browser backend.
///
/// Use the [`Session`] alias for the WebDriver-backed session.
pub struct GenericSession<B: Backend> {
    config: HarnessConfig,
    backend: Option<B>,
    state: SessionState,
}

/// A WebDriver-backed harness session.
pub type Session = GenericSession<WebDriverBackend>;

impl<B: Backend> GenericSession<B> {
    /// Create a session in the `Uninitialized` state. No browser is
    /// started until the first operation needs one.
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            backend: None,
            state: SessionState::Uninitialized,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Guarantee that a browser session exists and, when `require_login`
    /// is set, that the user is authenticated.
    ///
    /// Browser creation and login each happen at most once per session
    /// lifetime; later calls are no-ops. A failure during either leaves
    /// the session in [`SessionState::Failed`], from which every call
    /// returns [`HarnessError::SessionFailed`] until [`teardown`] is
    /// called.
    ///
    /// [`teardown`]: GenericSession::teardown
    pub fn ensure_ready(&mut self, require_login: bool) -> HarnessResult<()> {
        match self.state {
            SessionState::Failed => return Err(HarnessError::SessionFailed),
            // Reentrant call while initialization is in progress.
            SessionState::Initializing => return Ok(()),
            SessionState::ReadyAuthenticated => return Ok(()),
            SessionState::ReadyUnauthenticated if !require_login => return Ok(()),
            _ => {}
        }

        if self.backend.is_none() {
            self.state = SessionState::Initializing;
            info!("starting browser session for {}", self.config.site_url);
            match B::create(&self.config) {
                Ok(backend) => {
                    self.backend = Some(backend);
                    self.state = SessionState::ReadyUnauthenticated;
                }
                Err(e) => {
                    error!("browser session creation failed: {}", e);
                    self.state = SessionState::Failed;
                    return Err(e);
                }
            }
        }

        if require_login {
            if self.is_authenticated() {
                self.state = SessionState::ReadyAuthenticated;
            } else {
                let username = self.config.username.clone();
                let password = self.config.password.clone();
                self.login(&username, &password)?;
            }
        }

        Ok(())
    }

    /// Whether the post-login marker element is currently present.
    ///
    /// Never fails: an absent browser, a session with no open windows, an
    /// unreachable browser and a missing marker all report `false`.
    pub fn is_authenticated(&self) -> bool {
        let backend = match &self.backend {
            Some(backend) => backend,
            None => return false,
        };
        match backend.window_count() {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }
        matches!(find_opt(backend, &self.config.login.marker), Ok(Some(_)))
    }

    /// Log in with the specified credentials.
    ///
    /// Idempotent when already authenticated. Navigates to the site URL,
    /// waits for the login form, validates each field is visible and
    /// enabled, submits, and waits (bounded by `login_timeout`) for the
    /// post-login marker. A timeout propagates to the caller; it is not
    /// retried, and the session moves to `Failed` until torn down.
    pub fn login(&mut self, username: &str, password: &str) -> HarnessResult<()> {
        self.ensure_ready(false)?;
        if self.is_authenticated() {
            debug!("already logged in, skipping login flow");
            return Ok(());
        }

        match self.login_flow(username, password) {
            Ok(()) => {
                info!("logged in as {}", username);
                self.state = SessionState::ReadyAuthenticated;
                Ok(())
            }
            Err(e) => {
                error!("login failed: {}", e);
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    fn login_flow(&self, username: &str, password: &str) -> HarnessResult<()> {
        let backend = self.backend_ref()?;
        let locators = &self.config.login;

        backend.navigate(&self.config.site_url)?;
        Waiter::new(backend, self.default_wait())
            .error("waiting for the login form")
            .present(&locators.username)?;

        let username_field = backend.find(&locators.username)?;
        validate_element(&username_field, "username field")?;
        username_field.send_keys(username)?;

        let password_field = backend.find(&locators.password)?;
        validate_element(&password_field, "password field")?;
        password_field.send_keys(password)?;

        let submit = backend.find(&locators.submit)?;
        validate_element(&submit, "login submit control")?;
        submit.click()?;

        let login_wait = Wait::new(self.config.login_timeout, self.config.wait.interval);
        Waiter::new(backend, login_wait)
            .error("waiting for the post-login marker")
            .present(&locators.marker)
    }

    /// Log out by clicking the marker/logoff control and waiting for the
    /// username field to reappear.
    pub fn logout(&mut self) -> HarnessResult<()> {
        self.ensure_ready(true)?;
        let backend = self.backend_ref()?;
        let locators = &self.config.login;

        let logoff = backend.find(&locators.marker)?;
        validate_element(&logoff, "logoff control")?;
        logoff.click()?;

        Waiter::new(backend, self.default_wait())
            .error("waiting for the login form after logout")
            .present(&locators.username)?;

        drop(logoff);
        self.state = SessionState::ReadyUnauthenticated;
        Ok(())
    }

    /// Close the browser (if any) and reset the session to
    /// `Uninitialized`. This is the only way out of the `Failed` state.
    pub fn teardown(&mut self) {
        if let Some(backend) = self.backend.take() {
            info!("closing browser session");
            if let Err(e) = backend.quit() {
                error!("failed to close browser session: {}", e);
            }
        }
        self.state = SessionState::Uninitialized;
    }

    /// Begin an explicit wait using the session's default policy. Readies
    /// the session first.
    pub fn wait_until(&mut self) -> HarnessResult<Waiter<'_, B>> {
        self.ensure_ready(true)?;
        let wait = self.default_wait();
        Ok(Waiter::new(self.backend_ref()?, wait))
    }

    pub(crate) fn backend_ref(&self) -> HarnessResult<&B> {
        self.backend
            .as_ref()
            .ok_or_else(|| HarnessError::SessionLost("no browser session".to_string()))
    }

    /// Ready the session and return the backend for a DOM operation.
    pub(crate) fn ready_backend(&mut self) -> HarnessResult<&B> {
        self.ensure_ready(true)?;
        self.backend_ref()
    }

    pub(crate) fn default_wait(&self) -> Wait {
        Wait::new(self.config.wait.timeout, self.config.wait.interval)
    }
}

impl<B: Backend> Drop for GenericSession<B> {
    /// Close the browser session when the harness session goes out of
    /// scope without an explicit teardown.
    fn drop(&mut self) {
        if self.backend.is_some() {
            self.teardown();
        }
    }
}

/// Check that an element is fit for interaction.
pub(crate) fn validate_element<E: Element>(element: &E, what: &str) -> HarnessResult<()> {
    if !element.is_displayed()? {
        return Err(HarnessError::precondition(format!(
            "{} is not displayed on the page",
            what
        )));
    }
    if !element.is_enabled()? {
        return Err(HarnessError::precondition(format!(
            "{} is not enabled",
            what
        )));
    }
    Ok(())
}
