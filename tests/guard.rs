//! Session-guard behaviour, exercised against the mock backend.

use std::time::{Duration, Instant};

use webharness::{
    GenericSession, HarnessConfig, HarnessError, Locator, MockBackend, MockHandle, MockNode,
    SessionState,
};

type MockSession = GenericSession<MockBackend>;

fn config() -> HarnessConfig {
    HarnessConfig::new("http://app.local/")
        .with_credentials("qa", "secret")
        .with_wait(Duration::from_millis(200), Duration::from_millis(10))
        .with_login_timeout(Duration::from_millis(200))
}

/// A page with a login form; the logoff marker appears once the submit
/// button has been clicked and disappears once the marker itself has.
fn login_dom() -> MockNode {
    MockNode::root()
        .child(MockNode::new("input").with_id("username"))
        .child(MockNode::new("input").with_id("password"))
        .child(
            MockNode::new("button")
                .with_id("login-submit")
                .with_text("Log In")
                .matched_by(Locator::css("button[type='submit']")),
        )
        .child(
            MockNode::new("a")
                .with_id("logoff")
                .with_text("Log off")
                .revealed_by("login-submit")
                .hidden_by("logoff"),
        )
}

/// A page where the user is already logged in.
fn logged_in_dom() -> MockNode {
    MockNode::root()
        .child(MockNode::new("input").with_id("username"))
        .child(MockNode::new("a").with_id("logoff").with_text("Log off"))
}

#[test]
fn ensure_ready_initializes_and_logs_in_exactly_once() {
    let handle = MockHandle::install(login_dom());
    let mut session = MockSession::new(config());

    for _ in 0..3 {
        session.ensure_ready(true).unwrap();
    }

    assert_eq!(handle.sessions_created(), 1);
    assert_eq!(handle.clicks("login-submit"), 1);
    assert_eq!(handle.typed("username"), vec!["qa".to_string()]);
    assert_eq!(handle.typed("password"), vec!["secret".to_string()]);
    assert_eq!(handle.navigations(), vec!["http://app.local/".to_string()]);
    assert_eq!(session.state(), SessionState::ReadyAuthenticated);
}

#[test]
fn ensure_ready_without_login_does_not_touch_the_form() {
    let handle = MockHandle::install(login_dom());
    let mut session = MockSession::new(config());

    session.ensure_ready(false).unwrap();
    session.ensure_ready(false).unwrap();

    assert_eq!(handle.sessions_created(), 1);
    assert_eq!(handle.clicks("login-submit"), 0);
    assert!(!session.is_authenticated());
    assert_eq!(session.state(), SessionState::ReadyUnauthenticated);
}

#[test]
fn login_is_skipped_when_already_authenticated() {
    let handle = MockHandle::install(logged_in_dom());
    let mut session = MockSession::new(config());

    session.ensure_ready(true).unwrap();

    assert_eq!(handle.clicks("login-submit"), 0);
    assert!(session.is_authenticated());
    assert_eq!(session.state(), SessionState::ReadyAuthenticated);
}

#[test]
fn explicit_login_is_idempotent() {
    let handle = MockHandle::install(login_dom());
    let mut session = MockSession::new(config());

    session.ensure_ready(true).unwrap();
    session.login("qa", "secret").unwrap();

    assert_eq!(handle.clicks("login-submit"), 1);
}

#[test]
fn is_authenticated_is_false_without_a_browser() {
    let _handle = MockHandle::install(login_dom());
    let session = MockSession::new(config());

    assert!(!session.is_authenticated());
}

#[test]
fn is_authenticated_is_false_when_marker_is_missing() {
    let _handle = MockHandle::install(login_dom());
    let mut session = MockSession::new(config());

    session.ensure_ready(false).unwrap();
    assert!(!session.is_authenticated());
}

#[test]
fn is_authenticated_is_false_when_browser_is_unreachable() {
    let handle = MockHandle::install(logged_in_dom());
    let mut session = MockSession::new(config());

    session.ensure_ready(true).unwrap();
    assert!(session.is_authenticated());

    handle.disconnect();
    assert!(!session.is_authenticated());
}

#[test]
fn is_authenticated_is_false_when_all_windows_are_closed() {
    let handle = MockHandle::install(logged_in_dom());
    let mut session = MockSession::new(config());

    session.ensure_ready(true).unwrap();
    handle.set_windows(0);

    assert!(!session.is_authenticated());
}

#[test]
fn teardown_resets_the_guard() {
    let handle = MockHandle::install(login_dom());
    let mut session = MockSession::new(config());

    session.ensure_ready(true).unwrap();
    assert_eq!(handle.sessions_created(), 1);

    session.teardown();
    assert_eq!(handle.quits(), 1);
    assert_eq!(session.state(), SessionState::Uninitialized);

    session.ensure_ready(true).unwrap();
    assert_eq!(handle.sessions_created(), 2);
}

#[test]
fn failed_session_creation_requires_teardown() {
    let handle = MockHandle::install(login_dom());
    handle.fail_next_create();
    let mut session = MockSession::new(config());

    let err = session.ensure_ready(true).unwrap_err();
    assert!(matches!(err, HarnessError::SessionLost(_)));
    assert_eq!(session.state(), SessionState::Failed);

    // Not a silent no-op: the tripped guard reports itself.
    let err = session.ensure_ready(true).unwrap_err();
    assert!(matches!(err, HarnessError::SessionFailed));
    assert_eq!(handle.sessions_created(), 1);

    session.teardown();
    session.ensure_ready(true).unwrap();
    assert_eq!(handle.sessions_created(), 2);
}

#[test]
fn login_timeout_propagates_within_the_configured_bound() {
    // The marker is revealed by a control nothing ever clicks.
    let dom = MockNode::root()
        .child(MockNode::new("input").with_id("username"))
        .child(MockNode::new("input").with_id("password"))
        .child(
            MockNode::new("button")
                .with_id("login-submit")
                .matched_by(Locator::css("button[type='submit']")),
        )
        .child(MockNode::new("a").with_id("logoff").revealed_by("nothing"));
    let _handle = MockHandle::install(dom);
    let mut session = MockSession::new(config());

    let started = Instant::now();
    let err = session.ensure_ready(true).unwrap_err();
    let elapsed = started.elapsed();

    match err {
        HarnessError::Timeout {
            waited, ..
        } => assert_eq!(waited, Duration::from_millis(200)),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(elapsed < Duration::from_secs(2), "wait was not bounded: {:?}", elapsed);
    assert_eq!(session.state(), SessionState::Failed);

    let err = session.ensure_ready(true).unwrap_err();
    assert!(matches!(err, HarnessError::SessionFailed));
}

#[test]
fn login_fails_fast_on_an_unusable_form_field() {
    let dom = MockNode::root()
        .child(MockNode::new("input").with_id("username").disabled())
        .child(MockNode::new("input").with_id("password"))
        .child(
            MockNode::new("button")
                .with_id("login-submit")
                .matched_by(Locator::css("button[type='submit']")),
        )
        .child(MockNode::new("a").with_id("logoff").revealed_by("login-submit"));
    let handle = MockHandle::install(dom);
    let mut session = MockSession::new(config());

    let err = session.ensure_ready(true).unwrap_err();
    assert!(matches!(err, HarnessError::Precondition(_)));
    assert_eq!(handle.clicks("login-submit"), 0);
    assert_eq!(session.state(), SessionState::Failed);
}

#[test]
fn logout_returns_to_the_unauthenticated_state() {
    let handle = MockHandle::install(login_dom());
    let mut session = MockSession::new(config());

    session.ensure_ready(true).unwrap();
    assert!(session.is_authenticated());

    session.logout().unwrap();

    assert_eq!(handle.clicks("logoff"), 1);
    assert!(!session.is_authenticated());
    assert_eq!(session.state(), SessionState::ReadyUnauthenticated);
}

#[test]
fn dropping_a_session_closes_the_browser() {
    let handle = MockHandle::install(logged_in_dom());
    {
        let mut session = MockSession::new(config());
        session.ensure_ready(true).unwrap();
    }
    assert_eq!(handle.quits(), 1);
}
