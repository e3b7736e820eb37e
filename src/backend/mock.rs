//! In-memory backend for exercising the harness without a browser.
//!
//! `MockBackend` serves a small DOM fixture described with [`MockNode`]
//! and records every interaction (session creation, navigation, clicks,
//! keystrokes), so tests can assert call counts without a WebDriver
//! server anywhere in sight.
//!
//! Fixtures are installed per thread with [`MockHandle::install`]; the
//! next `MockBackend::create` call on that thread picks them up. Node
//! visibility can be scripted: a node may appear only after another node
//! has been clicked (`revealed_by`) or disappear once one has
//! (`hidden_by`), which is enough to model a login/logout round trip.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::backend::{Backend, ControlKey, Element};
use crate::error::{HarnessError, HarnessResult};
use crate::selector::Locator;
use crate::HarnessConfig;

thread_local! {
    static INSTALLED: RefCell<Option<MockHandle>> = RefCell::new(None);
}

/// One element in a mock DOM fixture.
#[derive(Debug, Clone)]
pub struct MockNode {
    tag: String,
    id: Option<String>,
    text: String,
    attrs: HashMap<String, String>,
    displayed: bool,
    enabled: bool,
    selected: bool,
    matched_by: Vec<Locator>,
    revealed_by: Option<String>,
    hidden_by: Option<String>,
    children: Vec<MockNode>,
}

impl MockNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            text: String::new(),
            attrs: HashMap::new(),
            displayed: true,
            enabled: true,
            selected: false,
            matched_by: Vec::new(),
            revealed_by: None,
            hidden_by: None,
            children: Vec::new(),
        }
    }

    /// A `body` node to hang a fixture off.
    pub fn root() -> Self {
        Self::new("body")
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Declare an extra locator this node answers to, for selector shapes
    /// the mock does not interpret structurally (arbitrary CSS/XPath).
    pub fn matched_by(mut self, locator: Locator) -> Self {
        self.matched_by.push(locator);
        self
    }

    /// The node is absent until the node with this id has been clicked.
    pub fn revealed_by(mut self, id: impl Into<String>) -> Self {
        self.revealed_by = Some(id.into());
        self
    }

    /// The node is absent once the node with this id has been clicked.
    pub fn hidden_by(mut self, id: impl Into<String>) -> Self {
        self.hidden_by = Some(id.into());
        self
    }

    pub fn child(mut self, node: MockNode) -> Self {
        self.children.push(node);
        self
    }

    /// Key under which interactions with this node are recorded.
    fn record_key(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.text.clone())
    }

    fn matches(&self, locator: &Locator) -> bool {
        if self.matched_by.contains(locator) {
            return true;
        }
        match locator {
            Locator::Id(id) => self.id.as_deref() == Some(id.as_str()),
            Locator::Tag(tag) => &self.tag == tag,
            Locator::LinkText(text) => self.tag == "a" && &self.text == text,
            Locator::Name(name) => self.attrs.get("name").map(String::as_str) == Some(name),
            Locator::Css(css) => match css.strip_prefix('#') {
                Some(id) => self.id.as_deref() == Some(id),
                None => &self.tag == css,
            },
            Locator::XPath(_) => false,
        }
    }
}

#[derive(Debug)]
struct MockState {
    dom: MockNode,
    disconnected: bool,
    windows: usize,
    fail_create: bool,
    sessions_created: usize,
    quits: usize,
    navigations: Vec<String>,
    scripts: Vec<String>,
    clicks: HashMap<String, usize>,
    typed: HashMap<String, Vec<String>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            dom: MockNode::root(),
            disconnected: false,
            windows: 1,
            fail_create: false,
            sessions_created: 0,
            quits: 0,
            navigations: Vec::new(),
            scripts: Vec::new(),
            clicks: HashMap::new(),
            typed: HashMap::new(),
        }
    }
}

impl MockState {
    fn click_count(&self, key: &str) -> usize {
        self.clicks.get(key).copied().unwrap_or(0)
    }

    fn node_present(&self, node: &MockNode) -> bool {
        if let Some(hider) = &node.hidden_by {
            if self.click_count(hider) > 0 {
                return false;
            }
        }
        if let Some(revealer) = &node.revealed_by {
            if self.click_count(revealer) == 0 {
                return false;
            }
        }
        true
    }
}

/// Handle to a mock fixture's recorded interactions.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Rc<RefCell<MockState>>,
}

impl MockHandle {
    /// Install a fixture for the current thread. The next
    /// `MockBackend::create` call attaches to it.
    pub fn install(dom: MockNode) -> MockHandle {
        let handle = MockHandle {
            state: Rc::new(RefCell::new(MockState {
                dom,
                ..MockState::default()
            })),
        };
        INSTALLED.with(|slot| *slot.borrow_mut() = Some(handle.clone()));
        handle
    }

    pub fn sessions_created(&self) -> usize {
        self.state.borrow().sessions_created
    }

    pub fn quits(&self) -> usize {
        self.state.borrow().quits
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.borrow().navigations.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.borrow().scripts.clone()
    }

    /// Clicks recorded against a node, keyed by its id (or text when it
    /// has none).
    pub fn clicks(&self, key: &str) -> usize {
        self.state.borrow().click_count(key)
    }

    /// Keystrokes recorded against a node.
    pub fn typed(&self, key: &str) -> Vec<String> {
        self.state
            .borrow()
            .typed
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every subsequent backend call fail as if the browser process
    /// had gone away.
    pub fn disconnect(&self) {
        self.state.borrow_mut().disconnected = true;
    }

    pub fn set_windows(&self, n: usize) {
        self.state.borrow_mut().windows = n;
    }

    /// Make the next `create` call fail.
    pub fn fail_next_create(&self) {
        self.state.borrow_mut().fail_create = true;
    }
}

/// The mock browser session.
#[derive(Debug)]
pub struct MockBackend {
    state: Rc<RefCell<MockState>>,
}

impl MockBackend {
    fn check_connected(&self) -> HarnessResult<()> {
        if self.state.borrow().disconnected {
            Err(HarnessError::SessionLost("mock disconnected".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Backend for MockBackend {
    type Elem<'a> = MockElement where Self: 'a;

    fn create(_config: &HarnessConfig) -> HarnessResult<Self> {
        let state = INSTALLED.with(|slot| {
            slot.borrow()
                .as_ref()
                .map(|handle| Rc::clone(&handle.state))
        });
        let state = state.unwrap_or_default();

        let mut st = state.borrow_mut();
        st.sessions_created += 1;
        if st.fail_create {
            st.fail_create = false;
            return Err(HarnessError::SessionLost(
                "scripted session-create failure".to_string(),
            ));
        }
        if st.windows == 0 {
            st.windows = 1;
        }
        drop(st);

        Ok(MockBackend {
            state,
        })
    }

    fn navigate(&self, url: &str) -> HarnessResult<()> {
        self.check_connected()?;
        self.state.borrow_mut().navigations.push(url.to_string());
        Ok(())
    }

    fn current_url(&self) -> HarnessResult<String> {
        self.check_connected()?;
        Ok(self
            .state
            .borrow()
            .navigations
            .last()
            .cloned()
            .unwrap_or_default())
    }

    fn refresh(&self) -> HarnessResult<()> {
        self.check_connected()
    }

    fn find(&self, locator: &Locator) -> HarnessResult<Self::Elem<'_>> {
        self.check_connected()?;
        let st = self.state.borrow();
        search(&st.dom, &st, locator, &mut Vec::new())
            .map(|path| MockElement {
                state: Rc::clone(&self.state),
                path,
            })
            .ok_or_else(|| HarnessError::NotFound(locator.to_string()))
    }

    fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<Self::Elem<'_>>> {
        self.check_connected()?;
        let st = self.state.borrow();
        let mut paths = Vec::new();
        search_all(&st.dom, &st, locator, &mut Vec::new(), &mut paths);
        Ok(paths
            .into_iter()
            .map(|path| MockElement {
                state: Rc::clone(&self.state),
                path,
            })
            .collect())
    }

    fn execute_script(&self, script: &str) -> HarnessResult<serde_json::Value> {
        self.check_connected()?;
        self.state.borrow_mut().scripts.push(script.to_string());
        Ok(serde_json::Value::Null)
    }

    fn window_count(&self) -> HarnessResult<usize> {
        self.check_connected()?;
        Ok(self.state.borrow().windows)
    }

    fn quit(self) -> HarnessResult<()> {
        self.state.borrow_mut().quits += 1;
        Ok(())
    }
}

/// Depth-first search for the first present node matching the locator,
/// skipping absent subtrees. The root itself is not a candidate.
fn search(
    node: &MockNode,
    st: &MockState,
    locator: &Locator,
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    for (i, child) in node.children.iter().enumerate() {
        if !st.node_present(child) {
            continue;
        }
        path.push(i);
        if child.matches(locator) {
            return Some(path.clone());
        }
        if let Some(found) = search(child, st, locator, path) {
            return Some(found);
        }
        path.pop();
    }
    None
}

fn search_all(
    node: &MockNode,
    st: &MockState,
    locator: &Locator,
    path: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    for (i, child) in node.children.iter().enumerate() {
        if !st.node_present(child) {
            continue;
        }
        path.push(i);
        if child.matches(locator) {
            out.push(path.clone());
        }
        search_all(child, st, locator, path, out);
        path.pop();
    }
}

/// An element of the mock DOM, addressed by its index path from the root.
#[derive(Debug, Clone)]
pub struct MockElement {
    state: Rc<RefCell<MockState>>,
    path: Vec<usize>,
}

impl MockElement {
    fn with_node<T>(&self, f: impl FnOnce(&MockNode, &MockState) -> T) -> HarnessResult<T> {
        let st = self.state.borrow();
        if st.disconnected {
            return Err(HarnessError::SessionLost("mock disconnected".to_string()));
        }
        let mut node = &st.dom;
        for &i in &self.path {
            node = node
                .children
                .get(i)
                .ok_or_else(|| HarnessError::NotFound("stale mock element".to_string()))?;
        }
        if !st.node_present(node) {
            return Err(HarnessError::NotFound("stale mock element".to_string()));
        }
        Ok(f(node, &st))
    }

    fn record(&self, f: impl FnOnce(&mut MockState, String)) -> HarnessResult<()> {
        let key = self.with_node(|node, _| node.record_key())?;
        f(&mut self.state.borrow_mut(), key);
        Ok(())
    }
}

impl Element for MockElement {
    fn click(&self) -> HarnessResult<()> {
        self.record(|st, key| *st.clicks.entry(key).or_insert(0) += 1)
    }

    fn send_keys(&self, text: &str) -> HarnessResult<()> {
        let text = text.to_string();
        self.record(|st, key| st.typed.entry(key).or_default().push(text))
    }

    fn send_key(&self, key: ControlKey) -> HarnessResult<()> {
        self.send_keys(&format!("<{:?}>", key))
    }

    fn clear(&self) -> HarnessResult<()> {
        self.record(|st, key| st.typed.entry(key).or_default().clear())
    }

    fn text(&self) -> HarnessResult<String> {
        self.with_node(|node, _| node.text.clone())
    }

    fn attr(&self, name: &str) -> HarnessResult<Option<String>> {
        self.with_node(|node, _| node.attrs.get(name).cloned())
    }

    fn is_displayed(&self) -> HarnessResult<bool> {
        self.with_node(|node, _| node.displayed)
    }

    fn is_enabled(&self) -> HarnessResult<bool> {
        self.with_node(|node, _| node.enabled)
    }

    fn is_selected(&self) -> HarnessResult<bool> {
        self.with_node(|node, _| node.selected)
    }

    fn hover(&self) -> HarnessResult<()> {
        self.with_node(|_, _| ())
    }

    fn find(&self, locator: &Locator) -> HarnessResult<Self> {
        self.relative(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| HarnessError::NotFound(locator.to_string()))
    }

    fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<Self>> {
        self.relative(locator)
    }
}

impl MockElement {
    /// Resolve a locator relative to this element. The structural XPath
    /// shapes used by the menu extractor (`./a`, `./ul/li`) are
    /// interpreted against the fixture tree; anything else is a
    /// descendant search.
    fn relative(&self, locator: &Locator) -> HarnessResult<Vec<Self>> {
        let st = self.state.borrow();
        if st.disconnected {
            return Err(HarnessError::SessionLost("mock disconnected".to_string()));
        }
        let mut node = &st.dom;
        for &i in &self.path {
            node = node
                .children
                .get(i)
                .ok_or_else(|| HarnessError::NotFound("stale mock element".to_string()))?;
        }

        let mut paths = Vec::new();
        match locator {
            Locator::XPath(expr) if expr.starts_with("./") => {
                // Direct-descendant steps only, e.g. "./ul/li".
                let steps: Vec<&str> = expr.trim_start_matches("./").split('/').collect();
                collect_steps(node, &st, &steps, &mut self.path.clone(), &mut paths);
            }
            other => {
                search_all(node, &st, other, &mut self.path.clone(), &mut paths);
            }
        }
        Ok(paths
            .into_iter()
            .map(|path| MockElement {
                state: Rc::clone(&self.state),
                path,
            })
            .collect())
    }
}

fn collect_steps(
    node: &MockNode,
    st: &MockState,
    steps: &[&str],
    path: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    let (tag, rest) = match steps.split_first() {
        Some(parts) => parts,
        None => {
            out.push(path.clone());
            return;
        }
    };
    for (i, child) in node.children.iter().enumerate() {
        if !st.node_present(child) || &child.tag != tag {
            continue;
        }
        path.push(i);
        collect_steps(child, st, rest, path, out);
        path.pop();
    }
}
