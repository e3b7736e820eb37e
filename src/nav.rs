//! Site navigation and menu handling.

use log::warn;
use serde::Serialize;

use crate::backend::{Backend, Element};
use crate::error::{HarnessError, HarnessResult};
use crate::selector::Locator;
use crate::session::GenericSession;
use crate::wait::Waiter;

/// Upper bound on menu nesting. DOM trees are acyclic, so this is purely
/// a guard against runaway fixtures; levels below it are dropped.
pub const MAX_MENU_DEPTH: usize = 16;

/// One entry of a navigation menu: its caption, link target and nested
/// entries, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: String,
    pub url: String,
    pub children: Vec<MenuItem>,
}

impl<B: Backend> GenericSession<B> {
    /// Navigate to a URL. Relative paths are joined onto the configured
    /// site URL; absolute URLs pass through unchanged.
    pub fn go(&mut self, url: &str) -> HarnessResult<()> {
        let target = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!(
                "{}/{}",
                self.config().site_url.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        };
        let backend = self.ready_backend()?;
        backend.navigate(&target)
    }

    /// Reload the current page.
    pub fn refresh(&mut self) -> HarnessResult<()> {
        self.ready_backend()?.refresh()
    }

    /// URL of the current page.
    pub fn current_url(&mut self) -> HarnessResult<String> {
        self.ready_backend()?.current_url()
    }

    /// Click through a two-level menu: the parent entry, then the child
    /// entry, both located by link text.
    pub fn menu(&mut self, parent: &str, child: &str) -> HarnessResult<()> {
        self.menu_path(&[parent, child])
    }

    /// Click through a menu hierarchy of any depth, located by link text.
    ///
    /// The first and last entries are clicked; intermediate entries are
    /// hovered so their submenus unfold.
    pub fn menu_path(&mut self, titles: &[&str]) -> HarnessResult<()> {
        if titles.is_empty() {
            return Err(HarnessError::precondition("empty menu path"));
        }
        self.ensure_ready(true)?;

        let last = titles.len() - 1;
        for (i, title) in titles.iter().enumerate() {
            let locator = Locator::link_text(*title);
            let wait = self.default_wait();
            let backend = self.backend_ref()?;
            Waiter::new(backend, wait)
                .error(format!("waiting for menu entry {:?}", title))
                .present(&locator)?;

            let entry = backend.find(&locator)?;
            if i == 0 || i == last {
                entry.click()?;
            } else {
                entry.hover()?;
            }
        }
        Ok(())
    }

    /// Snapshot the navigation hierarchy rooted at the elements matching
    /// `top_level` (typically the `<li>` items of the main menu bar).
    ///
    /// Each node's title and URL come from its first anchor; children are
    /// collected from direct `ul > li` descendants only, so nested
    /// submenus appear exactly once. Elements without matching anchors or
    /// lists simply contribute empty fields; extraction itself does not
    /// fail on fixture shape.
    pub fn menu_tree(&mut self, top_level: &Locator) -> HarnessResult<Vec<MenuItem>> {
        let backend = self.ready_backend()?;
        let nodes = match backend.find_all(top_level) {
            Ok(nodes) => nodes,
            Err(HarnessError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        nodes.iter().map(|node| menu_item(node, 0)).collect()
    }
}

/// Build one menu node and, recursively, its children.
fn menu_item<E: Element>(node: &E, depth: usize) -> HarnessResult<MenuItem> {
    let (title, url) = match node.find(&Locator::tag("a")) {
        Ok(anchor) => (anchor.text()?, anchor.attr("href")?.unwrap_or_default()),
        Err(HarnessError::NotFound(_)) => (node.text()?, String::new()),
        Err(e) => return Err(e),
    };

    let mut children = Vec::new();
    if depth >= MAX_MENU_DEPTH {
        warn!(
            "menu nesting exceeds {} levels at {:?}; deeper levels dropped",
            MAX_MENU_DEPTH, title
        );
    } else {
        for child in node.find_all(&Locator::xpath("./ul/li"))? {
            children.push(menu_item(&child, depth + 1)?);
        }
    }

    Ok(MenuItem {
        title,
        url,
        children,
    })
}
