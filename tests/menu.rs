//! Menu-tree extraction against a mock DOM fixture.

use std::time::Duration;

use webharness::{
    GenericSession, HarnessConfig, Locator, MenuItem, MockBackend, MockHandle, MockNode,
};

type MockSession = GenericSession<MockBackend>;

fn config() -> HarnessConfig {
    HarnessConfig::new("http://app.local/")
        .with_wait(Duration::from_millis(200), Duration::from_millis(10))
        .with_login_timeout(Duration::from_millis(200))
}

fn top_level() -> Locator {
    Locator::css("#mainMenu > li")
}

fn anchor(text: &str, href: &str) -> MockNode {
    MockNode::new("a").with_text(text).with_attr("href", href)
}

/// Two top-level entries: "Home" with no submenu, and "Reports" with two
/// children, the first of which has one grandchild.
fn menu_dom() -> MockNode {
    let home = MockNode::new("li")
        .matched_by(top_level())
        .child(anchor("Home", "/home"));

    let monthly = MockNode::new("li")
        .child(anchor("Monthly", "/reports/monthly"))
        .child(MockNode::new("ul").child(
            MockNode::new("li").child(anchor("Quarterly rollup", "/reports/quarterly")),
        ));
    let annual = MockNode::new("li").child(anchor("Annual", "/reports/annual"));
    let reports = MockNode::new("li")
        .matched_by(top_level())
        .child(anchor("Reports", "/reports"))
        .child(MockNode::new("ul").child(monthly).child(annual));

    MockNode::root()
        // Marker present so the guard sees an authenticated session.
        .child(MockNode::new("a").with_id("logoff"))
        .child(
            MockNode::new("ul")
                .with_id("mainMenu")
                .child(home)
                .child(reports),
        )
}

fn leaf(title: &str, url: &str) -> MenuItem {
    MenuItem {
        title: title.to_string(),
        url: url.to_string(),
        children: Vec::new(),
    }
}

#[test]
fn menu_tree_mirrors_the_dom() {
    let _handle = MockHandle::install(menu_dom());
    let mut session = MockSession::new(config());

    let tree = session.menu_tree(&top_level()).unwrap();

    let expected = vec![
        leaf("Home", "/home"),
        MenuItem {
            title: "Reports".to_string(),
            url: "/reports".to_string(),
            children: vec![
                MenuItem {
                    title: "Monthly".to_string(),
                    url: "/reports/monthly".to_string(),
                    children: vec![leaf("Quarterly rollup", "/reports/quarterly")],
                },
                leaf("Annual", "/reports/annual"),
            ],
        },
    ];
    assert_eq!(tree, expected);

    let child_counts: Vec<usize> = tree.iter().map(|item| item.children.len()).collect();
    assert_eq!(child_counts, vec![0, 2]);
    assert_eq!(tree[1].children[0].children.len(), 1);
}

#[test]
fn menu_tree_is_empty_when_nothing_matches() {
    let _handle = MockHandle::install(
        MockNode::root().child(MockNode::new("a").with_id("logoff")),
    );
    let mut session = MockSession::new(config());

    let tree = session.menu_tree(&top_level()).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn entry_without_anchor_keeps_its_caption_and_empty_url() {
    let dom = MockNode::root()
        .child(MockNode::new("a").with_id("logoff"))
        .child(
            MockNode::new("li")
                .matched_by(top_level())
                .with_text("Separator"),
        );
    let _handle = MockHandle::install(dom);
    let mut session = MockSession::new(config());

    let tree = session.menu_tree(&top_level()).unwrap();
    assert_eq!(tree, vec![leaf("Separator", "")]);
}

#[test]
fn menu_tree_snapshots_are_independent() {
    let _handle = MockHandle::install(menu_dom());
    let mut session = MockSession::new(config());

    let first = session.menu_tree(&top_level()).unwrap();
    let second = session.menu_tree(&top_level()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn menu_tree_serializes() {
    let _handle = MockHandle::install(menu_dom());
    let mut session = MockSession::new(config());

    let tree = session.menu_tree(&top_level()).unwrap();
    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json[0]["title"], "Home");
    assert_eq!(json[1]["children"][1]["url"], "/reports/annual");
}
