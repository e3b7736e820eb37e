//! Typed construction of element selectors.
//!
//! Every selector used by the harness is built here rather than by ad-hoc
//! string formatting at the call site. `Locator` maps 1:1 onto the
//! WebDriver selector strategies, while `AttrQuery` renders an
//! attribute/text match with a chosen [`TextMatch`] mode into XPath.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Match mode for attribute and text queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextMatch {
    Exact,
    StartsWith,
    EndsWith,
    Contains,
}

impl TextMatch {
    /// Render this match mode as an XPath condition over `attr_expr`
    /// (an attribute reference such as `@placeholder`, or `text()`).
    ///
    /// XPath 1.0 has no `ends-with()`; `EndsWith` uses the `substring()`
    /// identity instead.
    fn xpath_condition(self, attr_expr: &str, value: &str, case_insensitive: bool) -> String {
        let (expr, literal) = if case_insensitive {
            let expr = format!(
                "translate({}, {}, {})",
                attr_expr,
                escape_string(&value.to_uppercase()),
                escape_string(&value.to_lowercase())
            );
            (expr, escape_string(&value.to_lowercase()))
        } else {
            (attr_expr.to_string(), escape_string(value))
        };

        match self {
            TextMatch::Exact => format!("normalize-space({}) = {}", expr, literal),
            TextMatch::StartsWith => format!("starts-with({}, {})", expr, literal),
            TextMatch::EndsWith => format!(
                "substring({expr}, string-length({expr}) - string-length({lit}) + 1) = {lit}",
                expr = expr,
                lit = literal
            ),
            TextMatch::Contains => format!("contains({}, {})", expr, literal),
        }
    }
}

/// An element selector, independent of any WebDriver backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    Css(String),
    XPath(String),
    Id(String),
    Name(String),
    Tag(String),
    LinkText(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Locator::XPath(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Locator::Name(name.into())
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Locator::Tag(tag.into())
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Locator::LinkText(text.into())
    }

    /// Locate elements of `tag` by their visible text.
    pub fn text(tag: &str, value: &str, mode: TextMatch) -> Self {
        AttrQuery::text(tag, value).mode(mode).into_locator()
    }

    /// Locate elements of `tag` by an attribute value.
    pub fn attr(tag: &str, attr_name: &str, value: &str, mode: TextMatch) -> Self {
        AttrQuery::new(tag, attr_name, value).mode(mode).into_locator()
    }

    /// Locate the `<input>` associated with a `<label>` via the label's
    /// `for` attribute, matching the label by its text.
    pub fn for_label(label_text: &str, mode: TextMatch) -> Self {
        let cond = mode.xpath_condition("text()", label_text, false);
        Locator::XPath(format!("//input[@id=(//label[{}]/@for)]", cond))
    }

    /// Locate a radio input by its `value` attribute.
    pub fn radio(value: &str) -> Self {
        Locator::Css(format!("input[type='radio'][value={}]", escape_string(value)))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css {:?}", s),
            Locator::XPath(s) => write!(f, "xpath {:?}", s),
            Locator::Id(s) => write!(f, "id {:?}", s),
            Locator::Name(s) => write!(f, "name {:?}", s),
            Locator::Tag(s) => write!(f, "tag {:?}", s),
            Locator::LinkText(s) => write!(f, "link text {:?}", s),
        }
    }
}

/// Builder for XPath queries matching an element by attribute or text.
#[derive(Debug, Clone)]
pub struct AttrQuery {
    tag: String,
    attr_expr: String,
    value: String,
    mode: TextMatch,
    case_insensitive: bool,
}

impl AttrQuery {
    /// Match `attr_name` of elements with the specified tag (`*` for any).
    pub fn new(tag: &str, attr_name: &str, value: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attr_expr: format!("@{}", attr_name),
            value: value.to_string(),
            mode: TextMatch::Contains,
            case_insensitive: false,
        }
    }

    /// Match the element text rather than an attribute.
    pub fn text(tag: &str, value: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attr_expr: "text()".to_string(),
            value: value.to_string(),
            mode: TextMatch::Contains,
            case_insensitive: false,
        }
    }

    pub fn mode(mut self, mode: TextMatch) -> Self {
        self.mode = mode;
        self
    }

    /// Fold case on both sides of the comparison (XPath `translate()`).
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn to_xpath(&self) -> String {
        format!(
            "//{}[{}]",
            self.tag,
            self.mode
                .xpath_condition(&self.attr_expr, &self.value, self.case_insensitive)
        )
    }

    pub fn into_locator(self) -> Locator {
        Locator::XPath(self.to_xpath())
    }
}

/// Escape a string literal for use inside a CSS or XPath selector.
///
/// A value containing both quote kinds cannot be a single XPath literal
/// and is rendered with `concat()`.
pub fn escape_string(value: &str) -> String {
    let has_single = value.contains('\'');
    let has_double = value.contains('"');

    if has_single && has_double {
        let mut parts = vec![String::from("concat(")];
        for chunk in value.split('"') {
            parts.push(format!("\"{}\"", chunk));
            parts.push(String::from(", '\"', "));
        }
        parts.pop();
        if value.ends_with('"') {
            parts.push(String::from(", '\"'"));
        }
        return parts.join("") + ")";
    }

    if has_double {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value)
    }
}
