//! In-memory fake document for tests and doctests.
//!
//! [`FakeNode`] is a declarative node description (builder methods, or the
//! serde-backed JSON shape consumed by [`FakeDom::from_json`]); mounting it
//! produces shared [`FakeElement`]s that implement the
//! [`Element`]/[`SearchContext`] capability contracts, so page objects can be
//! exercised without a browser.
//!
//! The mock understands the whole [`Selector`] vocabulary except XPath, and
//! only a compound subset of CSS: `tag`, `#id` and `.class` parts, e.g.
//! `input#user.wide`. Anything fancier surfaces as a driver error, the same
//! way a real driver would reject a malformed selector.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::element::{DriverHandle, Element, ElementHandle, SearchContext};
use crate::result::{PoblarError, PoblarResult};
use crate::selector::Selector;

/// Declarative description of one fake element and its subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FakeNode {
    /// Tag name (defaults to "div")
    pub tag: String,
    /// id attribute
    pub id: Option<String>,
    /// class list
    pub classes: Vec<String>,
    /// name attribute
    pub name: Option<String>,
    /// data-testid attribute
    pub test_id: Option<String>,
    /// Text content
    pub text: String,
    /// Current display state (defaults to displayed)
    pub displayed: bool,
    /// Child nodes, in document order
    pub children: Vec<FakeNode>,
}

impl Default for FakeNode {
    fn default() -> Self {
        Self {
            tag: "div".to_string(),
            id: None,
            classes: Vec::new(),
            name: None,
            test_id: None,
            text: String::new(),
            displayed: true,
            children: Vec::new(),
        }
    }
}

impl FakeNode {
    /// Start a node with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the id attribute.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the name attribute.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the data-testid attribute.
    #[must_use]
    pub fn with_test_id(mut self, test_id: impl Into<String>) -> Self {
        self.test_id = Some(test_id.into());
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Mark the node as not currently displayed.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, child: FakeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Mount this node (and its subtree) as a standalone element handle.
    #[must_use]
    pub fn mount(self) -> ElementHandle {
        mount(self)
    }
}

/// One mounted element of a fake document.
#[derive(Debug)]
pub struct FakeElement {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    name: Option<String>,
    test_id: Option<String>,
    text: String,
    displayed: bool,
    children: Vec<Arc<FakeElement>>,
}

fn mount(node: FakeNode) -> Arc<FakeElement> {
    Arc::new(FakeElement {
        tag: node.tag,
        id: node.id,
        classes: node.classes,
        name: node.name,
        test_id: node.test_id,
        text: node.text,
        displayed: node.displayed,
        children: node.children.into_iter().map(mount).collect(),
    })
}

impl SearchContext for FakeElement {
    fn find_all(&self, selector: &Selector) -> PoblarResult<Vec<ElementHandle>> {
        let mut out = Vec::new();
        for child in &self.children {
            collect(child, selector, &mut out)?;
        }
        Ok(out)
    }
}

impl Element for FakeElement {
    fn is_displayed(&self) -> bool {
        self.displayed
    }

    fn describe(&self) -> String {
        let mut out = format!("<{}", self.tag);
        if let Some(id) = &self.id {
            let _ = write!(out, "#{id}");
        }
        for class in &self.classes {
            let _ = write!(out, ".{class}");
        }
        out.push('>');
        out
    }
}

/// A mounted fake document, usable as the root search context.
#[derive(Debug, Clone, Default)]
pub struct FakeDom {
    roots: Vec<Arc<FakeElement>>,
}

impl FakeDom {
    /// Mount a document from node descriptions.
    #[must_use]
    pub fn new(roots: Vec<FakeNode>) -> Self {
        Self {
            roots: roots.into_iter().map(mount).collect(),
        }
    }

    /// Mount a document from its JSON shape: a node object, or an array of
    /// node objects. Unknown display state defaults to displayed.
    pub fn from_json(value: serde_json::Value) -> PoblarResult<Self> {
        let roots: Vec<FakeNode> = if value.is_array() {
            serde_json::from_value(value)
        } else {
            serde_json::from_value(value).map(|node| vec![node])
        }
        .map_err(|err| PoblarError::driver(format!("bad fake document: {err}")))?;
        Ok(Self::new(roots))
    }

    /// Wrap the document in a shared root driving handle.
    #[must_use]
    pub fn into_driver(self) -> DriverHandle {
        Arc::new(self)
    }
}

impl SearchContext for FakeDom {
    fn find_all(&self, selector: &Selector) -> PoblarResult<Vec<ElementHandle>> {
        let mut out = Vec::new();
        for root in &self.roots {
            collect(root, selector, &mut out)?;
        }
        Ok(out)
    }
}

/// Depth-first pre-order walk, so results come back in document order.
fn collect(
    element: &Arc<FakeElement>,
    selector: &Selector,
    out: &mut Vec<ElementHandle>,
) -> PoblarResult<()> {
    if matches(element, selector)? {
        out.push(element.clone());
    }
    for child in &element.children {
        collect(child, selector, out)?;
    }
    Ok(())
}

fn matches(element: &FakeElement, selector: &Selector) -> PoblarResult<bool> {
    Ok(match selector {
        Selector::Css(css) => {
            let parts = parse_css(css)?;
            parts.tag.as_ref().map_or(true, |tag| tag == &element.tag)
                && parts
                    .id
                    .as_deref()
                    .map_or(true, |id| element.id.as_deref() == Some(id))
                && parts
                    .classes
                    .iter()
                    .all(|class| element.classes.contains(class))
        }
        Selector::Id(id) => element.id.as_deref() == Some(id.as_str()),
        Selector::Name(name) => element.name.as_deref() == Some(name.as_str()),
        Selector::TagName(tag) => &element.tag == tag,
        Selector::Text(text) => element.text.contains(text),
        Selector::TestId(test_id) => element.test_id.as_deref() == Some(test_id.as_str()),
        Selector::XPath(_) => {
            return Err(PoblarError::driver(
                "the mock document does not support xpath selectors",
            ))
        }
    })
}

#[derive(Debug, Default)]
struct CssParts {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

/// Parse the supported compound subset: `tag`, `#id` and `.class` parts.
fn parse_css(css: &str) -> PoblarResult<CssParts> {
    let mut parts = CssParts::default();
    let mut rest = css.trim();
    if rest.is_empty() {
        return Err(PoblarError::driver("empty css selector"));
    }

    if !rest.starts_with(['#', '.']) {
        let end = rest.find(['#', '.']).unwrap_or(rest.len());
        let (tag, tail) = rest.split_at(end);
        validate_token(css, tag)?;
        parts.tag = Some(tag.to_string());
        rest = tail;
    }

    while !rest.is_empty() {
        let (marker, tail) = rest.split_at(1);
        let end = tail.find(['#', '.']).unwrap_or(tail.len());
        let (token, next) = tail.split_at(end);
        validate_token(css, token)?;
        match marker {
            "#" => parts.id = Some(token.to_string()),
            _ => parts.classes.push(token.to_string()),
        }
        rest = next;
    }

    Ok(parts)
}

fn validate_token(css: &str, token: &str) -> PoblarResult<()> {
    let ok = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(PoblarError::driver(format!(
            "unsupported css selector `{css}`: the mock supports only tag, #id and .class compounds"
        )))
    }
}
