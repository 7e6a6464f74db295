//! Locator values carried by [`By`](crate::By) finders.
//!
//! A [`Selector`] is pure data: the core never interprets it. Interpretation
//! belongs to the [`SearchContext`](crate::SearchContext) implementation
//! supplied by the environment (a real driver, or the in-memory
//! [`mock`](crate::mock) document in tests).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Locator value for finding elements, named after its strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Element id attribute
    Id(String),
    /// Element name attribute
    Name(String),
    /// Tag name (e.g., "input")
    TagName(String),
    /// XPath expression
    XPath(String),
    /// Text content selector (substring match)
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a name-attribute selector
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a tag-name selector
    #[must_use]
    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::TagName(tag.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Create a text-content selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::Id(s) => write!(f, "id={s}"),
            Self::Name(s) => write!(f, "name={s}"),
            Self::TagName(s) => write!(f, "tag={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(s) => write!(f, "text={s}"),
            Self::TestId(s) => write!(f, "test_id={s}"),
        }
    }
}
