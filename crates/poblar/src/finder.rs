//! Finder capability: a named locator strategy bound with its value.

use crate::element::{ElementHandle, SearchContext};
use crate::result::PoblarResult;
use crate::selector::Selector;

/// Strategy that locates an ordered set of elements within a scope.
///
/// A field declares at most one finder. Waiting, polling and retries are the
/// finder's (or the driver's) business, never the engine's: from the engine's
/// point of view `find` is a synchronous, bounded operation.
pub trait Finder: Send + Sync {
    /// Locate elements within `ctx`, in document order.
    fn find(&self, ctx: &dyn SearchContext) -> PoblarResult<Vec<ElementHandle>>;

    /// Description used in logs and error messages.
    fn describe(&self) -> String;
}

/// The standard finder: a [`Selector`] resolved through the search context.
///
/// `By` carries the locator value only; the context it runs against decides
/// what the value means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct By {
    selector: Selector,
}

impl By {
    /// Find by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from(Selector::css(selector))
    }

    /// Find by element id
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::from(Selector::id(id))
    }

    /// Find by name attribute
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::from(Selector::name(name))
    }

    /// Find by tag name
    #[must_use]
    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::from(Selector::tag_name(tag))
    }

    /// Find by XPath expression
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::from(Selector::xpath(expression))
    }

    /// Find by text content (substring match)
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from(Selector::text(text))
    }

    /// Find by test ID (data-testid attribute)
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from(Selector::test_id(id))
    }

    /// The locator value this finder carries.
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl From<Selector> for By {
    fn from(selector: Selector) -> Self {
        Self { selector }
    }
}

impl Finder for By {
    fn find(&self, ctx: &dyn SearchContext) -> PoblarResult<Vec<ElementHandle>> {
        ctx.find_all(&self.selector)
    }

    fn describe(&self) -> String {
        self.selector.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_wraps_the_selector() {
        let by = By::css("#login");
        assert_eq!(by.selector(), &Selector::css("#login"));
        assert_eq!(by.describe(), "css=#login");
    }

    #[test]
    fn test_by_from_selector() {
        let by = By::from(Selector::tag_name("input"));
        assert!(matches!(by.selector(), Selector::TagName(_)));
    }
}
