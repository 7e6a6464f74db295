//! Capability contracts for elements and search scopes.
//!
//! These are the narrow seams the engine consumes. Concrete implementations
//! come from the environment: a browser-automation driver in production, or
//! the [`mock`](crate::mock) document in tests.

use std::fmt;
use std::sync::Arc;

use crate::result::PoblarResult;
use crate::selector::Selector;

/// Anything capable of being the scope of an element lookup: the root
/// driving handle, or a previously resolved element.
pub trait SearchContext: Send + Sync {
    /// Locate every element matching `selector` inside this scope, in
    /// document order.
    fn find_all(&self, selector: &Selector) -> PoblarResult<Vec<ElementHandle>>;
}

/// A concrete element of the underlying document.
///
/// Elements are search contexts themselves, so a resolved element can scope
/// the lookups of a nested page object.
pub trait Element: SearchContext {
    /// Whether the element is currently displayed.
    fn is_displayed(&self) -> bool;

    /// Short human-readable description, used in logs.
    fn describe(&self) -> String {
        "<element>".to_string()
    }
}

impl fmt::Debug for dyn Element + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Shared handle to a resolved element.
pub type ElementHandle = Arc<dyn Element>;

/// Shared handle to the root driving context.
pub type DriverHandle = Arc<dyn SearchContext>;

// Lets an `ElementHandle` be passed wherever a `&dyn SearchContext` is
// expected without relying on dyn-trait upcasting (MSRV 1.75).
impl SearchContext for ElementHandle {
    fn find_all(&self, selector: &Selector) -> PoblarResult<Vec<ElementHandle>> {
        (**self).find_all(selector)
    }
}
