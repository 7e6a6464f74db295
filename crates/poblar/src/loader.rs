//! The resolution engine: populates page objects from a search context.

use std::fmt;

use crate::descriptor::{BindTarget, FieldBinding};
use crate::element::{DriverHandle, ElementHandle, SearchContext};
use crate::page::PageObject;
use crate::result::{PoblarError, PoblarResult};

/// Resolution engine for page objects.
///
/// `PageLoader` holds only the root driving handle, so cloning is cheap and
/// the engine can be injected into page objects that want to load further
/// pages themselves. Every [`load`](Self::load) call runs a synchronous,
/// depth-first traversal over a freshly constructed instance; the engine
/// keeps no reference to instances after returning them, and concurrent
/// calls from independent threads share nothing but the per-type descriptor
/// caches.
#[derive(Clone)]
pub struct PageLoader {
    driver: DriverHandle,
}

impl PageLoader {
    /// Create an engine rooted at `driver`.
    #[must_use]
    pub fn new(driver: DriverHandle) -> Self {
        Self { driver }
    }

    /// The root driving handle.
    #[must_use]
    pub fn driver(&self) -> &DriverHandle {
        &self.driver
    }

    /// Populate a fresh `T` against the root driving handle.
    pub fn load<T: PageObject>(&self) -> PoblarResult<T> {
        self.load_in(self.driver.as_ref())
    }

    /// Populate a fresh `T` against an explicit search context.
    ///
    /// Nested page-object fields recurse through here with their resolved
    /// element as the new context. Driver-handle injections still receive the
    /// root handle, whatever the recursion depth.
    pub fn load_in<T: PageObject>(&self, ctx: &dyn SearchContext) -> PoblarResult<T> {
        let descriptor = T::descriptor()?;
        let page = descriptor.page_name();
        tracing::debug!(page, "populating page object");

        let mut instance = descriptor.instantiate()?;
        for binding in descriptor.entries() {
            match binding {
                FieldBinding::LoaderInjection { set, .. } => set(&mut instance, self.clone()),
                FieldBinding::DriverInjection { set, .. } => {
                    set(&mut instance, self.driver.clone());
                }
                FieldBinding::Locator {
                    field,
                    finder,
                    filters,
                    target,
                } => {
                    let field = *field;
                    let mut found = finder.find(ctx)?;
                    for filter in filters {
                        found = filter.apply(found);
                    }
                    tracing::debug!(
                        page,
                        field,
                        matched = found.len(),
                        finder = %finder.describe(),
                        "resolved locator binding"
                    );
                    match target {
                        BindTarget::One(apply) => {
                            let element = exactly_one(page, field, found)?;
                            apply(&mut instance, self, element)?;
                        }
                        BindTarget::Many(apply) => apply(&mut instance, self, found)?,
                    }
                }
            }
        }
        Ok(instance)
    }
}

impl fmt::Debug for PageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageLoader").finish_non_exhaustive()
    }
}

/// Singleton cardinality enforcement: zero elements is
/// [`PoblarError::NotFound`], more than one is
/// [`PoblarError::AmbiguousMatch`]. Runs before any target coercion, so a
/// cardinality failure always wins over a nested construction failure.
fn exactly_one(
    page: &'static str,
    field: &'static str,
    found: Vec<ElementHandle>,
) -> PoblarResult<ElementHandle> {
    let count = found.len();
    let mut elements = found.into_iter();
    match (elements.next(), elements.next()) {
        (Some(element), None) => Ok(element),
        (None, _) => Err(PoblarError::NotFound { page, field }),
        (Some(_), Some(_)) => Err(PoblarError::AmbiguousMatch { page, field, count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::FakeNode;

    mod cardinality_tests {
        use super::*;

        #[test]
        fn test_exactly_one_unwraps_a_singleton() {
            let found = vec![FakeNode::new("div").with_id("only").mount()];
            let element = exactly_one("Page", "field", found).unwrap();
            assert!(element.describe().contains("#only"));
        }

        #[test]
        fn test_zero_elements_is_not_found() {
            let err = exactly_one("Page", "field", Vec::new()).unwrap_err();
            assert_eq!(
                err,
                PoblarError::NotFound {
                    page: "Page",
                    field: "field"
                }
            );
        }

        #[test]
        fn test_several_elements_is_ambiguous_with_count() {
            let found = vec![
                FakeNode::new("div").mount(),
                FakeNode::new("div").mount(),
                FakeNode::new("div").mount(),
            ];
            let err = exactly_one("Page", "field", found).unwrap_err();
            assert_eq!(
                err,
                PoblarError::AmbiguousMatch {
                    page: "Page",
                    field: "field",
                    count: 3
                }
            );
        }
    }
}
