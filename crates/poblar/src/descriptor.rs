//! Field declarations, binding classification, and page descriptors.
//!
//! A page-object type registers one [`FieldDecl`] per bindable field (by hand
//! through [`PageDescriptor::builder`], or generated by
//! `#[derive(PageObject)]`). Building the descriptor runs the classification
//! pass exactly once per type: duplicate finders are rejected, the implicit
//! visible-only filter is prepended where nothing replaces it, and each
//! surviving declaration becomes a tagged [`FieldBinding`] variant that is
//! never re-inspected at resolution time.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::element::{DriverHandle, ElementHandle};
use crate::filter::{Filter, WithState};
use crate::finder::Finder;
use crate::loader::PageLoader;
use crate::page::PageObject;
use crate::result::{PoblarError, PoblarResult};

/// Cardinality of a locator binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one element; zero or several is an error.
    One,
    /// Zero or more elements, kept in finder order.
    Many,
}

type SetLoader<T> = Box<dyn Fn(&mut T, PageLoader) + Send + Sync>;
type SetDriver<T> = Box<dyn Fn(&mut T, DriverHandle) + Send + Sync>;
type ApplyOne<T> = Box<dyn Fn(&mut T, &PageLoader, ElementHandle) -> PoblarResult<()> + Send + Sync>;
type ApplyMany<T> =
    Box<dyn Fn(&mut T, &PageLoader, Vec<ElementHandle>) -> PoblarResult<()> + Send + Sync>;

/// What a locator binding materializes its resolved elements into, together
/// with the typed setter captured when the declaration was made.
pub(crate) enum BindTarget<T> {
    /// Singleton binding: receives the one element that survived cardinality
    /// enforcement.
    One(ApplyOne<T>),
    /// List binding: receives every surviving element, order preserved.
    Many(ApplyMany<T>),
}

impl<T> BindTarget<T> {
    pub(crate) const fn cardinality(&self) -> Cardinality {
        match self {
            Self::One(_) => Cardinality::One,
            Self::Many(_) => Cardinality::Many,
        }
    }
}

enum DeclKind<T> {
    Locator(BindTarget<T>),
    Loader(SetLoader<T>),
    Driver(SetDriver<T>),
}

impl<T> DeclKind<T> {
    const fn describe(&self) -> &'static str {
        match self {
            Self::Locator(_) => "locator",
            Self::Loader(_) => "loader injection",
            Self::Driver(_) => "driver injection",
        }
    }
}

/// A single field declaration: the Rust-native analogue of an annotated
/// field.
///
/// Built with one of the typed constructors, then decorated with
/// [`FieldDecl::find`] and [`FieldDecl::filter`]. The constructor fixes the
/// binding's target and cardinality; the setter closure it captures is the
/// only thing that ever writes the field, so no name-based assignment happens
/// at resolution time.
pub struct FieldDecl<T> {
    name: &'static str,
    kind: DeclKind<T>,
    finders: Vec<Arc<dyn Finder>>,
    filters: Vec<Arc<dyn Filter>>,
}

impl<T: 'static> FieldDecl<T> {
    fn with_kind(name: &'static str, kind: DeclKind<T>) -> Self {
        Self {
            name,
            kind,
            finders: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Singleton element binding: exactly one element, assigned via `set`.
    pub fn element(
        name: &'static str,
        set: impl Fn(&mut T, ElementHandle) + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(
            name,
            DeclKind::Locator(BindTarget::One(Box::new(move |page, _loader, element| {
                set(page, element);
                Ok(())
            }))),
        )
    }

    /// List binding over the base element capability: zero or more elements,
    /// in finder order.
    pub fn elements(
        name: &'static str,
        set: impl Fn(&mut T, Vec<ElementHandle>) + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(
            name,
            DeclKind::Locator(BindTarget::Many(Box::new(move |page, _loader, elements| {
                set(page, elements);
                Ok(())
            }))),
        )
    }

    /// Singleton nested page object, populated with the resolved element as
    /// its search context.
    pub fn nested<P: PageObject>(
        name: &'static str,
        set: impl Fn(&mut T, P) + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(
            name,
            DeclKind::Locator(BindTarget::One(Box::new(move |page, loader, element| {
                set(page, loader.load_in::<P>(&element)?);
                Ok(())
            }))),
        )
    }

    /// List of nested page objects, one per resolved element, each scoped to
    /// its own element.
    pub fn nested_list<P: PageObject>(
        name: &'static str,
        set: impl Fn(&mut T, Vec<P>) + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(
            name,
            DeclKind::Locator(BindTarget::Many(Box::new(move |page, loader, elements| {
                let pages = elements
                    .into_iter()
                    .map(|element| loader.load_in::<P>(&element))
                    .collect::<PoblarResult<Vec<P>>>()?;
                set(page, pages);
                Ok(())
            }))),
        )
    }

    /// Inject the resolution engine's own handle.
    pub fn loader(
        name: &'static str,
        set: impl Fn(&mut T, PageLoader) + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(name, DeclKind::Loader(Box::new(set)))
    }

    /// Inject the root driving handle. Always the global handle, independent
    /// of how deep the nested-object recursion is.
    pub fn driver(
        name: &'static str,
        set: impl Fn(&mut T, DriverHandle) + Send + Sync + 'static,
    ) -> Self {
        Self::with_kind(name, DeclKind::Driver(Box::new(set)))
    }

    /// Attach the field's finder.
    ///
    /// A second call is a configuration error reported when the descriptor is
    /// built, before any lookup runs.
    #[must_use]
    pub fn find(mut self, finder: impl Finder + 'static) -> Self {
        self.finders.push(Arc::new(finder));
        self
    }

    /// Append a filter, applied after the finder in declaration order.
    #[must_use]
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// The field name this declaration binds.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for FieldDecl<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("kind", &self.kind.describe())
            .field("finders", &self.finders.len())
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// A classified, resolvable field binding. Decided once during descriptor
/// construction, never re-inspected afterwards.
pub(crate) enum FieldBinding<T> {
    LoaderInjection {
        field: &'static str,
        set: SetLoader<T>,
    },
    DriverInjection {
        field: &'static str,
        set: SetDriver<T>,
    },
    Locator {
        field: &'static str,
        finder: Arc<dyn Finder>,
        filters: Vec<Arc<dyn Filter>>,
        target: BindTarget<T>,
    },
}

impl<T> FieldBinding<T> {
    fn info(&self) -> BindingInfo {
        match self {
            Self::LoaderInjection { field, .. } => BindingInfo {
                field,
                kind: BindingKind::Loader,
            },
            Self::DriverInjection { field, .. } => BindingInfo {
                field,
                kind: BindingKind::Driver,
            },
            Self::Locator { field, target, .. } => BindingInfo {
                field,
                kind: BindingKind::Locator(target.cardinality()),
            },
        }
    }
}

/// Classified binding kinds, exposed for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Field receives the engine handle.
    Loader,
    /// Field receives the root driving handle.
    Driver,
    /// Field is resolved through the locator pipeline.
    Locator(Cardinality),
}

/// Introspection snapshot of one classified binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingInfo {
    /// Field the binding assigns.
    pub field: &'static str,
    /// How the binding was classified.
    pub kind: BindingKind,
}

/// Immutable resolution plan for one page-object type.
///
/// Built once per type and cached (see [`cached`]); holds no instance state,
/// so it is safe to share across threads and across any number of
/// [`PageLoader::load`] calls.
pub struct PageDescriptor<T> {
    page_name: &'static str,
    construct: Option<Box<dyn Fn() -> T + Send + Sync>>,
    bindings: Vec<FieldBinding<T>>,
}

impl<T: 'static> PageDescriptor<T> {
    /// Start declaring a page type.
    #[must_use]
    pub fn builder(page_name: &'static str) -> PageDescriptorBuilder<T> {
        PageDescriptorBuilder {
            page_name,
            construct: None,
            decls: Vec::new(),
        }
    }

    /// Name used in logs and error messages.
    #[must_use]
    pub const fn page_name(&self) -> &'static str {
        self.page_name
    }

    /// Snapshot of the classified bindings, in declaration order.
    #[must_use]
    pub fn bindings(&self) -> Vec<BindingInfo> {
        self.bindings.iter().map(FieldBinding::info).collect()
    }

    pub(crate) fn entries(&self) -> &[FieldBinding<T>] {
        &self.bindings
    }

    /// Construct a fresh, unpopulated instance.
    pub(crate) fn instantiate(&self) -> PoblarResult<T> {
        match &self.construct {
            Some(construct) => Ok(construct()),
            None => Err(PoblarError::Construction {
                page: self.page_name,
            }),
        }
    }
}

impl<T> fmt::Debug for PageDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDescriptor")
            .field("page", &self.page_name)
            .field(
                "fields",
                &self
                    .bindings
                    .iter()
                    .map(|binding| binding.info().field)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder running the one-pass classification over field declarations.
pub struct PageDescriptorBuilder<T> {
    page_name: &'static str,
    construct: Option<Box<dyn Fn() -> T + Send + Sync>>,
    decls: Vec<FieldDecl<T>>,
}

impl<T: 'static> PageDescriptorBuilder<T> {
    /// Register the zero-argument constructor used for fresh instances.
    #[must_use]
    pub fn constructs_with(mut self, construct: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.construct = Some(Box::new(construct));
        self
    }

    /// Use `T::default()` as the constructor.
    #[must_use]
    pub fn constructs_default(self) -> Self
    where
        T: Default,
    {
        self.constructs_with(T::default)
    }

    /// Add a field declaration. Declaration order is kept; a repeated field
    /// name is shadowed by its first occurrence.
    #[must_use]
    pub fn declare(mut self, decl: FieldDecl<T>) -> Self {
        self.decls.push(decl);
        self
    }

    /// Run the classification pass and freeze the descriptor.
    ///
    /// Fails with [`PoblarError::Config`] on a field declaring more than one
    /// finder, or on a finder attached to an injected field. Locator-shaped
    /// declarations without a finder are inert: they are skipped with a
    /// warning rather than bound.
    pub fn build(self) -> PoblarResult<PageDescriptor<T>> {
        let page = self.page_name;
        let mut seen: Vec<&'static str> = Vec::new();
        let mut bindings = Vec::with_capacity(self.decls.len());

        for decl in self.decls {
            if seen.contains(&decl.name) {
                tracing::debug!(page, field = decl.name, "shadowed field declaration ignored");
                continue;
            }
            seen.push(decl.name);

            let FieldDecl {
                name,
                kind,
                mut finders,
                filters,
            } = decl;

            if finders.len() > 1 {
                return Err(PoblarError::Config {
                    page,
                    field: name,
                    message: format!(
                        "{} finders declared, at most one is allowed",
                        finders.len()
                    ),
                });
            }
            let finder = finders.pop();

            match kind {
                DeclKind::Loader(set) => {
                    reject_finder_on_injection(page, name, "loader", finder.as_deref())?;
                    bindings.push(FieldBinding::LoaderInjection { field: name, set });
                }
                DeclKind::Driver(set) => {
                    reject_finder_on_injection(page, name, "driver", finder.as_deref())?;
                    bindings.push(FieldBinding::DriverInjection { field: name, set });
                }
                DeclKind::Locator(target) => {
                    let Some(finder) = finder else {
                        tracing::warn!(
                            page,
                            field = name,
                            "field declares no finder and is not injectable; skipped"
                        );
                        continue;
                    };
                    bindings.push(FieldBinding::Locator {
                        field: name,
                        finder,
                        filters: with_implicit_visibility(filters),
                        target,
                    });
                }
            }
        }

        Ok(PageDescriptor {
            page_name: page,
            construct: self.construct,
            bindings,
        })
    }
}

impl<T> fmt::Debug for PageDescriptorBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDescriptorBuilder")
            .field("page", &self.page_name)
            .field("decls", &self.decls.len())
            .finish()
    }
}

fn reject_finder_on_injection(
    page: &'static str,
    field: &'static str,
    what: &str,
    finder: Option<&dyn Finder>,
) -> PoblarResult<()> {
    match finder {
        Some(finder) => Err(PoblarError::Config {
            page,
            field,
            message: format!(
                "a finder ({}) cannot be combined with a {what} injection",
                finder.describe()
            ),
        }),
        None => Ok(()),
    }
}

/// Prepend the implicit visible-only filter unless a declared filter replaces
/// the default.
fn with_implicit_visibility(declared: Vec<Arc<dyn Filter>>) -> Vec<Arc<dyn Filter>> {
    if declared
        .iter()
        .any(|filter| filter.replaces_implicit_visibility())
    {
        return declared;
    }
    let mut filters: Vec<Arc<dyn Filter>> = Vec::with_capacity(declared.len() + 1);
    filters.push(Arc::new(WithState::visible()));
    filters.extend(declared);
    filters
}

/// Publish-once caching for descriptor builds.
///
/// Shared by hand-written and derived
/// [`PageObject::descriptor`](crate::PageObject::descriptor) implementations:
/// the first caller runs `build` and the outcome (including a failed build)
/// is frozen for every later call.
pub fn cached<T: 'static>(
    cell: &'static OnceLock<PoblarResult<PageDescriptor<T>>>,
    build: impl FnOnce() -> PoblarResult<PageDescriptor<T>>,
) -> PoblarResult<&'static PageDescriptor<T>> {
    match cell.get_or_init(build) {
        Ok(descriptor) => Ok(descriptor),
        Err(error) => Err(error.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::By;
    use crate::loader::PageLoader;

    #[derive(Default)]
    struct Page {
        username: Option<ElementHandle>,
        rows: Vec<ElementHandle>,
        loader: Option<PageLoader>,
        driver: Option<DriverHandle>,
    }

    mod classification_tests {
        use super::*;

        #[test]
        fn test_bindings_keep_declaration_order() {
            let descriptor = PageDescriptor::<Page>::builder("Page")
                .constructs_default()
                .declare(
                    FieldDecl::element("username", |p: &mut Page, el| p.username = Some(el))
                        .find(By::id("username")),
                )
                .declare(FieldDecl::elements("rows", |p: &mut Page, els| p.rows = els).find(By::css("tr")))
                .declare(FieldDecl::loader("loader", |p: &mut Page, l| p.loader = Some(l)))
                .declare(FieldDecl::driver("driver", |p: &mut Page, d| p.driver = Some(d)))
                .build()
                .unwrap();

            let info = descriptor.bindings();
            assert_eq!(info.len(), 4);
            assert_eq!(info[0].field, "username");
            assert_eq!(info[0].kind, BindingKind::Locator(Cardinality::One));
            assert_eq!(info[1].kind, BindingKind::Locator(Cardinality::Many));
            assert_eq!(info[2].kind, BindingKind::Loader);
            assert_eq!(info[3].kind, BindingKind::Driver);
        }

        #[test]
        fn test_two_finders_is_a_config_error() {
            let err = PageDescriptor::<Page>::builder("Page")
                .constructs_default()
                .declare(
                    FieldDecl::element("username", |p: &mut Page, el| p.username = Some(el))
                        .find(By::id("username"))
                        .find(By::css("#username")),
                )
                .build()
                .unwrap_err();

            assert!(matches!(
                err,
                PoblarError::Config {
                    field: "username",
                    ..
                }
            ));
        }

        #[test]
        fn test_finder_on_injected_field_is_a_config_error() {
            let err = PageDescriptor::<Page>::builder("Page")
                .constructs_default()
                .declare(FieldDecl::loader("loader", |p: &mut Page, l| p.loader = Some(l)).find(By::id("x")))
                .build()
                .unwrap_err();

            assert!(matches!(err, PoblarError::Config { field: "loader", .. }));
        }

        #[test]
        fn test_finderless_locator_field_is_skipped() {
            let descriptor = PageDescriptor::<Page>::builder("Page")
                .constructs_default()
                .declare(FieldDecl::element("username", |p: &mut Page, el| p.username = Some(el)))
                .build()
                .unwrap();

            assert!(descriptor.bindings().is_empty());
        }

        #[test]
        fn test_first_declaration_wins_on_duplicate_names() {
            let descriptor = PageDescriptor::<Page>::builder("Page")
                .constructs_default()
                .declare(
                    FieldDecl::element("username", |p: &mut Page, el| p.username = Some(el))
                        .find(By::id("first")),
                )
                .declare(
                    // shadowed: would be a duplicate-finder error if processed
                    FieldDecl::element("username", |p: &mut Page, el| p.username = Some(el))
                        .find(By::id("second"))
                        .find(By::id("third")),
                )
                .build()
                .unwrap();

            assert_eq!(descriptor.bindings().len(), 1);
        }
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn test_missing_constructor_is_a_construction_error() {
            let descriptor = PageDescriptor::<Page>::builder("Page").build().unwrap();
            assert!(matches!(
                descriptor.instantiate(),
                Err(PoblarError::Construction { page: "Page" })
            ));
        }

        #[test]
        fn test_registered_constructor_is_used() {
            let descriptor = PageDescriptor::<Page>::builder("Page")
                .constructs_with(Page::default)
                .build()
                .unwrap();
            assert!(descriptor.instantiate().is_ok());
        }
    }

    mod cache_tests {
        use super::*;

        #[test]
        fn test_cached_builds_once() {
            static CELL: OnceLock<PoblarResult<PageDescriptor<Page>>> = OnceLock::new();
            let first = cached(&CELL, || {
                PageDescriptor::<Page>::builder("Page").constructs_default().build()
            })
            .unwrap() as *const PageDescriptor<Page>;
            let second = cached(&CELL, || unreachable!("descriptor must be cached"))
                .unwrap() as *const PageDescriptor<Page>;
            assert_eq!(first, second);
        }

        #[test]
        fn test_cached_freezes_a_failed_build() {
            static CELL: OnceLock<PoblarResult<PageDescriptor<Page>>> = OnceLock::new();
            let build = || {
                PageDescriptor::<Page>::builder("Page")
                    .constructs_default()
                    .declare(
                        FieldDecl::element("username", |p: &mut Page, el| p.username = Some(el))
                            .find(By::id("a"))
                            .find(By::id("b")),
                    )
                    .build()
            };
            assert!(cached(&CELL, build).is_err());
            // second call re-surfaces the cached error without rebuilding
            assert!(cached(&CELL, || unreachable!("build ran twice")).is_err());
        }
    }
}
