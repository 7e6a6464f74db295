//! Poblar (Spanish: "to populate"): declarative page-object population.
//!
//! Page objects declare *what* each field represents (a locator strategy
//! plus optional state filters) and the framework resolves, filters, and
//! assigns the matching elements, recursively materializing nested page
//! objects scoped to their resolved element.
//!
//! ```text
//! ┌──────────────────┐  build once   ┌──────────────────────┐
//! │ field decls      │──────────────►│ PageDescriptor<T>    │
//! │ (#[by(...)] or   │               │ classified bindings, │
//! │  FieldDecl::...) │               │ cached per type      │
//! └──────────────────┘               └──────────┬───────────┘
//!                                               │ per load()
//!                                    ┌──────────▼───────────┐
//!                                    │ PageLoader           │
//!                                    │ finder → filters →   │──► populated
//!                                    │ cardinality → coerce │    instance
//!                                    └──────────────────────┘
//! ```
//!
//! The engine is synchronous and depth-first; waiting and retries belong to
//! the driver behind the [`SearchContext`] seam, never to the core. Callers
//! that poll for an element retry the whole [`PageLoader::load`] call.
//!
//! # Example
//!
//! ```
//! use poblar::mock::{FakeDom, FakeNode};
//! use poblar::{ElementHandle, PageLoader, PageObject};
//!
//! #[derive(Default, PageObject)]
//! struct SearchPage {
//!     #[by(id = "query")]
//!     query: Option<ElementHandle>,
//!     #[by(css = "li.result")]
//!     results: Vec<ElementHandle>,
//! }
//!
//! let dom = FakeDom::new(vec![
//!     FakeNode::new("input").with_id("query"),
//!     FakeNode::new("ul")
//!         .child(FakeNode::new("li").with_class("result").with_text("first"))
//!         .child(FakeNode::new("li").with_class("result").with_text("second")),
//! ]);
//!
//! let loader = PageLoader::new(dom.into_driver());
//! let page: SearchPage = loader.load().unwrap();
//!
//! assert!(page.query.is_some());
//! assert_eq!(page.results.len(), 2);
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod descriptor;
mod element;
mod filter;
mod finder;
mod loader;
pub mod mock;
mod page;
mod result;
mod selector;

pub use descriptor::{
    cached, BindingInfo, BindingKind, Cardinality, FieldDecl, PageDescriptor,
    PageDescriptorBuilder,
};
pub use element::{DriverHandle, Element, ElementHandle, SearchContext};
pub use filter::{Filter, StateMode, WithState};
pub use finder::{By, Finder};
pub use loader::PageLoader;
pub use page::PageObject;
pub use result::{PoblarError, PoblarResult};
pub use selector::Selector;

#[cfg(feature = "derive")]
pub use poblar_derive::PageObject;

/// Convenience re-exports for test modules.
///
/// `PageObject` here names both the trait and, with the `derive` feature, the
/// derive macro.
pub mod prelude {
    pub use crate::{
        cached, By, Cardinality, DriverHandle, Element, ElementHandle, FieldDecl, Filter, Finder,
        PageDescriptor, PageLoader, PageObject, PoblarError, PoblarResult, SearchContext,
        Selector, StateMode, WithState,
    };
}
