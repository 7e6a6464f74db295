//! The page-object contract.

use crate::descriptor::PageDescriptor;
use crate::result::PoblarResult;

/// A data struct whose fields mirror elements of a structured document,
/// populated by [`PageLoader`](crate::PageLoader).
///
/// Implementations supply a cached [`PageDescriptor`] describing how each
/// field is resolved. Most types derive this via `#[derive(PageObject)]`
/// (feature `derive`); hand-written implementations use
/// [`PageDescriptor::builder`] together with [`cached`](crate::cached):
///
/// ```
/// use std::sync::OnceLock;
///
/// use poblar::{
///     cached, By, ElementHandle, FieldDecl, PageDescriptor, PageObject, PoblarResult,
/// };
///
/// #[derive(Default)]
/// struct LoginPage {
///     username: Option<ElementHandle>,
///     buttons: Vec<ElementHandle>,
/// }
///
/// impl PageObject for LoginPage {
///     fn descriptor() -> PoblarResult<&'static PageDescriptor<Self>> {
///         static DESCRIPTOR: OnceLock<PoblarResult<PageDescriptor<LoginPage>>> =
///             OnceLock::new();
///         cached(&DESCRIPTOR, || {
///             PageDescriptor::builder("LoginPage")
///                 .constructs_default()
///                 .declare(
///                     FieldDecl::element("username", |page: &mut LoginPage, el| {
///                         page.username = Some(el)
///                     })
///                     .find(By::id("username")),
///                 )
///                 .declare(
///                     FieldDecl::elements("buttons", |page: &mut LoginPage, els| {
///                         page.buttons = els
///                     })
///                     .find(By::tag_name("button")),
///                 )
///                 .build()
///         })
///     }
///
///     fn page_name() -> &'static str {
///         "LoginPage"
///     }
/// }
///
/// assert_eq!(LoginPage::descriptor().unwrap().bindings().len(), 2);
/// ```
pub trait PageObject: Sized + Send + 'static {
    /// The cached resolution plan for this type.
    ///
    /// Built on first use and immutable afterwards; a failed build is cached
    /// too and re-surfaced on every call.
    fn descriptor() -> PoblarResult<&'static PageDescriptor<Self>>;

    /// Name used in logs and error messages.
    fn page_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}
