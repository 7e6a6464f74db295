//! Derive macro for Poblar page objects.
//!
//! `#[derive(PageObject)]` turns per-field attributes into the registration
//! code a hand-written `PageObject` impl would contain: one `FieldDecl` per
//! bindable field, a `Default`-based constructor, and a publish-once cached
//! descriptor.
//!
//! # Field vocabulary
//!
//! - `#[by(css = "...")]` (or `id`, `name`, `tag_name`, `xpath`, `text`,
//!   `test_id`) attaches the field's finder. Declaring more than one is
//!   reported as a configuration error when the descriptor is first built,
//!   exactly like a duplicate `.find(...)` call.
//! - `#[with_state(visible)]` / `#[with_state(invisible)]` /
//!   `#[with_state(present)]` appends the built-in visibility filter and
//!   replaces the implicit visible-only default.
//! - `#[filter(expr)]` appends any custom `Filter` value.
//!
//! The field's type picks the binding shape:
//!
//! - `Option<ElementHandle>`: singleton element
//! - `Vec<ElementHandle>`: element list
//! - `Option<P>` / `Vec<P>`: nested page object(s) of type `P`
//! - `Option<PageLoader>` / `Option<DriverHandle>`: injected handles
//!
//! Types are matched by their last path segment, so keep the standard names
//! in scope. Fields of any other type are ignored by the derive, and an
//! `Option`/`Vec` of an unrecognized type counts as a nested page object only
//! when the field carries a poblar attribute; without one it is plain data
//! (e.g. `Option<String>`) and left alone. An element-shaped field without a
//! `#[by(...)]` is declared anyway and skipped with a warning at descriptor
//! build, mirroring the engine's treatment of inert fields.
//!
//! The struct must implement `Default` and take no generic parameters.
//!
//! # Example
//!
//! ```ignore
//! use poblar::{ElementHandle, PageObject};
//!
//! #[derive(Default, PageObject)]
//! struct LoginPage {
//!     #[by(id = "username")]
//!     username: Option<ElementHandle>,
//!     #[by(css = "button.primary")]
//!     #[with_state(present)]
//!     submit: Option<ElementHandle>,
//!     #[by(css = "li.error")]
//!     errors: Vec<ElementHandle>,
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr,
    PathArguments, Type,
};

/// Derive `poblar::PageObject` for a `Default` struct with named fields.
#[proc_macro_derive(PageObject, attributes(by, with_state, filter))]
pub fn derive_page_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "PageObject cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(syn::Error::new_spanned(
                    input,
                    format!(
                        "PageObject requires named fields, found {}",
                        match other {
                            Fields::Unnamed(_) => "a tuple struct",
                            _ => "a unit struct",
                        }
                    ),
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "PageObject can only be derived for structs",
            ))
        }
    };

    let ident = &input.ident;
    let page_name = ident.to_string();

    let mut decls = Vec::new();
    for field in fields {
        let field_ident = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "PageObject fields must be named")
        })?;
        let attrs = parse_field_attrs(&field.attrs)?;
        let shape = classify(&field.ty);

        let decl = match shape {
            // A wrapped type that is not one of the well-known names is a
            // nested page object only when the field says so with an
            // attribute; otherwise it is plain data (Option<String>, Vec<u8>)
            // and not the derive's business.
            Some(FieldShape::Nested(_) | FieldShape::NestedList(_)) if attrs.is_empty() => {
                continue;
            }
            Some(shape) => field_decl(ident, field_ident, &shape),
            None => {
                if attrs.is_empty() {
                    continue; // plain data field, not the derive's business
                }
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "poblar attributes require Option<ElementHandle>, Vec<ElementHandle>, \
                     Option<PageLoader>, Option<DriverHandle>, or an Option/Vec of a nested \
                     page-object type",
                ));
            }
        };

        let finders = &attrs.finders;
        let filters = &attrs.filters;
        decls.push(quote! {
            #decl #( .find(#finders) )* #( .filter(#filters) )*
        });
    }

    Ok(quote! {
        #[automatically_derived]
        impl ::poblar::PageObject for #ident {
            fn descriptor() -> ::poblar::PoblarResult<&'static ::poblar::PageDescriptor<Self>> {
                static DESCRIPTOR: ::std::sync::OnceLock<
                    ::poblar::PoblarResult<::poblar::PageDescriptor<#ident>>,
                > = ::std::sync::OnceLock::new();
                ::poblar::cached(&DESCRIPTOR, || {
                    ::poblar::PageDescriptor::builder(#page_name)
                        .constructs_default()
                        #( .declare(#decls) )*
                        .build()
                })
            }

            fn page_name() -> &'static str {
                #page_name
            }
        }
    })
}

/// The binding shape a field's type selects.
enum FieldShape<'a> {
    Element,
    Elements,
    Loader,
    Driver,
    Nested(&'a Type),
    NestedList(&'a Type),
}

fn field_decl(
    page: &Ident,
    field: &Ident,
    shape: &FieldShape<'_>,
) -> proc_macro2::TokenStream {
    let name = field.to_string();
    match shape {
        FieldShape::Element => quote! {
            ::poblar::FieldDecl::element(
                #name,
                |page: &mut #page, value: ::poblar::ElementHandle| {
                    page.#field = ::core::option::Option::Some(value);
                },
            )
        },
        FieldShape::Elements => quote! {
            ::poblar::FieldDecl::elements(
                #name,
                |page: &mut #page, value: ::std::vec::Vec<::poblar::ElementHandle>| {
                    page.#field = value;
                },
            )
        },
        FieldShape::Loader => quote! {
            ::poblar::FieldDecl::loader(
                #name,
                |page: &mut #page, value: ::poblar::PageLoader| {
                    page.#field = ::core::option::Option::Some(value);
                },
            )
        },
        FieldShape::Driver => quote! {
            ::poblar::FieldDecl::driver(
                #name,
                |page: &mut #page, value: ::poblar::DriverHandle| {
                    page.#field = ::core::option::Option::Some(value);
                },
            )
        },
        FieldShape::Nested(inner) => quote! {
            ::poblar::FieldDecl::nested::<#inner>(
                #name,
                |page: &mut #page, value: #inner| {
                    page.#field = ::core::option::Option::Some(value);
                },
            )
        },
        FieldShape::NestedList(inner) => quote! {
            ::poblar::FieldDecl::nested_list::<#inner>(
                #name,
                |page: &mut #page, value: ::std::vec::Vec<#inner>| {
                    page.#field = value;
                },
            )
        },
    }
}

struct FieldAttrs {
    finders: Vec<proc_macro2::TokenStream>,
    filters: Vec<proc_macro2::TokenStream>,
}

impl FieldAttrs {
    fn is_empty(&self) -> bool {
        self.finders.is_empty() && self.filters.is_empty()
    }
}

const STRATEGIES: &[&str] = &["css", "id", "name", "tag_name", "xpath", "text", "test_id"];

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut finders = Vec::new();
    let mut filters = Vec::new();

    for attr in attrs {
        if attr.path().is_ident("by") {
            attr.parse_nested_meta(|meta| {
                let strategy = meta.path.get_ident().ok_or_else(|| {
                    meta.error("expected a locator strategy, e.g. #[by(css = \"...\")]")
                })?;
                if !STRATEGIES.contains(&strategy.to_string().as_str()) {
                    return Err(meta.error(format!(
                        "unknown locator strategy `{strategy}` (expected one of: {})",
                        STRATEGIES.join(", ")
                    )));
                }
                let value: LitStr = meta.value()?.parse()?;
                // strategy names match the By constructors one for one
                finders.push(quote!(::poblar::By::#strategy(#value)));
                Ok(())
            })?;
        } else if attr.path().is_ident("with_state") {
            let mode: Ident = attr.parse_args()?;
            let filter = match mode.to_string().as_str() {
                "present" => quote!(::poblar::WithState::present()),
                "visible" => quote!(::poblar::WithState::visible()),
                "invisible" => quote!(::poblar::WithState::invisible()),
                other => {
                    return Err(syn::Error::new(
                        mode.span(),
                        format!(
                            "unknown state `{other}` (expected present, visible or invisible)"
                        ),
                    ))
                }
            };
            filters.push(filter);
        } else if attr.path().is_ident("filter") {
            let expr: syn::Expr = attr.parse_args()?;
            filters.push(quote!(#expr));
        }
    }

    Ok(FieldAttrs { finders, filters })
}

/// Pick the binding shape from the field's type, matching `Option<_>` and
/// `Vec<_>` by their last path segment.
fn classify(ty: &Type) -> Option<FieldShape<'_>> {
    let (wrapper, inner) = unwrap_generic(ty)?;
    let inner_name = last_segment_name(inner);
    match (wrapper.as_str(), inner_name.as_deref()) {
        ("Option", Some("ElementHandle")) => Some(FieldShape::Element),
        ("Vec", Some("ElementHandle")) => Some(FieldShape::Elements),
        ("Option", Some("PageLoader")) => Some(FieldShape::Loader),
        ("Option", Some("DriverHandle")) => Some(FieldShape::Driver),
        ("Option", _) => Some(FieldShape::Nested(inner)),
        ("Vec", _) => Some(FieldShape::NestedList(inner)),
        _ => None,
    }
}

/// Split `Wrapper<Inner>` into its wrapper name and inner type.
fn unwrap_generic(ty: &Type) -> Option<(String, &Type)> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some((segment.ident.to_string(), inner))
}

fn last_segment_name(ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else { return None };
    Some(path.path.segments.last()?.ident.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_classify_element_shapes() {
        let single: Type = parse_quote!(Option<ElementHandle>);
        let list: Type = parse_quote!(Vec<ElementHandle>);
        assert!(matches!(classify(&single), Some(FieldShape::Element)));
        assert!(matches!(classify(&list), Some(FieldShape::Elements)));
    }

    #[test]
    fn test_classify_injected_handles() {
        let loader: Type = parse_quote!(Option<PageLoader>);
        let driver: Type = parse_quote!(Option<poblar::DriverHandle>);
        assert!(matches!(classify(&loader), Some(FieldShape::Loader)));
        assert!(matches!(classify(&driver), Some(FieldShape::Driver)));
    }

    #[test]
    fn test_classify_nested_pages() {
        let nested: Type = parse_quote!(Option<LoginForm>);
        let nested_list: Type = parse_quote!(Vec<ResultRow>);
        assert!(matches!(classify(&nested), Some(FieldShape::Nested(_))));
        assert!(matches!(
            classify(&nested_list),
            Some(FieldShape::NestedList(_))
        ));
    }

    #[test]
    fn test_classify_rejects_plain_types() {
        let plain: Type = parse_quote!(String);
        let map: Type = parse_quote!(HashMap<String, String>);
        assert!(classify(&plain).is_none());
        assert!(classify(&map).is_none());
    }

    #[test]
    fn test_by_attr_accepts_each_strategy() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[by(css = "#user")])];
        let parsed = parse_field_attrs(&attrs).unwrap();
        assert_eq!(parsed.finders.len(), 1);
        assert!(parsed.finders[0].to_string().contains("css"));
    }

    #[test]
    fn test_two_by_attrs_become_two_finders() {
        // duplicate finders are a descriptor-build error, reported at runtime
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[by(id = "user")]),
            parse_quote!(#[by(css = "#user")]),
        ];
        let parsed = parse_field_attrs(&attrs).unwrap();
        assert_eq!(parsed.finders.len(), 2);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[by(label = "User")])];
        assert!(parse_field_attrs(&attrs).is_err());
    }

    #[test]
    fn test_with_state_modes() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[with_state(invisible)])];
        let parsed = parse_field_attrs(&attrs).unwrap();
        assert_eq!(parsed.filters.len(), 1);
        assert!(parsed.filters[0].to_string().contains("invisible"));
    }

    #[test]
    fn test_bad_state_is_rejected() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[with_state(translucent)])];
        assert!(parse_field_attrs(&attrs).is_err());
    }

    #[test]
    fn test_expand_generates_descriptor_impl() {
        let input: DeriveInput = parse_quote! {
            #[derive(Default)]
            struct LoginPage {
                #[by(id = "username")]
                username: Option<ElementHandle>,
                title: String,
            }
        };
        let generated = expand(&input).unwrap().to_string();
        assert!(generated.contains("impl :: poblar :: PageObject for LoginPage"));
        assert!(generated.contains("constructs_default"));
        // plain data fields are not declared
        assert!(!generated.contains("\"title\""));
    }

    #[test]
    fn test_expand_leaves_unattributed_wrapped_data_alone() {
        // Option/Vec of a non-poblar type is nested only with an attribute;
        // bare ones are ordinary data fields.
        let input: DeriveInput = parse_quote! {
            #[derive(Default)]
            struct ProfilePage {
                #[by(id = "avatar")]
                avatar: Option<ElementHandle>,
                note: Option<String>,
                tags: Vec<String>,
            }
        };
        let generated = expand(&input).unwrap().to_string();
        assert!(generated.contains("\"avatar\""));
        assert!(!generated.contains("nested"));
        assert!(!generated.contains("\"note\""));
        assert!(!generated.contains("\"tags\""));
    }

    #[test]
    fn test_expand_treats_attributed_wrapped_types_as_nested() {
        let input: DeriveInput = parse_quote! {
            #[derive(Default)]
            struct OuterPage {
                #[by(id = "form")]
                form: Option<LoginForm>,
            }
        };
        let generated = expand(&input).unwrap().to_string();
        assert!(generated.contains("nested"));
        assert!(generated.contains("LoginForm"));
    }

    #[test]
    fn test_expand_rejects_generics() {
        let input: DeriveInput = parse_quote! {
            struct Page<T> { value: Option<T> }
        };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn test_expand_rejects_enums() {
        let input: DeriveInput = parse_quote! {
            enum NotAPage { A, B }
        };
        assert!(expand(&input).is_err());
    }
}
