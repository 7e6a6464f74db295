//! Login Page Demo - Declarative Page-Object Population
//!
//! Demonstrates deriving a page object, loading it against the in-memory
//! mock document, and recovering from resolution errors.
//!
//! # Running
//!
//! ```bash
//! cargo run --example login_page -p poblar
//! ```
//!
//! # Features
//!
//! - `#[derive(PageObject)]` with `#[by(...)]` locators
//! - Nested page objects scoped to their element
//! - `#[with_state(...)]` visibility filters
//! - Cardinality errors (`NotFound`, `AmbiguousMatch`)

#![allow(clippy::uninlined_format_args, clippy::unwrap_used)]

use poblar::mock::{FakeDom, FakeNode};
use poblar::{DriverHandle, ElementHandle, PageLoader, PageObject, PoblarError};

#[derive(Default, PageObject)]
struct LoginForm {
    #[by(css = "input.user")]
    username: Option<ElementHandle>,
    #[by(css = "input.pass")]
    password: Option<ElementHandle>,
    #[by(tag_name = "button")]
    submit: Option<ElementHandle>,
}

#[derive(Default, PageObject)]
struct LoginPage {
    #[by(id = "login-form")]
    form: Option<LoginForm>,
    #[by(css = "div.error-banner")]
    #[with_state(present)]
    error_banners: Vec<ElementHandle>,
    driver: Option<DriverHandle>,
}

fn main() {
    // RUST_LOG=poblar=debug shows each binding as it resolves.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Poblar Login Page Demo ===\n");

    demo_page_load();
    demo_descriptor_introspection();
    demo_resolution_errors();

    println!("\n=== Login Page Demo Complete ===");
}

fn login_dom() -> FakeDom {
    FakeDom::new(vec![
        FakeNode::new("form")
            .with_id("login-form")
            .child(FakeNode::new("input").with_class("user").with_name("user"))
            .child(FakeNode::new("input").with_class("pass").with_name("pass"))
            .child(FakeNode::new("button").with_text("Sign in")),
        FakeNode::new("div")
            .with_class("error-banner")
            .with_text("Invalid credentials")
            .hidden(),
    ])
}

fn demo_page_load() {
    println!("--- Demo 1: Loading a Page Object ---\n");

    let loader = PageLoader::new(login_dom().into_driver());
    let page: LoginPage = loader.load().unwrap();

    let form = page.form.unwrap();
    println!("username: {}", form.username.unwrap().describe());
    println!("password: {}", form.password.unwrap().describe());
    println!("submit:   {}", form.submit.unwrap().describe());

    // with_state(present) keeps the hidden banner in the list.
    println!("\nerror banners (present, even hidden): {}", page.error_banners.len());
    println!("driver injected: {}", page.driver.is_some());

    println!();
}

fn demo_descriptor_introspection() {
    println!("--- Demo 2: Descriptor Introspection ---\n");

    let descriptor = LoginPage::descriptor().unwrap();
    println!("page: {}", descriptor.page_name());
    for binding in descriptor.bindings() {
        println!("  {}: {:?}", binding.field, binding.kind);
    }

    println!();
}

fn demo_resolution_errors() {
    println!("--- Demo 3: Resolution Errors ---\n");

    // No form at all: the singleton nested field fails with NotFound.
    let empty = FakeDom::new(vec![FakeNode::new("p").with_text("nothing here")]);
    let loader = PageLoader::new(empty.into_driver());
    match loader.load::<LoginPage>() {
        Err(PoblarError::NotFound { page, field }) => {
            println!("NotFound: {}.{}", page, field);
        }
        other => println!("unexpected: {:?}", other.is_ok()),
    }

    // Two forms: AmbiguousMatch with the offending count.
    let doubled = FakeDom::new(vec![
        FakeNode::new("form").with_id("login-form"),
        FakeNode::new("form").with_id("login-form"),
    ]);
    let loader = PageLoader::new(doubled.into_driver());
    match loader.load::<LoginPage>() {
        Err(PoblarError::AmbiguousMatch { page, field, count }) => {
            println!("AmbiguousMatch: {}.{} matched {} elements", page, field, count);
        }
        other => println!("unexpected: {:?}", other.is_ok()),
    }

    println!();
}
