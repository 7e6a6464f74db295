//! Filter capability and the built-in visibility-state filter.

use serde::{Deserialize, Serialize};

use crate::element::ElementHandle;

/// Composable post-processing step over already-located elements.
///
/// Filters run after the field's finder, in declaration order, each consuming
/// the previous output. Implementations keep finder order unless they
/// document otherwise.
pub trait Filter: Send + Sync {
    /// Narrow (or reorder) an ordered sequence of elements.
    fn apply(&self, elements: Vec<ElementHandle>) -> Vec<ElementHandle>;

    /// Whether this filter replaces the engine's implicit visible-only
    /// default instead of stacking on top of it.
    ///
    /// The descriptor builder prepends [`WithState::visible`] to every
    /// locator binding unless some declared filter returns `true` here.
    fn replaces_implicit_visibility(&self) -> bool {
        false
    }

    /// Description used in logs.
    fn describe(&self) -> String {
        "<filter>".to_string()
    }
}

/// Display-state modes for [`WithState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateMode {
    /// Keep every located element, displayed or not
    Present,
    /// Keep only currently-displayed elements
    Visible,
    /// Keep only currently-not-displayed elements
    Invisible,
}

/// Built-in visibility-state filter.
///
/// Declaring any `WithState` variant on a field fully replaces the implicit
/// visible-only default: `WithState::present()` is how a field opts into
/// receiving hidden elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithState {
    mode: StateMode,
}

impl WithState {
    /// Keep every located element (suppresses the implicit default).
    #[must_use]
    pub const fn present() -> Self {
        Self {
            mode: StateMode::Present,
        }
    }

    /// Keep only currently-displayed elements.
    #[must_use]
    pub const fn visible() -> Self {
        Self {
            mode: StateMode::Visible,
        }
    }

    /// Keep only currently-not-displayed elements.
    #[must_use]
    pub const fn invisible() -> Self {
        Self {
            mode: StateMode::Invisible,
        }
    }

    /// The configured mode.
    #[must_use]
    pub const fn mode(&self) -> StateMode {
        self.mode
    }
}

impl Filter for WithState {
    fn apply(&self, elements: Vec<ElementHandle>) -> Vec<ElementHandle> {
        match self.mode {
            StateMode::Present => elements,
            StateMode::Visible => elements
                .into_iter()
                .filter(|element| element.is_displayed())
                .collect(),
            StateMode::Invisible => elements
                .into_iter()
                .filter(|element| !element.is_displayed())
                .collect(),
        }
    }

    fn replaces_implicit_visibility(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        match self.mode {
            StateMode::Present => "with_state(present)".to_string(),
            StateMode::Visible => "with_state(visible)".to_string(),
            StateMode::Invisible => "with_state(invisible)".to_string(),
        }
    }
}
