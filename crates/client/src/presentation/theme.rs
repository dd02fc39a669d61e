//! Colour theme preference.

use serde::{Deserialize, Serialize};

/// Colour theme. Dark unless the stored preference says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Theme for a stored preference. Only `"light"` selects the light theme.
    #[must_use]
    pub fn from_preference(stored: Option<&str>) -> Self {
        match stored {
            Some("light") => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Value to store as the preference.
    #[must_use]
    pub const fn as_preference(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Icon of the toggle button, showing the theme it switches to.
    #[must_use]
    pub const fn toggle_icon(self) -> &'static str {
        match self {
            Self::Dark => "sun",
            Self::Light => "moon",
        }
    }
}
