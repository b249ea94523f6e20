//! The fixed theme registry.
//!
//! A theme is a single named accent color. Sub-goal cells use it as-is and
//! the core-goal cell uses a darkened variant with white text.

use crate::color::{darken, ColorParseError};
use crate::error::GridError;
use serde::Serialize;

/// How much the core-goal background is darkened relative to the theme.
pub const CORE_GOAL_DARKEN_PERCENT: i32 = 40;

/// Foreground color of the core-goal cell, independent of the theme.
pub const CORE_GOAL_FOREGROUND: &str = "white";

/// A named accent color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Theme {
    /// Unique display name
    pub name: &'static str,
    /// `#rrggbb` accent color
    pub color: &'static str,
}

/// Every theme the chart can be tinted with, in display order.
pub static THEMES: [Theme; 6] = [
    Theme {
        name: "Ocean",
        color: "#007bff",
    },
    Theme {
        name: "Forest",
        color: "#28a745",
    },
    Theme {
        name: "Sunset",
        color: "#fd7e14",
    },
    Theme {
        name: "Purple",
        color: "#6f42c1",
    },
    Theme {
        name: "Rose",
        color: "#e83e8c",
    },
    Theme {
        name: "Mint",
        color: "#20c997",
    },
];

impl Theme {
    /// The theme a new session starts with.
    #[must_use]
    pub fn default_theme() -> &'static Self {
        &THEMES[0]
    }

    /// Find a registered theme by exact name.
    #[must_use]
    pub fn find(name: &str) -> Option<&'static Self> {
        THEMES.iter().find(|theme| theme.name == name)
    }

    /// Like [`Theme::find`] but reports unknown names as [`GridError::InvalidTheme`].
    pub fn lookup(name: &str) -> Result<&'static Self, GridError> {
        Self::find(name).ok_or_else(|| GridError::InvalidTheme(name.to_string()))
    }

    /// Background color of the core-goal cell under this theme.
    pub fn core_goal_background(&self) -> Result<String, ColorParseError> {
        darken(self.color, CORE_GOAL_DARKEN_PERCENT)
    }

    /// Iterate over the registry.
    pub fn all() -> impl Iterator<Item = &'static Self> {
        THEMES.iter()
    }
}
