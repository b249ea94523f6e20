//! Errors raised by the grid model.

use crate::color::ColorParseError;
use thiserror::Error;

/// Errors from grid and theme operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A theme name that is not in the registry.
    #[error("unknown theme '{0}'")]
    InvalidTheme(String),

    /// A cell index outside `0..81`.
    #[error("cell index {0} is out of range (expected 0..81)")]
    IndexOutOfRange(usize),

    /// A registered theme whose accent color does not parse.
    #[error("theme '{theme}' has an unusable color: {source}")]
    ThemeColor {
        /// Theme name
        theme: String,
        /// Why the color was rejected
        source: ColorParseError,
    },
}
