//! Core types for Mandala chart planning.
//!
//! This crate provides the pieces that do not depend on any rendering:
//! - Color math: [`Color`], [`Rgb`], [`darken`]
//! - The fixed theme registry: [`Theme`], [`THEMES`]
//! - The 81-cell grid and its structural classification: [`Grid`], [`classify`]
//! - Owned session state driven by [`Message`]s: [`Session`]

mod color;
mod error;
pub mod grid;
mod state;
mod theme;

pub use color::{darken, normalize, Color, ColorParseError, Rgb};
pub use error::GridError;
pub use grid::{
    cell_style, classify, major_block, minor_offset, try_classify, CellKind, CellStyle, Grid,
    CELL_COUNT, CORE_GOAL_INDEX, GRID_SIZE, SUB_GOAL_INDICES,
};
pub use state::{Command, Message, Session};
pub use theme::{Theme, CORE_GOAL_DARKEN_PERCENT, CORE_GOAL_FOREGROUND, THEMES};
