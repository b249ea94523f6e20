#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
//! Document model and view for Mandala charts.
//!
//! - [`Document`]: an arena tree of elements, text areas and text runs
//! - [`Stylesheet`] and [`ComputedStyle`]: class rules plus inline overrides
//! - [`layout()`]: block, flex and grid placement of a subtree
//! - [`render`] and [`Renderer`]: the chart markup for a [`mandala_core::Session`]

mod document;
mod geometry;
mod layout;
mod style;
mod view;

pub use document::{Document, DomError, Node, NodeId, NodeKind, NodeRef};
pub use geometry::{Point, Rect, Size};
pub use layout::{layout, text_size, wrap_text, LayoutMap, CHAR_WIDTH_EM, LINE_HEIGHT_EM};
pub use style::{
    Border, BoxSizing, ComputedStyle, Display, FlexAlign, Style, Stylesheet, TextAlign, WhiteSpace,
    WordWrap,
};
pub use view::{
    count_text_areas, render, render_with, GridTarget, RenderError, RenderedApp, Renderer,
    ACTION_ATTR, BLOCK_CLASS, CELL_CLASS, CELL_INDEX_ATTR, CORE_GOAL_CLASS, GRID_MARKER,
    THEME_ATTR,
};
