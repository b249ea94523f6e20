//! Rendering of a [`Session`] into a [`Document`].
//!
//! The markup mirrors the chart application: a sidebar with the theme
//! selector and export button, and the grid container holding the
//! `interactive-grid` (nine `major-cell` blocks of nine `minor-cell` text
//! areas each). Theme colors are written as inline styles, so structural
//! cells can be told apart from plain ones by their inline background.

use crate::document::{Document, DomError, NodeId, NodeKind, NodeRef};
use crate::style::{Style, Stylesheet};
use mandala_core::{classify, CellKind, GridError, Message, Session, Theme, CELL_COUNT, GRID_SIZE};
use thiserror::Error;
use tracing::trace;

/// Class marker of the grid root.
pub const GRID_MARKER: &str = "interactive-grid";
/// Class marker of each 3×3 block.
pub const BLOCK_CLASS: &str = "major-cell";
/// Class marker of each editable cell.
pub const CELL_CLASS: &str = "minor-cell";
/// Extra class marker of the core-goal cell.
pub const CORE_GOAL_CLASS: &str = "core-goal";

/// Attribute carrying a cell's index.
pub const CELL_INDEX_ATTR: &str = "data-cell-index";
/// Attribute carrying a theme button's theme name.
pub const THEME_ATTR: &str = "data-theme";
/// Attribute marking action buttons.
pub const ACTION_ATTR: &str = "data-action";

/// Errors from rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The session could not produce a cell style.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Tree construction failed.
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// A rendered application and the handle of its grid subtree.
#[derive(Debug, Clone)]
pub struct RenderedApp {
    document: Document,
    grid: NodeRef,
}

impl RenderedApp {
    /// The rendered document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Handle of the `interactive-grid` node.
    #[must_use]
    pub const fn grid(&self) -> NodeRef {
        self.grid
    }

    /// The grid as an export target.
    #[must_use]
    pub const fn target(&self) -> GridTarget<'_> {
        GridTarget {
            document: &self.document,
            grid: self.grid,
        }
    }

    /// Text area node of cell `index`.
    #[must_use]
    pub fn cell_node(&self, index: usize) -> Option<NodeId> {
        let root = self.document.resolve(self.grid)?;
        self.document
            .query_attr(root, CELL_INDEX_ATTR, &index.to_string())
    }
}

/// A live document plus the handle of the grid inside it.
#[derive(Debug, Clone, Copy)]
pub struct GridTarget<'a> {
    /// The live document; never mutated through this target
    pub document: &'a Document,
    /// Handle to the grid root
    pub grid: NodeRef,
}

impl GridTarget<'_> {
    /// The grid node, if the handle belongs to this document and is attached.
    #[must_use]
    pub fn resolve(&self) -> Option<NodeId> {
        self.document.resolve(self.grid)
    }
}

/// Render a session with the default stylesheet.
pub fn render(session: &Session) -> Result<RenderedApp, RenderError> {
    render_with(session, Stylesheet::default())
}

/// Render a session with a custom stylesheet.
pub fn render_with(session: &Session, stylesheet: Stylesheet) -> Result<RenderedApp, RenderError> {
    let mut doc = Document::new(stylesheet);
    let theme = session.theme();

    let app = element(&mut doc, "div", &["app"])?;
    doc.set_root(app)?;

    let sidebar = element(&mut doc, "aside", &["sidebar"])?;
    doc.append_child(app, sidebar)?;
    let title = text_element(&mut doc, "h1", &["header-title"], "Mandala.io")?;
    doc.append_child(sidebar, title)?;
    let selector = render_theme_selector(&mut doc, theme)?;
    doc.append_child(sidebar, selector)?;
    let export = text_element(&mut doc, "button", &["export-button"], "Export as Image")?;
    doc.set_attr(export, ACTION_ATTR, "export")?;
    let export_section = element(&mut doc, "div", &["export-section"])?;
    doc.append_child(export_section, export)?;
    doc.append_child(sidebar, export_section)?;

    let container = element(&mut doc, "section", &["grid-container"])?;
    doc.append_child(app, container)?;
    let grid = render_grid(&mut doc, session)?;
    doc.append_child(container, grid)?;
    let footer = text_element(
        &mut doc,
        "p",
        &["grid-footer"],
        "Click any cell to start planning. The center cell is your core goal.",
    )?;
    doc.append_child(container, footer)?;

    trace!(theme = theme.name, nodes = doc.len(), "rendered session");
    let grid = doc.node_ref(grid);
    Ok(RenderedApp {
        document: doc,
        grid,
    })
}

fn render_theme_selector(doc: &mut Document, active: &Theme) -> Result<NodeId, RenderError> {
    let selector = element(doc, "div", &["theme-selector"])?;
    let heading = text_element(doc, "h3", &[], "Choose Your Theme")?;
    doc.append_child(selector, heading)?;
    let buttons = element(doc, "div", &["theme-buttons"])?;
    doc.append_child(selector, buttons)?;

    for theme in Theme::all() {
        let classes: &[&str] = if theme == active {
            &["theme-button", "active"]
        } else {
            &["theme-button"]
        };
        let button = element(doc, "button", classes)?;
        doc.set_attr(button, THEME_ATTR, theme.name)?;
        let swatch = element(doc, "span", &["theme-color"])?;
        doc.node_mut(swatch)?.style.background_color = Some(theme.color.to_string());
        doc.append_child(button, swatch)?;
        let label = doc.create_text(theme.name);
        doc.append_child(button, label)?;
        doc.append_child(buttons, button)?;
    }
    Ok(selector)
}

fn render_grid(doc: &mut Document, session: &Session) -> Result<NodeId, RenderError> {
    let theme = session.theme();
    let grid = element(doc, "div", &[GRID_MARKER])?;
    doc.node_mut(grid)?.style.border_color = Some(theme.color.to_string());

    for block_index in 0..GRID_SIZE {
        let block = element(doc, "div", &[BLOCK_CLASS])?;
        doc.node_mut(block)?.style.border_color = Some(theme.color.to_string());
        doc.append_child(grid, block)?;
        for index in block_index * GRID_SIZE..(block_index + 1) * GRID_SIZE {
            let cell = render_cell(doc, session, index)?;
            doc.append_child(block, cell)?;
        }
    }
    Ok(grid)
}

fn render_cell(doc: &mut Document, session: &Session, index: usize) -> Result<NodeId, RenderError> {
    let kind = classify(index);
    let value = session.grid().get(index).unwrap_or_default();
    let cell = doc.create_text_area(value, kind.placeholder());
    doc.add_class(cell, CELL_CLASS)?;
    if kind == CellKind::CoreGoal {
        doc.add_class(cell, CORE_GOAL_CLASS)?;
    }
    let colors = session.cell_style(index)?;
    doc.node_mut(cell)?.style = Style {
        background_color: colors.background,
        color: colors.foreground,
        ..Style::default()
    };
    doc.set_attr(cell, "aria-label", format!("Grid Cell {}", index + 1))?;
    doc.set_attr(cell, CELL_INDEX_ATTR, index.to_string())?;
    Ok(cell)
}

fn element(doc: &mut Document, tag: &str, classes: &[&str]) -> Result<NodeId, DomError> {
    let id = doc.create_element(tag);
    for class in classes {
        doc.add_class(id, class)?;
    }
    Ok(id)
}

fn text_element(
    doc: &mut Document,
    tag: &str,
    classes: &[&str],
    text: &str,
) -> Result<NodeId, DomError> {
    let id = element(doc, tag, classes)?;
    let text = doc.create_text(text);
    doc.append_child(id, text)?;
    Ok(id)
}

/// Holds the most recent render and turns view events into [`Message`]s.
#[derive(Debug, Default)]
pub struct Renderer {
    current: Option<RenderedApp>,
}

impl Renderer {
    /// Create a renderer that has not rendered yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Re-render from the session, replacing the previous tree.
    pub fn render(&mut self, session: &Session) -> Result<&RenderedApp, RenderError> {
        Ok(&*self.current.insert(render(session)?))
    }

    /// The most recent render.
    #[must_use]
    pub const fn current(&self) -> Option<&RenderedApp> {
        self.current.as_ref()
    }

    /// Export target for the current grid; `None` before the first render.
    #[must_use]
    pub fn grid_target(&self) -> Option<GridTarget<'_>> {
        self.current.as_ref().map(RenderedApp::target)
    }

    /// Translate an edit of `node` into a message.
    #[must_use]
    pub fn input(&self, node: NodeId, text: &str) -> Option<Message> {
        let doc = self.current.as_ref()?.document();
        if !doc.node(node).ok()?.is_text_area() {
            return None;
        }
        let index: usize = doc.attr(node, CELL_INDEX_ATTR)?.parse().ok()?;
        (index < CELL_COUNT).then(|| Message::CellChanged {
            index,
            text: text.to_string(),
        })
    }

    /// Translate a click on `node` (or inside a button) into a message.
    #[must_use]
    pub fn click(&self, node: NodeId) -> Option<Message> {
        let doc = self.current.as_ref()?.document();
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(name) = doc.attr(id, THEME_ATTR) {
                return Some(Message::ThemeSelected(name.to_string()));
            }
            if doc.attr(id, ACTION_ATTR) == Some("export") {
                return Some(Message::ExportRequested);
            }
            current = doc.node(id).ok()?.parent();
        }
        None
    }
}

/// Number of editable cells under `root`.
#[must_use]
pub fn count_text_areas(doc: &Document, root: NodeId) -> usize {
    doc.find_all(root, |n| matches!(n.kind, NodeKind::TextArea { .. }))
        .len()
}
