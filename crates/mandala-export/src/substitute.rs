//! Replacement of editable cells by static, style-matched elements.
//!
//! Runs as the pre-capture hook, on the rasterizer's clone of the live
//! document. Each text area under the grid marker is swapped for a `div`
//! that carries the same classes and attributes, the cell's value as a text
//! child, and an inline copy of the cell's resolved box and font styles.

use crate::config::ExportConfig;
use mandala_dom::{
    layout, BoxSizing, ComputedStyle, Display, Document, DomError, FlexAlign, Node, NodeId,
    NodeKind, Rect, Style, WhiteSpace, WordWrap,
};
use tracing::{debug, warn};

/// Swap every text area under the grid marker for a static cell.
///
/// Returns the number of cells replaced. A document without the marker is
/// left alone and yields zero.
pub fn substitute_static_cells(
    cloned: &mut Document,
    config: &ExportConfig,
) -> Result<usize, DomError> {
    let Some(grid) = cloned
        .root()
        .and_then(|root| cloned.query_class(root, &config.grid_marker))
    else {
        warn!(marker = %config.grid_marker, "grid marker not found in cloned document");
        return Ok(0);
    };

    let boxes = layout(cloned, grid)?;
    let cells = cloned.find_all(grid, Node::is_text_area);
    for &cell in &cells {
        let parent = cloned.node(cell)?.parent().ok_or(DomError::Detached(cell))?;
        let replacement = static_cell(cloned, cell, boxes.get(cell), config)?;
        cloned.replace_child(parent, replacement, cell)?;
    }
    debug!(count = cells.len(), "substituted static cells");
    Ok(cells.len())
}

fn static_cell(
    doc: &mut Document,
    cell: NodeId,
    border_box: Option<Rect>,
    config: &ExportConfig,
) -> Result<NodeId, DomError> {
    let computed = doc.computed_style(cell)?;
    let original = doc.node(cell)?;
    let value = match &original.kind {
        NodeKind::TextArea { value, .. } => value.clone(),
        NodeKind::Element(_) | NodeKind::Text(_) => String::new(),
    };
    let classes = original.classes.clone();
    let attrs = original.attrs.clone();
    let background = original
        .style
        .background_color
        .clone()
        .unwrap_or_else(|| config.fallback_cell_background.clone());

    let (width, height) = resolved_size(&computed, border_box);
    let style = Style {
        width,
        height,
        padding: Some(computed.padding),
        border: Some(computed.border),
        font_family: Some(computed.font_family),
        font_size: Some(computed.font_size),
        font_weight: Some(computed.font_weight),
        color: Some(computed.color),
        text_align: Some(computed.text_align),
        box_sizing: Some(computed.box_sizing),
        background_color: Some(background),
        white_space: Some(WhiteSpace::PreWrap),
        word_wrap: Some(WordWrap::BreakWord),
        display: Some(Display::Flex),
        justify_content: Some(FlexAlign::Center),
        align_items: Some(FlexAlign::Center),
        ..Style::default()
    };

    let div = doc.create_element("div");
    let node = doc.node_mut(div)?;
    node.classes = classes;
    node.attrs = attrs;
    node.style = style;
    let text = doc.create_text(value);
    doc.append_child(div, text)?;
    Ok(div)
}

/// Width and height in the cell's own box model, falling back to the laid
/// out border box for auto-sized cells.
fn resolved_size(computed: &ComputedStyle, border_box: Option<Rect>) -> (Option<f32>, Option<f32>) {
    let from_layout = |outer: f32| match computed.box_sizing {
        BoxSizing::BorderBox => outer,
        BoxSizing::ContentBox => (outer - 2.0 * computed.inset()).max(0.0),
    };
    (
        computed.width.or_else(|| border_box.map(|r| from_layout(r.width))),
        computed.height.or_else(|| border_box.map(|r| from_layout(r.height))),
    )
}
