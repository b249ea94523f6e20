//! Integration tests for mandala-dom.
//!
//! Render a session, then check the tree, the cascade and the layout the
//! export path depends on.

use mandala_core::{Session, CELL_COUNT, CORE_GOAL_INDEX};
use mandala_dom::{
    layout, render, BoxSizing, Point, Rect, Renderer, TextAlign, CELL_CLASS, GRID_MARKER,
};

fn forest() -> Session {
    let mut session = Session::new();
    session.select_theme("Forest").unwrap();
    session.set_cell(CORE_GOAL_INDEX, "Learn Rust").unwrap();
    session
}

// =============================================================================
// Tree
// =============================================================================

#[test]
fn test_single_grid_marker() {
    let app = render(&forest()).unwrap();
    let doc = app.document();
    let root = doc.root().unwrap();
    let grids = doc.find_all(root, |n| n.has_class(GRID_MARKER));
    assert_eq!(grids.len(), 1);
    assert_eq!(Some(grids[0]), doc.resolve(app.grid()));
    assert_eq!(doc.find_all(root, |n| n.has_class(CELL_CLASS)).len(), CELL_COUNT);
}

#[test]
fn test_grid_carries_theme_border() {
    let app = render(&forest()).unwrap();
    let doc = app.document();
    let grid = doc.resolve(app.grid()).unwrap();
    let style = doc.computed_style(grid).unwrap();
    assert_eq!(style.border.width, 3.0);
    assert_eq!(style.border.color, "#28a745");
}

#[test]
fn test_footer_and_sidebar_text() {
    let app = render(&Session::new()).unwrap();
    let doc = app.document();
    let text = doc.text_content(doc.root().unwrap());
    assert!(text.starts_with("Mandala.io"));
    assert!(text.contains("Choose Your Theme"));
    assert!(text.contains("Export as Image"));
    assert!(text.ends_with("The center cell is your core goal."));
}

// =============================================================================
// Cascade
// =============================================================================

#[test]
fn test_core_goal_computed_style() {
    let app = render(&forest()).unwrap();
    let doc = app.document();
    let core = app.cell_node(CORE_GOAL_INDEX).unwrap();
    let style = doc.computed_style(core).unwrap();
    assert_eq!(style.width, Some(72.0));
    assert_eq!(style.font_size, 14.0);
    assert_eq!(style.font_weight, 700);
    assert_eq!(style.color, "white");
    assert_eq!(style.background_color, "#186429");
    assert_eq!(style.text_align, TextAlign::Center);
    assert_eq!(style.box_sizing, BoxSizing::BorderBox);
}

#[test]
fn test_plain_cell_has_no_background() {
    let app = render(&forest()).unwrap();
    let doc = app.document();
    let style = doc.computed_style(app.cell_node(0).unwrap()).unwrap();
    assert_eq!(style.background_color, "transparent");
    assert_eq!(style.color, "#212529");
    assert_eq!(style.font_size, 12.0);
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn test_grid_layout_geometry() {
    let app = render(&forest()).unwrap();
    let doc = app.document();
    let grid = doc.resolve(app.grid()).unwrap();
    let map = layout(doc, grid).unwrap();

    // 3 blocks of (3 * 72 + 2 * 2 + 2 * 4) plus 2 gaps of 6, padding 6, border 3
    assert_eq!(map.get(grid), Some(Rect::new(0.0, 0.0, 714.0, 714.0)));

    let core = map.get(app.cell_node(CORE_GOAL_INDEX).unwrap()).unwrap();
    assert_eq!(core, Rect::new(321.0, 321.0, 72.0, 72.0));
    assert_eq!(core.center(), Point::new(357.0, 357.0));

    let first = map.get(app.cell_node(0).unwrap()).unwrap();
    assert_eq!(first, Rect::new(13.0, 13.0, 72.0, 72.0));
    let last = map.get(app.cell_node(CELL_COUNT - 1).unwrap()).unwrap();
    assert_eq!(last, Rect::new(629.0, 629.0, 72.0, 72.0));
}

#[test]
fn test_renderer_round_trip_through_session() {
    let mut session = Session::new();
    let mut renderer = Renderer::new();
    renderer.render(&session).unwrap();

    let cell = renderer.current().unwrap().cell_node(22).unwrap();
    let msg = renderer.input(cell, "Focus").unwrap();
    session.update(msg).unwrap();

    let app = renderer.render(&session).unwrap();
    let doc = app.document();
    assert_eq!(doc.text_content(app.cell_node(22).unwrap()), "Focus");
}
