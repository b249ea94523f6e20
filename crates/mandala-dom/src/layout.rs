//! Box layout for a document subtree.
//!
//! Three modes, matching what the chart markup uses:
//! - **Grid**: children placed row-major into `columns` equal tracks sized
//!   by the largest child, separated by `gap`
//! - **Flex**: children placed along one horizontal axis, honoring
//!   `justify-content` and `align-items`
//! - **Block**: children stacked vertically
//!
//! Boxes without an explicit size shrink-wrap their content. Text is
//! measured with a fixed advance per character, which is enough to place
//! and wrap lines consistently between the live view and an export.

use crate::document::{Document, DomError, NodeId, NodeKind};
use crate::geometry::{Point, Rect, Size};
use crate::style::{BoxSizing, ComputedStyle, Display, FlexAlign, TextAlign, WhiteSpace, WordWrap};
use std::collections::HashMap;

/// Advance of one character, in ems.
pub const CHAR_WIDTH_EM: f32 = 0.5;

/// Line height, in ems.
pub const LINE_HEIGHT_EM: f32 = 1.25;

/// Border-box rectangles of laid-out nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutMap {
    rects: HashMap<NodeId, Rect>,
}

impl LayoutMap {
    /// Rectangle of a node, if it was laid out.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    /// Number of laid-out nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Check if nothing was laid out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Lay out the subtree rooted at `root` with its top-left corner at the origin.
pub fn layout(doc: &Document, root: NodeId) -> Result<LayoutMap, DomError> {
    let mut engine = Engine {
        doc,
        map: LayoutMap::default(),
        styles: HashMap::new(),
    };
    let size = engine.measure(root, None)?;
    engine.place(root, Rect::from_origin_size(Point::ORIGIN, size))?;
    Ok(engine.map)
}

/// Break `text` into display lines no wider than `max_width` pixels.
///
/// `PreWrap` keeps newlines and spaces; `Normal` collapses whitespace.
/// With `BreakWord`, words wider than a line are split; otherwise they
/// overflow on a line of their own.
#[must_use]
pub fn wrap_text(
    text: &str,
    max_width: Option<f32>,
    font_size: f32,
    white_space: WhiteSpace,
    word_wrap: WordWrap,
) -> Vec<String> {
    let paragraphs: Vec<String> = match white_space {
        WhiteSpace::PreWrap => text.split('\n').map(str::to_string).collect(),
        WhiteSpace::Normal => vec![text.split_whitespace().collect::<Vec<_>>().join(" ")],
    };
    let Some(max_width) = max_width else {
        return paragraphs;
    };
    let max_chars = ((max_width / (font_size * CHAR_WIDTH_EM)).floor() as usize).max(1);

    let mut lines = Vec::new();
    for paragraph in paragraphs {
        let mut line = String::new();
        // a line has started once it holds a word, even an empty one
        let mut started = false;
        for word in paragraph.split(' ') {
            let mut word = word.to_string();
            let joined = line.chars().count() + 1 + word.chars().count();
            if started && joined > max_chars {
                lines.push(std::mem::take(&mut line));
                started = false;
            }
            if word_wrap == WordWrap::BreakWord {
                while word.chars().count() > max_chars {
                    let head: String = word.chars().take(max_chars).collect();
                    word = word.chars().skip(max_chars).collect();
                    if started {
                        lines.push(std::mem::take(&mut line));
                        started = false;
                    }
                    lines.push(head);
                }
            }
            if started {
                line.push(' ');
            }
            line.push_str(&word);
            started = true;
        }
        lines.push(line);
    }
    lines
}

/// Pixel size of wrapped lines.
#[must_use]
pub fn text_size(lines: &[String], font_size: f32) -> Size {
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    Size::new(
        longest as f32 * font_size * CHAR_WIDTH_EM,
        lines.len() as f32 * font_size * LINE_HEIGHT_EM,
    )
}

struct Engine<'a> {
    doc: &'a Document,
    map: LayoutMap,
    styles: HashMap<NodeId, ComputedStyle>,
}

impl Engine<'_> {
    fn style(&mut self, id: NodeId) -> Result<ComputedStyle, DomError> {
        if let Some(style) = self.styles.get(&id) {
            return Ok(style.clone());
        }
        let style = self.doc.computed_style(id)?;
        self.styles.insert(id, style.clone());
        Ok(style)
    }

    /// Border-box size of a node; `avail` is the content width of its parent
    /// when that is fixed.
    fn measure(&mut self, id: NodeId, avail: Option<f32>) -> Result<Size, DomError> {
        let doc = self.doc;
        let node = doc.node(id)?;
        let style = self.style(id)?;
        if let NodeKind::Text(text) = &node.kind {
            let lines = wrap_text(text, avail, style.font_size, style.white_space, style.word_wrap);
            return Ok(text_size(&lines, style.font_size));
        }

        let inset = style.inset();
        let outer = |specified: f32| match style.box_sizing {
            BoxSizing::BorderBox => specified,
            BoxSizing::ContentBox => specified + 2.0 * inset,
        };
        let inner_avail = style
            .width
            .map(|w| (outer(w) - 2.0 * inset).max(0.0))
            .or_else(|| avail.map(|a| (a - 2.0 * inset).max(0.0)));

        let content = self.measure_content(id, &style, inner_avail)?;
        Ok(Size::new(
            style.width.map_or(content.width + 2.0 * inset, outer),
            style.height.map_or(content.height + 2.0 * inset, outer),
        ))
    }

    fn measure_content(
        &mut self,
        id: NodeId,
        style: &ComputedStyle,
        avail: Option<f32>,
    ) -> Result<Size, DomError> {
        let children = self.doc.node(id)?.children().to_vec();
        if children.is_empty() {
            return Ok(Size::ZERO);
        }
        let child_avail = match style.display {
            Display::Block | Display::Flex => avail,
            Display::Grid => None,
        };
        let sizes = children
            .iter()
            .map(|c| self.measure(*c, child_avail))
            .collect::<Result<Vec<_>, _>>()?;
        let max_w = sizes.iter().map(|s| s.width).fold(0.0, f32::max);
        let max_h = sizes.iter().map(|s| s.height).fold(0.0, f32::max);
        let gaps = |n: usize| style.gap * n.saturating_sub(1) as f32;

        Ok(match style.display {
            Display::Grid => {
                let cols = usize::from(style.columns.max(1)).min(sizes.len());
                let rows = sizes.len().div_ceil(cols);
                Size::new(
                    cols as f32 * max_w + gaps(cols),
                    rows as f32 * max_h + gaps(rows),
                )
            }
            Display::Flex => Size::new(
                sizes.iter().map(|s| s.width).sum::<f32>() + gaps(sizes.len()),
                max_h,
            ),
            Display::Block => Size::new(max_w, sizes.iter().map(|s| s.height).sum()),
        })
    }

    fn place(&mut self, id: NodeId, rect: Rect) -> Result<(), DomError> {
        self.map.rects.insert(id, rect);
        let style = self.style(id)?;
        let content = rect.inset(style.inset());
        let children = self.doc.node(id)?.children().to_vec();
        if children.is_empty() {
            return Ok(());
        }
        let child_avail = match style.display {
            Display::Block | Display::Flex => Some(content.width),
            Display::Grid => None,
        };
        let sizes = children
            .iter()
            .map(|c| self.measure(*c, child_avail))
            .collect::<Result<Vec<_>, _>>()?;

        match style.display {
            Display::Grid => {
                let cols = usize::from(style.columns.max(1)).min(sizes.len());
                let track_w = sizes.iter().map(|s| s.width).fold(0.0, f32::max);
                let track_h = sizes.iter().map(|s| s.height).fold(0.0, f32::max);
                for (i, (child, size)) in children.iter().zip(&sizes).enumerate() {
                    let (col, row) = ((i % cols) as f32, (i / cols) as f32);
                    let origin = Point::new(
                        content.x + col * (track_w + style.gap),
                        content.y + row * (track_h + style.gap),
                    );
                    self.place(*child, Rect::from_origin_size(origin, *size))?;
                }
            }
            Display::Flex => {
                let total = sizes.iter().map(|s| s.width).sum::<f32>()
                    + style.gap * sizes.len().saturating_sub(1) as f32;
                let mut x = content.x + align_offset(style.justify_content, content.width, total);
                for (child, size) in children.iter().zip(&sizes) {
                    let y =
                        content.y + align_offset(style.align_items, content.height, size.height);
                    self.place(*child, Rect::new(x, y, size.width, size.height))?;
                    x += size.width + style.gap;
                }
            }
            Display::Block => {
                let mut y = content.y;
                for (child, size) in children.iter().zip(&sizes) {
                    let x = if matches!(self.doc.node(*child)?.kind, NodeKind::Text(_)) {
                        content.x + text_align_offset(style.text_align, content.width, size.width)
                    } else {
                        content.x
                    };
                    self.place(*child, Rect::new(x, y, size.width, size.height))?;
                    y += size.height;
                }
            }
        }
        Ok(())
    }
}

fn align_offset(align: FlexAlign, space: f32, used: f32) -> f32 {
    match align {
        FlexAlign::Start => 0.0,
        FlexAlign::Center => (space - used) / 2.0,
        FlexAlign::End => space - used,
    }
}

fn text_align_offset(align: TextAlign, space: f32, used: f32) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => ((space - used) / 2.0).max(0.0),
        TextAlign::Right => (space - used).max(0.0),
    }
}
