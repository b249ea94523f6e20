//! Rasterization of a document subtree.
//!
//! The [`Rasterizer`] trait is the capture boundary: it clones the live
//! document, hands the clone to a pre-capture hook, then captures the
//! target subtree of the clone. [`SoftwareRasterizer`] is the in-process
//! implementation: boxes are painted into an RGBA buffer, and each text
//! node is recorded as a [`TextRun`] and drawn over them in paint order.
//!
//! Native text areas are captured as boxes only. Their value is part of the
//! platform widget, not of the document's content, so it never reaches the
//! bitmap.

use crate::config::RasterOptions;
use crate::error::RasterError;
use crate::glyph::TextPainter;
use image::{Rgba, RgbaImage};
use mandala_core::Color;
use mandala_dom::{
    layout, wrap_text, ComputedStyle, Display, Document, LayoutMap, NodeId, NodeKind, Rect,
    TextAlign,
};
use tracing::{debug, trace};

/// Default upper bound on captured pixels (4096 × 4096).
pub const DEFAULT_MAX_PIXELS: u64 = 16_777_216;

/// A line-wrapped run of text at its final position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Source text
    pub text: String,
    /// Display lines after wrapping
    pub lines: Vec<String>,
    /// Bounds in output pixels
    pub rect: Rect,
    /// Fill color
    pub color: Color,
    /// Font family list
    pub font_family: String,
    /// Font size in output pixels
    pub font_size: f32,
    /// Numeric font weight
    pub weight: u16,
    /// Line alignment within `rect`
    pub align: TextAlign,
}

/// The result of a capture.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Painted boxes
    pub pixels: RgbaImage,
    /// Text drawn into `pixels`, in paint order
    pub text_runs: Vec<TextRun>,
}

impl Bitmap {
    /// RGBA value at a pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// First text run whose source text is `text`.
    #[must_use]
    pub fn find_text(&self, text: &str) -> Option<&TextRun> {
        self.text_runs.iter().find(|run| run.text == text)
    }
}

/// A capture service for document subtrees.
#[allow(async_fn_in_trait)]
pub trait Rasterizer {
    /// Capture `target` from a clone of `live`.
    ///
    /// `on_clone` runs on the clone before anything is measured; `live` is
    /// never modified.
    async fn rasterize(
        &self,
        live: &Document,
        target: NodeId,
        options: &RasterOptions,
        on_clone: &mut dyn FnMut(&mut Document) -> Result<(), RasterError>,
    ) -> Result<Bitmap, RasterError>;
}

/// Paints boxes and text into an RGBA buffer.
#[derive(Debug, Clone)]
pub struct SoftwareRasterizer {
    max_pixels: u64,
}

impl Default for SoftwareRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareRasterizer {
    /// Create a rasterizer with the default pixel limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    /// Set the pixel limit.
    #[must_use]
    pub const fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    /// The pixel limit.
    #[must_use]
    pub const fn max_pixels(&self) -> u64 {
        self.max_pixels
    }

    /// Capture `target` of `doc` as it is.
    pub fn capture(
        &self,
        doc: &Document,
        target: NodeId,
        options: &RasterOptions,
    ) -> Result<Bitmap, RasterError> {
        if !doc.is_attached(target) {
            return Err(RasterError::TargetDetached);
        }
        let boxes = layout(doc, target)?;
        let bounds = boxes.get(target).ok_or(RasterError::TargetDetached)?;
        let width = (bounds.width * options.scale).ceil().max(0.0) as u32;
        let height = (bounds.height * options.scale).ceil().max(0.0) as u32;
        if u64::from(width) * u64::from(height) > self.max_pixels {
            return Err(RasterError::TooLarge {
                width,
                height,
                max: self.max_pixels,
            });
        }

        let background = options
            .background
            .as_deref()
            .map_or(Color::TRANSPARENT, |value| parse_or(value, Color::TRANSPARENT));
        let mut canvas = Canvas::new(width, height, background);
        let mut painter = TextPainter::new()?;
        let mut text_runs = Vec::new();

        for id in doc.descendants(target) {
            let Some(rect) = boxes.get(id) else {
                continue;
            };
            let node = doc.node(id)?;
            let style = doc.computed_style(id)?;
            match &node.kind {
                NodeKind::Text(text) => {
                    let run = text_run(doc, &boxes, id, text, &style, rect, options.scale)?;
                    if let Some(run) = run {
                        painter.draw(&mut canvas.image, &run);
                        text_runs.push(run);
                    }
                }
                NodeKind::Element(tag) => {
                    if tag == "img" {
                        check_origin(node.attrs.get("src").map(String::as_str), options)?;
                    }
                    canvas.paint_box(rect.scale(options.scale), &style, options.scale);
                }
                NodeKind::TextArea { .. } => {
                    canvas.paint_box(rect.scale(options.scale), &style, options.scale);
                }
            }
        }

        debug!(width, height, runs = text_runs.len(), "captured subtree");
        Ok(Bitmap {
            width,
            height,
            pixels: canvas.into_image(),
            text_runs,
        })
    }
}

impl Rasterizer for SoftwareRasterizer {
    async fn rasterize(
        &self,
        live: &Document,
        target: NodeId,
        options: &RasterOptions,
        on_clone: &mut dyn FnMut(&mut Document) -> Result<(), RasterError>,
    ) -> Result<Bitmap, RasterError> {
        if !live.is_attached(target) {
            return Err(RasterError::TargetDetached);
        }
        let mut clone = live.clone();
        on_clone(&mut clone)?;
        self.capture(&clone, target, options)
    }
}

fn parse_or(value: &str, fallback: Color) -> Color {
    Color::parse_css(value).unwrap_or_else(|e| {
        trace!(value, error = %e, "unsupported color");
        fallback
    })
}

fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//")
}

fn check_origin(src: Option<&str>, options: &RasterOptions) -> Result<(), RasterError> {
    match src {
        Some(src) if is_remote(src) && !options.allow_cross_origin => {
            Err(RasterError::Tainted(src.to_string()))
        }
        _ => Ok(()),
    }
}

/// Wrap a text node the way layout measured it and place it in output
/// pixels.
fn text_run(
    doc: &Document,
    boxes: &LayoutMap,
    id: NodeId,
    text: &str,
    style: &ComputedStyle,
    rect: Rect,
    scale: f32,
) -> Result<Option<TextRun>, RasterError> {
    if text.is_empty() {
        return Ok(None);
    }
    let mut avail = None;
    if let Some(parent) = doc.node(id)?.parent() {
        let parent_style = doc.computed_style(parent)?;
        if matches!(parent_style.display, Display::Block | Display::Flex) {
            avail = boxes
                .get(parent)
                .map(|r| r.inset(parent_style.inset()).width);
        }
    }
    let lines = wrap_text(
        text,
        avail,
        style.font_size,
        style.white_space,
        style.word_wrap,
    );
    Ok(Some(TextRun {
        text: text.to_string(),
        lines,
        rect: rect.scale(scale),
        color: parse_or(&style.color, Color::BLACK),
        font_family: style.font_family.clone(),
        font_size: style.font_size * scale,
        weight: style.font_weight,
        align: style.text_align,
    }))
}

/// RGBA buffer with source-over compositing.
struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(background.to_rgba8())),
        }
    }

    fn paint_box(&mut self, rect: Rect, style: &ComputedStyle, scale: f32) {
        let background = parse_or(&style.background_color, Color::TRANSPARENT);
        if background.a > 0.0 {
            self.fill_rect(rect, background);
        }
        let width = style.border.width * scale;
        if width > 0.0 {
            let color = parse_or(&style.border.color, Color::TRANSPARENT);
            if color.a > 0.0 {
                self.fill_rect(Rect::new(rect.x, rect.y, rect.width, width), color);
                self.fill_rect(
                    Rect::new(rect.x, rect.y + rect.height - width, rect.width, width),
                    color,
                );
                self.fill_rect(Rect::new(rect.x, rect.y, width, rect.height), color);
                self.fill_rect(
                    Rect::new(rect.x + rect.width - width, rect.y, width, rect.height),
                    color,
                );
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let clamp_x = |v: f32| v.round().clamp(0.0, self.image.width() as f32) as u32;
        let clamp_y = |v: f32| v.round().clamp(0.0, self.image.height() as f32) as u32;
        let (x0, x1) = (clamp_x(rect.x), clamp_x(rect.x + rect.width));
        let (y0, y1) = (clamp_y(rect.y), clamp_y(rect.y + rect.height));
        let src = color.to_rgba8();
        for y in y0..y1 {
            for x in x0..x1 {
                let dst = self.image.get_pixel_mut(x, y);
                *dst = Rgba(blend(src, dst.0));
            }
        }
    }

    fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Source-over compositing of straight-alpha RGBA.
pub(crate) fn blend(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    match (src[3], dst[3]) {
        (255, _) | (_, 0) => src,
        (0, _) => dst,
        (sa, da) => {
            let sa = f32::from(sa) / 255.0;
            let da = f32::from(da) / 255.0;
            let out_a = sa + da * (1.0 - sa);
            let mix = |s: u8, d: u8| {
                let c = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
                c.round() as u8
            };
            [
                mix(src[0], dst[0]),
                mix(src[1], dst[1]),
                mix(src[2], dst[2]),
                (out_a * 255.0).round() as u8,
            ]
        }
    }
}
