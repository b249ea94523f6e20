//! Glyph rasterization for captured text.
//!
//! Text runs are drawn with the bundled DejaVu Sans faces; weights of 600
//! and above use the bold face. Lines keep the positions layout gave the
//! run and are aligned inside its rectangle by their real advance width.

use crate::error::RasterError;
use crate::raster::{blend, TextRun};
use fontdue::{Font, FontSettings, Metrics};
use image::{Rgba, RgbaImage};
use mandala_dom::{TextAlign, LINE_HEIGHT_EM};
use std::collections::HashMap;
use std::sync::OnceLock;

static REGULAR: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
static BOLD: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

const BOLD_WEIGHT: u16 = 600;

/// Rasterized glyphs keyed by (char, font size bits, bold).
type GlyphCache = HashMap<(char, u32, bool), (Metrics, Vec<u8>)>;

struct FontSet {
    regular: Font,
    bold: Font,
}

impl FontSet {
    const fn face(&self, bold: bool) -> &Font {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }
}

fn fonts() -> Result<&'static FontSet, RasterError> {
    static FONTS: OnceLock<Result<FontSet, String>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let load = |bytes: &'static [u8]| {
                Font::from_bytes(bytes, FontSettings::default()).map_err(|e| e.to_string())
            };
            Ok(FontSet {
                regular: load(REGULAR)?,
                bold: load(BOLD)?,
            })
        })
        .as_ref()
        .map_err(|e| RasterError::Font(e.clone()))
}

/// Draws [`TextRun`]s into an RGBA buffer.
pub(crate) struct TextPainter {
    fonts: &'static FontSet,
    cache: GlyphCache,
}

impl TextPainter {
    pub(crate) fn new() -> Result<Self, RasterError> {
        Ok(Self {
            fonts: fonts()?,
            cache: HashMap::new(),
        })
    }

    pub(crate) fn draw(&mut self, image: &mut RgbaImage, run: &TextRun) {
        let bold = run.weight >= BOLD_WEIGHT;
        let size = run.font_size;
        let line_height = size * LINE_HEIGHT_EM;
        let (ascent, descent) = self
            .fonts
            .face(bold)
            .horizontal_line_metrics(size)
            .map_or((size * 0.8, -size * 0.2), |m| (m.ascent, m.descent));
        let leading = (line_height - (ascent - descent)) / 2.0;
        let color = run.color.to_rgba8();

        for (i, line) in run.lines.iter().enumerate() {
            let width = self.measure(line, size, bold);
            let x = match run.align {
                TextAlign::Left => run.rect.x,
                TextAlign::Center => run.rect.x + (run.rect.width - width) / 2.0,
                TextAlign::Right => run.rect.x + run.rect.width - width,
            };
            let baseline = run.rect.y + i as f32 * line_height + leading + ascent;
            self.draw_line(image, line, (x, baseline), size, bold, color);
        }
    }

    fn glyph(&mut self, ch: char, size: f32, bold: bool) -> &(Metrics, Vec<u8>) {
        let fonts = self.fonts;
        self.cache
            .entry((ch, size.to_bits(), bold))
            .or_insert_with(|| fonts.face(bold).rasterize(ch, size))
    }

    fn measure(&mut self, line: &str, size: f32, bold: bool) -> f32 {
        line.chars()
            .map(|ch| self.glyph(ch, size, bold).0.advance_width)
            .sum()
    }

    fn draw_line(
        &mut self,
        image: &mut RgbaImage,
        line: &str,
        (mut pen, baseline): (f32, f32),
        size: f32,
        bold: bool,
        color: [u8; 4],
    ) {
        let (width, height) = (image.width() as f32, image.height() as f32);
        for ch in line.chars() {
            let (metrics, coverage) = self.glyph(ch, size, bold);
            let left = (pen + metrics.xmin as f32).round();
            let top = (baseline - metrics.height as f32 - metrics.ymin as f32).round();
            pen += metrics.advance_width;
            if metrics.width == 0 {
                continue;
            }
            for (row, cells) in coverage.chunks(metrics.width).enumerate() {
                let y = top + row as f32;
                if y < 0.0 || y >= height {
                    continue;
                }
                for (col, &c) in cells.iter().enumerate() {
                    let x = left + col as f32;
                    if c == 0 || x < 0.0 || x >= width {
                        continue;
                    }
                    let alpha = (u16::from(c) * u16::from(color[3]) / 255) as u8;
                    let src = [color[0], color[1], color[2], alpha];
                    let dst = image.get_pixel_mut(x as u32, y as u32);
                    *dst = Rgba(blend(src, dst.0));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandala_core::Color;
    use mandala_dom::Rect;

    fn run(text: &str, weight: u16, align: TextAlign) -> TextRun {
        TextRun {
            text: text.to_string(),
            lines: vec![text.to_string()],
            rect: Rect::new(0.0, 0.0, 100.0, 25.0),
            color: Color::WHITE,
            font_family: "sans-serif".into(),
            font_size: 20.0,
            weight,
            align,
        }
    }

    fn inked(image: &RgbaImage) -> Vec<u32> {
        image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[3] > 0)
            .map(|(x, _, _)| x)
            .collect()
    }

    #[test]
    fn test_fonts_load() {
        assert!(fonts().is_ok());
    }

    #[test]
    fn test_draw_inks_inside_rect() {
        let mut image = RgbaImage::new(100, 25);
        TextPainter::new()
            .unwrap()
            .draw(&mut image, &run("Hi", 400, TextAlign::Left));
        let xs = inked(&image);
        assert!(!xs.is_empty());
        assert!(image.pixels().any(|p| p.0 == [255, 255, 255, 255]));
        assert!(xs.iter().all(|&x| x < 40));
    }

    #[test]
    fn test_center_alignment_shifts_ink() {
        let mut left = RgbaImage::new(100, 25);
        let mut center = RgbaImage::new(100, 25);
        let mut painter = TextPainter::new().unwrap();
        painter.draw(&mut left, &run("Hi", 400, TextAlign::Left));
        painter.draw(&mut center, &run("Hi", 400, TextAlign::Center));
        let min = |xs: Vec<u32>| xs.into_iter().min().unwrap();
        assert!(min(inked(&center)) > min(inked(&left)) + 20);
    }

    #[test]
    fn test_bold_inks_more() {
        let mut painter = TextPainter::new().unwrap();
        let mut regular = RgbaImage::new(100, 25);
        let mut bold = RgbaImage::new(100, 25);
        painter.draw(&mut regular, &run("Goal", 400, TextAlign::Left));
        painter.draw(&mut bold, &run("Goal", 700, TextAlign::Left));
        assert!(inked(&bold).len() > inked(&regular).len());
    }

    #[test]
    fn test_space_has_no_ink() {
        let mut image = RgbaImage::new(100, 25);
        TextPainter::new()
            .unwrap()
            .draw(&mut image, &run("   ", 400, TextAlign::Left));
        assert!(inked(&image).is_empty());
    }
}
