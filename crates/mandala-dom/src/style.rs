//! Authored styles, class stylesheets and computed styles.
//!
//! Styling follows the cascade the chart needs and nothing more: built-in
//! defaults, then inherited text properties from the parent, then class
//! rules in stylesheet order, then the node's inline style.

use serde::{Deserialize, Serialize};

/// Box generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Display {
    /// Children stack vertically
    #[default]
    Block,
    /// Children are placed row-major into `columns` equal tracks
    Grid,
    /// Children are laid out along a single horizontal axis
    Flex,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    /// Left aligned
    #[default]
    Left,
    /// Centered
    Center,
    /// Right aligned
    Right,
}

/// Whether `width`/`height` include padding and border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoxSizing {
    /// Size is the content box
    #[default]
    ContentBox,
    /// Size is the border box
    BorderBox,
}

/// Whitespace handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WhiteSpace {
    /// Collapse runs of whitespace, wrap at word boundaries
    #[default]
    Normal,
    /// Keep whitespace and newlines, wrap long lines
    PreWrap,
}

/// Whether words longer than a line may be split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WordWrap {
    /// Overlong words overflow
    #[default]
    Normal,
    /// Overlong words are broken
    BreakWord,
}

/// Main/cross axis alignment for flex containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlexAlign {
    /// Pack at the start
    #[default]
    Start,
    /// Center
    Center,
    /// Pack at the end
    End,
}

/// A uniform border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    /// Width in pixels
    pub width: f32,
    /// CSS color
    pub color: String,
}

impl Border {
    /// Create a solid border.
    #[must_use]
    pub fn solid(width: f32, color: impl Into<String>) -> Self {
        Self {
            width,
            color: color.into(),
        }
    }

    /// No border.
    #[must_use]
    pub fn none() -> Self {
        Self::solid(0.0, "transparent")
    }
}

/// Authored style: every property is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Box width in pixels
    pub width: Option<f32>,
    /// Box height in pixels
    pub height: Option<f32>,
    /// Uniform padding in pixels
    pub padding: Option<f32>,
    /// Border shorthand
    pub border: Option<Border>,
    /// Border color override
    pub border_color: Option<String>,
    /// Font family list
    pub font_family: Option<String>,
    /// Font size in pixels
    pub font_size: Option<f32>,
    /// Numeric font weight
    pub font_weight: Option<u16>,
    /// Text color
    pub color: Option<String>,
    /// Text alignment
    pub text_align: Option<TextAlign>,
    /// Box sizing model
    pub box_sizing: Option<BoxSizing>,
    /// Background color
    pub background_color: Option<String>,
    /// Whitespace handling
    pub white_space: Option<WhiteSpace>,
    /// Word breaking
    pub word_wrap: Option<WordWrap>,
    /// Display mode
    pub display: Option<Display>,
    /// Main-axis alignment
    pub justify_content: Option<FlexAlign>,
    /// Cross-axis alignment
    pub align_items: Option<FlexAlign>,
    /// Gap between children
    pub gap: Option<f32>,
    /// Grid column count
    pub columns: Option<u16>,
}

macro_rules! overlay {
    ($target:expr, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$source.$field {
                $target.$field = Some(value.clone());
            }
        )+
    };
}

impl Style {
    /// Overlay every property set in `other` onto `self`.
    pub fn merge(&mut self, other: &Self) {
        overlay!(
            self,
            other,
            width,
            height,
            padding,
            border,
            border_color,
            font_family,
            font_size,
            font_weight,
            color,
            text_align,
            box_sizing,
            background_color,
            white_space,
            word_wrap,
            display,
            justify_content,
            align_items,
            gap,
            columns,
        );
    }

    /// Check whether no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fully resolved style of a node.
///
/// `width` and `height` stay `None` for auto-sized boxes; layout resolves
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyle {
    /// Box width, `None` when auto
    pub width: Option<f32>,
    /// Box height, `None` when auto
    pub height: Option<f32>,
    /// Uniform padding
    pub padding: f32,
    /// Border with any color override applied
    pub border: Border,
    /// Font family list
    pub font_family: String,
    /// Font size in pixels
    pub font_size: f32,
    /// Numeric font weight
    pub font_weight: u16,
    /// Text color
    pub color: String,
    /// Text alignment
    pub text_align: TextAlign,
    /// Box sizing model
    pub box_sizing: BoxSizing,
    /// Background color
    pub background_color: String,
    /// Whitespace handling
    pub white_space: WhiteSpace,
    /// Word breaking
    pub word_wrap: WordWrap,
    /// Display mode
    pub display: Display,
    /// Main-axis alignment
    pub justify_content: FlexAlign,
    /// Cross-axis alignment
    pub align_items: FlexAlign,
    /// Gap between children
    pub gap: f32,
    /// Grid column count
    pub columns: u16,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            padding: 0.0,
            border: Border::none(),
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
            font_weight: 400,
            color: "#000000".to_string(),
            text_align: TextAlign::Left,
            box_sizing: BoxSizing::ContentBox,
            background_color: "transparent".to_string(),
            white_space: WhiteSpace::Normal,
            word_wrap: WordWrap::Normal,
            display: Display::Block,
            justify_content: FlexAlign::Start,
            align_items: FlexAlign::Start,
            gap: 0.0,
            columns: 1,
        }
    }
}

impl ComputedStyle {
    /// Defaults with inheritable text properties taken from `parent`.
    #[must_use]
    pub fn inherit(parent: &Self) -> Self {
        Self {
            font_family: parent.font_family.clone(),
            font_size: parent.font_size,
            font_weight: parent.font_weight,
            color: parent.color.clone(),
            text_align: parent.text_align,
            white_space: parent.white_space,
            word_wrap: parent.word_wrap,
            ..Self::default()
        }
    }

    /// Apply an authored style on top of this one.
    pub fn apply(&mut self, style: &Style) {
        if let Some(v) = style.width {
            self.width = Some(v);
        }
        if let Some(v) = style.height {
            self.height = Some(v);
        }
        if let Some(v) = style.padding {
            self.padding = v;
        }
        if let Some(v) = &style.border {
            self.border = v.clone();
        }
        if let Some(v) = &style.border_color {
            self.border.color.clone_from(v);
        }
        if let Some(v) = &style.font_family {
            self.font_family.clone_from(v);
        }
        if let Some(v) = style.font_size {
            self.font_size = v;
        }
        if let Some(v) = style.font_weight {
            self.font_weight = v;
        }
        if let Some(v) = &style.color {
            self.color.clone_from(v);
        }
        if let Some(v) = style.text_align {
            self.text_align = v;
        }
        if let Some(v) = style.box_sizing {
            self.box_sizing = v;
        }
        if let Some(v) = &style.background_color {
            self.background_color.clone_from(v);
        }
        if let Some(v) = style.white_space {
            self.white_space = v;
        }
        if let Some(v) = style.word_wrap {
            self.word_wrap = v;
        }
        if let Some(v) = style.display {
            self.display = v;
        }
        if let Some(v) = style.justify_content {
            self.justify_content = v;
        }
        if let Some(v) = style.align_items {
            self.align_items = v;
        }
        if let Some(v) = style.gap {
            self.gap = v;
        }
        if let Some(v) = style.columns {
            self.columns = v;
        }
    }

    /// Padding plus border width on one side.
    #[must_use]
    pub fn inset(&self) -> f32 {
        self.padding + self.border.width
    }
}

/// Ordered class rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stylesheet {
    rules: Vec<(String, Style)>,
}

impl Stylesheet {
    /// An empty stylesheet.
    #[must_use]
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule for `class`.
    #[must_use]
    pub fn with_rule(mut self, class: impl Into<String>, style: Style) -> Self {
        self.rules.push((class.into(), style));
        self
    }

    /// Rules matching any of `classes`, in stylesheet order.
    pub fn matching<'a>(&'a self, classes: &'a [String]) -> impl Iterator<Item = &'a Style> + 'a {
        self.rules
            .iter()
            .filter(|(class, _)| classes.iter().any(|c| c == class))
            .map(|(_, style)| style)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for Stylesheet {
    /// The chart application's stylesheet.
    fn default() -> Self {
        Self::empty()
            .with_rule(
                "app",
                Style {
                    display: Some(Display::Flex),
                    gap: Some(24.0),
                    font_family: Some("Inter, sans-serif".into()),
                    color: Some("#212529".into()),
                    ..Style::default()
                },
            )
            .with_rule(
                "sidebar",
                Style {
                    width: Some(240.0),
                    padding: Some(16.0),
                    ..Style::default()
                },
            )
            .with_rule(
                "header-title",
                Style {
                    font_size: Some(24.0),
                    font_weight: Some(700),
                    ..Style::default()
                },
            )
            .with_rule(
                "theme-button",
                Style {
                    display: Some(Display::Flex),
                    align_items: Some(FlexAlign::Center),
                    gap: Some(8.0),
                    padding: Some(6.0),
                    border: Some(Border::solid(1.0, "#ced4da")),
                    background_color: Some("#ffffff".into()),
                    ..Style::default()
                },
            )
            .with_rule(
                "active",
                Style {
                    border: Some(Border::solid(2.0, "#212529")),
                    font_weight: Some(600),
                    ..Style::default()
                },
            )
            .with_rule(
                "theme-color",
                Style {
                    width: Some(14.0),
                    height: Some(14.0),
                    ..Style::default()
                },
            )
            .with_rule(
                "export-button",
                Style {
                    padding: Some(10.0),
                    background_color: Some("#343a40".into()),
                    color: Some("white".into()),
                    ..Style::default()
                },
            )
            .with_rule(
                "grid-container",
                Style {
                    padding: Some(16.0),
                    ..Style::default()
                },
            )
            .with_rule(
                "interactive-grid",
                Style {
                    display: Some(Display::Grid),
                    columns: Some(3),
                    gap: Some(6.0),
                    padding: Some(6.0),
                    border: Some(Border::solid(3.0, "#dee2e6")),
                    ..Style::default()
                },
            )
            .with_rule(
                "major-cell",
                Style {
                    display: Some(Display::Grid),
                    columns: Some(3),
                    gap: Some(2.0),
                    padding: Some(2.0),
                    border: Some(Border::solid(2.0, "#dee2e6")),
                    ..Style::default()
                },
            )
            .with_rule(
                "minor-cell",
                Style {
                    width: Some(72.0),
                    height: Some(72.0),
                    padding: Some(4.0),
                    border: Some(Border::solid(1.0, "#dee2e6")),
                    font_family: Some("Inter, sans-serif".into()),
                    font_size: Some(12.0),
                    font_weight: Some(400),
                    color: Some("#212529".into()),
                    text_align: Some(TextAlign::Center),
                    box_sizing: Some(BoxSizing::BorderBox),
                    ..Style::default()
                },
            )
            .with_rule(
                "core-goal",
                Style {
                    font_size: Some(14.0),
                    font_weight: Some(700),
                    ..Style::default()
                },
            )
            .with_rule(
                "grid-footer",
                Style {
                    font_size: Some(12.0),
                    color: Some("#6c757d".into()),
                    ..Style::default()
                },
            )
    }
}
