//! The 9×9 mandala grid and its structural classification.
//!
//! Cells are stored row-major by block: indices `0..9` belong to the
//! top-left 3×3 block, `9..18` to the top-center block, and so on. Within a
//! block, offset 4 is the center cell.
//!
//! Classification is a pure function of the index. Colors derived from it
//! depend on the active theme and are recomputed on every call.

use crate::color::ColorParseError;
use crate::error::GridError;
use crate::theme::{Theme, CORE_GOAL_FOREGROUND};
use serde::{Deserialize, Serialize};

/// Blocks per side and cells per block side, squared.
pub const GRID_SIZE: usize = 9;

/// Total number of cells.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Offset of the center cell inside any block.
pub const BLOCK_CENTER: usize = 4;

/// The center block.
pub const CORE_BLOCK: usize = 4;

/// Index of the overarching goal.
pub const CORE_GOAL_INDEX: usize = CORE_BLOCK * GRID_SIZE + BLOCK_CENTER;

/// Centers of the eight surrounding blocks.
pub const SUB_GOAL_INDICES: [usize; 8] = [4, 13, 22, 31, 49, 58, 67, 76];

/// Which 3×3 block an index belongs to.
#[must_use]
pub const fn major_block(index: usize) -> usize {
    index / GRID_SIZE
}

/// Position of an index within its block.
#[must_use]
pub const fn minor_offset(index: usize) -> usize {
    index % GRID_SIZE
}

/// Structural role of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// The single overarching goal
    CoreGoal,
    /// One of the eight supporting goals
    SubGoal,
    /// Everything else
    Plain,
}

impl CellKind {
    /// Placeholder shown in an empty cell of this kind.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::CoreGoal => "Core Goal",
            Self::SubGoal | Self::Plain => "",
        }
    }
}

/// Classify a cell index.
///
/// # Panics
///
/// Panics if `index >= CELL_COUNT`; use [`try_classify`] for unchecked input.
#[must_use]
pub fn classify(index: usize) -> CellKind {
    assert!(index < CELL_COUNT, "cell index {index} out of range");
    if major_block(index) == CORE_BLOCK && minor_offset(index) == BLOCK_CENTER {
        CellKind::CoreGoal
    } else if SUB_GOAL_INDICES.contains(&index) {
        CellKind::SubGoal
    } else {
        CellKind::Plain
    }
}

/// Classify a cell index, reporting out-of-range input as an error.
pub fn try_classify(index: usize) -> Result<CellKind, GridError> {
    if index < CELL_COUNT {
        Ok(classify(index))
    } else {
        Err(GridError::IndexOutOfRange(index))
    }
}

/// Theme-derived colors for one cell. `None` leaves the stylesheet default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyle {
    /// Explicit background color
    pub background: Option<String>,
    /// Explicit text color
    pub foreground: Option<String>,
}

/// Compute the explicit colors of a cell under `theme`.
///
/// # Panics
///
/// Panics if `index >= CELL_COUNT`.
pub fn cell_style(index: usize, theme: &Theme) -> Result<CellStyle, ColorParseError> {
    Ok(match classify(index) {
        CellKind::CoreGoal => CellStyle {
            background: Some(theme.core_goal_background()?),
            foreground: Some(CORE_GOAL_FOREGROUND.to_string()),
        },
        CellKind::SubGoal => CellStyle {
            background: Some(theme.color.to_string()),
            foreground: None,
        },
        CellKind::Plain => CellStyle::default(),
    })
}

/// The 81 cell values of a chart.
///
/// The length never changes; cells are only replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Grid {
    cells: Vec<String>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Create a grid with every cell empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![String::new(); CELL_COUNT],
        }
    }

    /// Text of a cell, or `None` if the index is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Replace the text of one cell. The text is stored verbatim.
    pub fn set(&mut self, index: usize, text: impl Into<String>) -> Result<(), GridError> {
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(GridError::IndexOutOfRange(index))?;
        *cell = text.into();
        Ok(())
    }

    /// All cells in index order.
    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Iterate `(index, text)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.cells.iter().map(String::as_str).enumerate()
    }

    /// The nine cells of major block `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block >= GRID_SIZE`.
    #[must_use]
    pub fn block(&self, block: usize) -> &[String] {
        assert!(block < GRID_SIZE, "block {block} out of range");
        &self.cells[block * GRID_SIZE..(block + 1) * GRID_SIZE]
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(String::clear);
    }
}

impl TryFrom<Vec<String>> for Grid {
    type Error = String;

    fn try_from(cells: Vec<String>) -> Result<Self, Self::Error> {
        if cells.len() == CELL_COUNT {
            Ok(Self { cells })
        } else {
            Err(format!("expected {CELL_COUNT} cells, found {}", cells.len()))
        }
    }
}

impl From<Grid> for Vec<String> {
    fn from(grid: Grid) -> Self {
        grid.cells
    }
}
