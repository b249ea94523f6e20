//! Session state for a chart being edited.
//!
//! The session is an owned value: views send it [`Message`]s, it applies
//! them synchronously and answers with a [`Command`] describing any side
//! effect the host has to run.
//!
//! # Examples
//!
//! ```
//! use mandala_core::{Command, Message, Session};
//!
//! let mut session = Session::new();
//! session.update(Message::CellChanged { index: 40, text: "Learn Rust".into() })?;
//! session.update(Message::ThemeSelected("Forest".into()))?;
//!
//! assert_eq!(session.grid().get(40), Some("Learn Rust"));
//! assert_eq!(session.theme().name, "Forest");
//! assert_eq!(session.update(Message::ExportRequested)?, Command::Export);
//! # Ok::<(), mandala_core::GridError>(())
//! ```

use crate::color::ColorParseError;
use crate::error::GridError;
use crate::grid::{cell_style, try_classify, CellStyle, Grid};
use crate::theme::Theme;
use serde::Serialize;
use tracing::debug;

/// Discrete user edits delivered by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A cell's text changed
    CellChanged {
        /// Cell index
        index: usize,
        /// New text, verbatim
        text: String,
    },
    /// A theme button was pressed
    ThemeSelected(String),
    /// The export button was pressed
    ExportRequested,
}

/// Side effects requested by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Nothing to do
    #[default]
    None,
    /// Run the export pipeline against the current render
    Export,
}

impl Command {
    /// Check if this is the none command.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Grid contents plus the active theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    grid: Grid,
    #[serde(rename = "theme")]
    active_theme: &'static Theme,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start a session with an empty grid and the first registered theme.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Grid::new(),
            active_theme: Theme::default_theme(),
        }
    }

    /// The grid contents.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The active theme.
    #[must_use]
    pub const fn theme(&self) -> &'static Theme {
        self.active_theme
    }

    /// Make `name` the active theme.
    ///
    /// Unregistered names are rejected with [`GridError::InvalidTheme`] and
    /// the active theme stays as it was.
    pub fn select_theme(&mut self, name: &str) -> Result<(), GridError> {
        let theme = Theme::lookup(name)?;
        debug!(from = self.active_theme.name, to = theme.name, "theme selected");
        self.active_theme = theme;
        Ok(())
    }

    /// Replace the text of one cell. No other cell changes.
    pub fn set_cell(&mut self, index: usize, text: impl Into<String>) -> Result<(), GridError> {
        self.grid.set(index, text)
    }

    /// Explicit colors of a cell under the active theme.
    pub fn cell_style(&self, index: usize) -> Result<CellStyle, GridError> {
        try_classify(index)?;
        cell_style(index, self.active_theme).map_err(|source: ColorParseError| {
            GridError::ThemeColor {
                theme: self.active_theme.name.to_string(),
                source,
            }
        })
    }

    /// Apply a message.
    pub fn update(&mut self, msg: Message) -> Result<Command, GridError> {
        match msg {
            Message::CellChanged { index, text } => {
                self.set_cell(index, text)?;
                Ok(Command::None)
            }
            Message::ThemeSelected(name) => {
                self.select_theme(&name)?;
                Ok(Command::None)
            }
            Message::ExportRequested => Ok(Command::Export),
        }
    }
}
