#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
//! Image export for Mandala charts.
//!
//! Editable cells do not survive rasterization, so an export runs in four
//! steps against a clone of the rendered document:
//!
//! 1. [`substitute_static_cells`] swaps each text area for a static,
//!    style-matched element showing the cell's value
//! 2. a [`Rasterizer`] captures the grid subtree into a [`Bitmap`]
//! 3. [`encode_png`] and [`to_data_uri`] turn the bitmap into a data URI
//! 4. a [`FileSaver`] stores it as `mandala-chart.png`
//!
//! [`ExportPipeline`] runs the steps and rejects overlapping exports.
//!
//! ```
//! use futures::executor::block_on;
//! use mandala_core::Session;
//! use mandala_dom::Renderer;
//! use mandala_export::{ExportPipeline, MemorySaver, SoftwareRasterizer};
//!
//! let mut session = Session::new();
//! session.set_cell(40, "Learn Rust")?;
//! let mut renderer = Renderer::new();
//! renderer.render(&session)?;
//!
//! let pipeline = ExportPipeline::default();
//! let mut saver = MemorySaver::new();
//! let report = block_on(pipeline.export(
//!     renderer.grid_target(),
//!     &SoftwareRasterizer::new(),
//!     &mut saver,
//! ))?;
//! assert_eq!(report.filename, "mandala-chart.png");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod encode;
mod error;
mod glyph;
mod pipeline;
mod raster;
mod save;
mod substitute;

pub use config::{ExportConfig, RasterOptions, DEFAULT_CELL_BACKGROUND, DEFAULT_FILENAME};
pub use encode::{decode_data_uri, decode_png, encode_png, to_data_uri, PNG_DATA_URI_PREFIX};
pub use error::{ConfigError, EncodeError, ExportError, ExportFailure, RasterError, SaveError};
pub use pipeline::{ExportOutcome, ExportPipeline, ExportReport, ExportState};
pub use raster::{Bitmap, Rasterizer, SoftwareRasterizer, TextRun, DEFAULT_MAX_PIXELS};
#[cfg(target_arch = "wasm32")]
pub use save::BrowserDownload;
pub use save::{DirectorySaver, FileSaver, MemorySaver, SavedFile};
pub use substitute::substitute_static_cells;
