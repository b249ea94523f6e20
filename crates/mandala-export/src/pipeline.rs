//! The export pipeline.
//!
//! ```text
//! Idle ──export──▶ Capturing ──▶ Succeeded ──▶ Idle
//!                      └───────▶ Failed    ──▶ Idle
//! ```
//!
//! Only one capture runs at a time; a request arriving while another is
//! capturing is rejected with [`ExportError::ExportBusy`]. The live document
//! is only borrowed, so a failed export cannot leave the chart changed.

use crate::config::ExportConfig;
use crate::encode::{encode_png, to_data_uri};
use crate::error::{ConfigError, ExportError, ExportFailure, RasterError};
use crate::raster::Rasterizer;
use crate::save::FileSaver;
use crate::substitute::substitute_static_cells;
use mandala_dom::{Document, GridTarget, NodeId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Whether a capture is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    /// Ready to export
    Idle,
    /// A capture is running
    Capturing,
}

/// How the last finished export ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The image was saved
    Succeeded,
    /// The export failed after it started
    Failed,
}

/// Summary of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Name the image was saved under
    pub filename: String,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of cells replaced before capture
    pub substituted: usize,
    /// Encoded PNG size
    pub bytes: usize,
}

/// Serializes exports of a rendered chart.
#[derive(Debug, Default)]
pub struct ExportPipeline {
    config: ExportConfig,
    capturing: AtomicBool,
    last_outcome: Mutex<Option<ExportOutcome>>,
}

/// Holds the capturing flag; clears it on drop.
struct CaptureGuard<'a>(&'a AtomicBool);

impl<'a> CaptureGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportPipeline {
    /// Create a pipeline, rejecting a config that could not produce an
    /// image.
    pub fn new(config: ExportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            capturing: AtomicBool::new(false),
            last_outcome: Mutex::new(None),
        })
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ExportState {
        if self.capturing.load(Ordering::Acquire) {
            ExportState::Capturing
        } else {
            ExportState::Idle
        }
    }

    /// Outcome of the most recent export that got past the start checks.
    #[must_use]
    pub fn last_outcome(&self) -> Option<ExportOutcome> {
        *self
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Export the grid of `target` as a PNG and hand it to `saver`.
    ///
    /// # Errors
    ///
    /// - [`ExportError::ExportTargetMissing`] if `target` is `None` or its
    ///   handle does not resolve in its document
    /// - [`ExportError::ExportBusy`] if another export is capturing
    /// - [`ExportError::ExportFailed`] if rasterization, encoding or saving
    ///   fails
    pub async fn export<R, S>(
        &self,
        target: Option<GridTarget<'_>>,
        rasterizer: &R,
        saver: &mut S,
    ) -> Result<ExportReport, ExportError>
    where
        R: Rasterizer + ?Sized,
        S: FileSaver + ?Sized,
    {
        let Some(target) = target else {
            warn!("export requested before the grid was rendered");
            return Err(ExportError::ExportTargetMissing);
        };
        let Some(grid) = target.resolve() else {
            warn!("export target does not resolve in its document");
            return Err(ExportError::ExportTargetMissing);
        };
        let Some(_guard) = CaptureGuard::acquire(&self.capturing) else {
            debug!("export rejected, capture in progress");
            return Err(ExportError::ExportBusy);
        };

        info!(filename = %self.config.filename, scale = self.config.scale, "export started");
        let result = self.run(target.document, grid, rasterizer, saver).await;
        let outcome = match &result {
            Ok(_) => ExportOutcome::Succeeded,
            Err(_) => ExportOutcome::Failed,
        };
        *self
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome);

        match result {
            Ok(report) => {
                info!(
                    filename = %report.filename,
                    width = report.width,
                    height = report.height,
                    bytes = report.bytes,
                    "export finished"
                );
                Ok(report)
            }
            Err(failure) => {
                warn!(error = %failure, "export failed");
                Err(ExportError::ExportFailed(failure))
            }
        }
    }

    async fn run<R, S>(
        &self,
        live: &Document,
        grid: NodeId,
        rasterizer: &R,
        saver: &mut S,
    ) -> Result<ExportReport, ExportFailure>
    where
        R: Rasterizer + ?Sized,
        S: FileSaver + ?Sized,
    {
        let options = self.config.raster_options();
        let mut substituted = 0;
        let mut hook = |clone: &mut Document| -> Result<(), RasterError> {
            substituted = substitute_static_cells(clone, &self.config)
                .map_err(|e| RasterError::Hook(e.to_string()))?;
            Ok(())
        };
        let bitmap = rasterizer
            .rasterize(live, grid, &options, &mut hook)
            .await?;

        let png = encode_png(&bitmap)?;
        saver.save(&to_data_uri(&png), &self.config.filename)?;
        Ok(ExportReport {
            filename: self.config.filename.clone(),
            width: bitmap.width,
            height: bitmap.height,
            substituted,
            bytes: png.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::SoftwareRasterizer;
    use crate::save::MemorySaver;
    use futures::executor::block_on;
    use mandala_core::Session;
    use mandala_dom::{render, Renderer};

    #[test]
    fn test_missing_target() {
        let pipeline = ExportPipeline::default();
        let renderer = Renderer::new();
        let mut saver = MemorySaver::new();
        let result = block_on(pipeline.export(
            renderer.grid_target(),
            &SoftwareRasterizer::new(),
            &mut saver,
        ));
        assert!(matches!(result, Err(ExportError::ExportTargetMissing)));
        assert_eq!(pipeline.last_outcome(), None);
        assert!(saver.saved().is_empty());
    }

    #[test]
    fn test_stale_handle_is_missing_target() {
        let old = render(&Session::new()).unwrap();
        let fresh = render(&Session::new()).unwrap();
        let target = GridTarget {
            document: fresh.document(),
            grid: old.grid(),
        };
        let result = block_on(ExportPipeline::default().export(
            Some(target),
            &SoftwareRasterizer::new(),
            &mut MemorySaver::new(),
        ));
        assert!(matches!(result, Err(ExportError::ExportTargetMissing)));
    }

    #[test]
    fn test_success_returns_to_idle() {
        let app = render(&Session::new()).unwrap();
        let pipeline = ExportPipeline::default();
        let mut saver = MemorySaver::new();
        let report = block_on(pipeline.export(
            Some(app.target()),
            &SoftwareRasterizer::new(),
            &mut saver,
        ))
        .unwrap();
        assert_eq!(report.filename, "mandala-chart.png");
        assert_eq!((report.width, report.height), (1428, 1428));
        assert_eq!(report.substituted, 81);
        assert_eq!(pipeline.state(), ExportState::Idle);
        assert_eq!(pipeline.last_outcome(), Some(ExportOutcome::Succeeded));
        assert_eq!(saver.last().unwrap().filename, "mandala-chart.png");
    }

    #[test]
    fn test_failure_returns_to_idle() {
        let app = render(&Session::new()).unwrap();
        let pipeline = ExportPipeline::default();
        let tiny = SoftwareRasterizer::new().with_max_pixels(10);
        let result = block_on(pipeline.export(Some(app.target()), &tiny, &mut MemorySaver::new()));
        assert!(matches!(
            result,
            Err(ExportError::ExportFailed(ExportFailure::Raster(
                RasterError::TooLarge { .. }
            )))
        ));
        assert_eq!(pipeline.state(), ExportState::Idle);
        assert_eq!(pipeline.last_outcome(), Some(ExportOutcome::Failed));
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let zero = ExportConfig {
            scale: 0.0,
            ..ExportConfig::default()
        };
        assert!(matches!(
            ExportPipeline::new(zero),
            Err(ConfigError::InvalidScale(s)) if s == 0.0
        ));
        let unnamed = ExportConfig {
            filename: String::new(),
            ..ExportConfig::default()
        };
        assert!(matches!(
            ExportPipeline::new(unnamed),
            Err(ConfigError::EmptyFilename)
        ));
        assert!(ExportPipeline::new(ExportConfig::default()).is_ok());
    }

    #[test]
    fn test_guard_releases_flag() {
        let flag = AtomicBool::new(false);
        {
            let _guard = CaptureGuard::acquire(&flag).unwrap();
            assert!(CaptureGuard::acquire(&flag).is_none());
        }
        assert!(CaptureGuard::acquire(&flag).is_some());
    }
}
