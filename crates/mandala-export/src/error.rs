//! Error types for mandala-export.

use mandala_dom::DomError;
use thiserror::Error;

/// Errors raised while capturing a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// A cross-origin image would have tainted the canvas.
    #[error("canvas tainted by cross-origin image {0}")]
    Tainted(String),

    /// The capture would exceed the pixel limit.
    #[error("capture of {width}x{height} exceeds the limit of {max} pixels")]
    TooLarge {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
        /// Configured pixel limit
        max: u64,
    },

    /// The target node is not attached to the captured document.
    #[error("capture target is not attached to the document")]
    TargetDetached,

    /// The pre-capture hook failed.
    #[error("pre-capture hook failed: {0}")]
    Hook(String),

    /// A bundled font could not be parsed.
    #[error("font unavailable: {0}")]
    Font(String),

    /// Tree or layout failure.
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Errors from PNG and data URI encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The image codec failed.
    #[error("PNG codec error: {0}")]
    Png(#[from] image::ImageError),

    /// The input is not a base64 PNG data URI.
    #[error("not a PNG data URI")]
    NotPngDataUri,

    /// The base64 payload is malformed.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Errors from the file-save boundary.
#[derive(Debug, Error)]
pub enum SaveError {
    /// IO error writing the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The data URI could not be decoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The filename would escape the target directory.
    #[error("invalid filename '{0}'")]
    InvalidFilename(String),

    /// The host refused the download.
    #[error("download rejected: {0}")]
    Rejected(String),
}

/// Errors loading an [`ExportConfig`](crate::ExportConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML is malformed or has wrong field types.
    #[error("invalid export config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Scale must be a positive finite number.
    #[error("invalid scale {0}")]
    InvalidScale(f32),

    /// Filename must be non-empty.
    #[error("export filename is empty")]
    EmptyFilename,
}

/// The stage at which a started export failed.
#[derive(Debug, Error)]
pub enum ExportFailure {
    /// Rasterization failed.
    #[error("rasterization failed: {0}")]
    Raster(#[from] RasterError),

    /// Encoding failed.
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),

    /// Saving failed.
    #[error("save failed: {0}")]
    Save(#[from] SaveError),
}

/// Errors returned by [`ExportPipeline::export`](crate::ExportPipeline::export).
#[derive(Debug, Error)]
pub enum ExportError {
    /// No rendered grid is bound, or the handle is stale.
    #[error("no rendered grid is bound for export")]
    ExportTargetMissing,

    /// Another export is still capturing.
    #[error("an export is already in progress")]
    ExportBusy,

    /// The export started but did not complete.
    #[error("export failed: {0}")]
    ExportFailed(#[from] ExportFailure),
}

impl ExportError {
    /// Check whether this error is recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::ExportBusy | Self::ExportFailed(_))
    }
}
