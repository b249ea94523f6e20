//! File-save boundary.
//!
//! Savers receive the finished PNG as a data URI plus the filename to save
//! it under. In WASM, [`BrowserDownload`] triggers a client-side download;
//! elsewhere [`DirectorySaver`] writes into a directory and
//! [`MemorySaver`] keeps the results for the caller.

use crate::encode::decode_data_uri;
use crate::error::SaveError;
use std::path::{Path, PathBuf};
use tracing::info;

/// A destination for exported images.
pub trait FileSaver {
    /// Save `data_uri` under `filename`.
    fn save(&mut self, data_uri: &str, filename: &str) -> Result<(), SaveError>;
}

impl<S: FileSaver + ?Sized> FileSaver for &mut S {
    fn save(&mut self, data_uri: &str, filename: &str) -> Result<(), SaveError> {
        (**self).save(data_uri, filename)
    }
}

/// Writes decoded image bytes to `<dir>/<filename>`.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    /// Save into `dir`, which must exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&mut self, data_uri: &str, filename: &str) -> Result<(), SaveError> {
        if matches!(filename, "" | "." | "..") || filename.contains(['/', '\\']) {
            return Err(SaveError::InvalidFilename(filename.to_string()));
        }
        let bytes = decode_data_uri(data_uri)?;
        let path = self.dir.join(filename);
        std::fs::write(&path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "saved export");
        Ok(())
    }
}

/// One saved file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Requested filename
    pub filename: String,
    /// The data URI as received
    pub data_uri: String,
}

/// Keeps saved files in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySaver {
    saved: Vec<SavedFile>,
}

impl MemorySaver {
    /// Create an empty saver.
    #[must_use]
    pub const fn new() -> Self {
        Self { saved: Vec::new() }
    }

    /// Everything saved so far, oldest first.
    #[must_use]
    pub fn saved(&self) -> &[SavedFile] {
        &self.saved
    }

    /// The most recent save.
    #[must_use]
    pub fn last(&self) -> Option<&SavedFile> {
        self.saved.last()
    }
}

impl FileSaver for MemorySaver {
    fn save(&mut self, data_uri: &str, filename: &str) -> Result<(), SaveError> {
        self.saved.push(SavedFile {
            filename: filename.to_string(),
            data_uri: data_uri.to_string(),
        });
        Ok(())
    }
}

/// Triggers a browser download through a temporary anchor element.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserDownload;

#[cfg(target_arch = "wasm32")]
impl FileSaver for BrowserDownload {
    fn save(&mut self, data_uri: &str, filename: &str) -> Result<(), SaveError> {
        use wasm_bindgen::JsCast;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SaveError::Rejected("no document".to_string()))?;
        let anchor = document
            .create_element("a")
            .map_err(|e| SaveError::Rejected(format!("{e:?}")))?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|e| SaveError::Rejected(format!("{e:?}")))?;
        anchor.set_href(data_uri);
        anchor.set_download(filename);
        anchor.click();
        info!(filename, "download triggered");
        Ok(())
    }
}
