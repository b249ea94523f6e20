//! PNG and data URI encoding.

use crate::error::EncodeError;
use crate::raster::Bitmap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Prefix of a base64 PNG data URI.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encode the painted pixels of a bitmap as PNG.
pub fn encode_png(bitmap: &Bitmap) -> Result<Vec<u8>, EncodeError> {
    let mut out = Cursor::new(Vec::new());
    bitmap.pixels.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Wrap PNG bytes in a data URI.
#[must_use]
pub fn to_data_uri(png: &[u8]) -> String {
    format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(png))
}

/// Extract the PNG bytes from a data URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, EncodeError> {
    let payload = uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or(EncodeError::NotPngDataUri)?;
    Ok(STANDARD.decode(payload)?)
}

/// Decode PNG bytes back into pixels.
pub fn decode_png(png: &[u8]) -> Result<RgbaImage, EncodeError> {
    Ok(image::load_from_memory_with_format(png, ImageFormat::Png)?.to_rgba8())
}
