//! Snapshot capture: raster frame to PNG data URI.

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Prefix of every snapshot returned by [`capture_snapshot`].
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Capture errors.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No drawing surface found in the map view")]
    SurfaceNotFound,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Result of rendering a frame - raw RGBA pixel data and dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// RGBA pixel data (4 bytes per pixel, straight alpha).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// An element of the map view that may host a drawing surface.
///
/// Only some elements (the base-map canvas, overlay containers) carry a
/// surface; capture picks the first one that does.
pub trait ViewElement {
    /// The current frame of this element's surface, if it has one.
    fn surface(&self) -> Option<RenderedImage>;
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(image: &RenderedImage) -> CaptureResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width, image.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.rgba_data)?;
    }
    Ok(png_data)
}

/// Wrap PNG bytes in a `data:image/png;base64,` URI.
pub fn to_data_uri(png_data: &[u8]) -> String {
    format!("{}{}", PNG_DATA_URI_PREFIX, STANDARD.encode(png_data))
}

/// Decode the PNG bytes from a data URI produced by [`to_data_uri`].
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX)?;
    STANDARD.decode(payload).ok()
}

/// Snapshot the first element that hosts a drawing surface.
pub fn capture_snapshot<'a, E>(elements: impl IntoIterator<Item = &'a E>) -> CaptureResult<String>
where
    E: ViewElement + ?Sized + 'a,
{
    let image = elements
        .into_iter()
        .find_map(|e| e.surface())
        .ok_or(CaptureError::SurfaceNotFound)?;
    let png_data = encode_png(&image)?;
    log::info!(
        "Captured {}x{} snapshot ({} bytes)",
        image.width,
        image.height,
        png_data.len()
    );
    Ok(to_data_uri(&png_data))
}
