//! Placeholders from a [blurhash](https://blurha.sh) string.
//!
//! Decoding is delegated to the `blurhash` crate; its errors reach the
//! caller unchanged inside [`PlaceholderError::Blurhash`].

use crate::bmp::{BMP_MIME, data_uri, rgba_pixels_to_bmp};
use crate::color::PixelBuffer;
use crate::css::pixels_to_css_gradients;
use crate::error::Result;

/// Side length of the bitmap placeholder. Keep it tiny.
pub const DEFAULT_BMP_SIZE: u32 = 8;

const PUNCH: f32 = 1.0;

/// `background-image` and optional `background-size`, the shape of a style
/// object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssObject {
    pub background_image: String,
    pub background_size: Option<String>,
}

/// Decode `hash` into `columns x rows` RGBA pixels.
pub fn decode(hash: &str, columns: u32, rows: u32) -> Result<Vec<u8>> {
    let pixels = blurhash::decode(hash, columns, rows, PUNCH)?;
    PixelBuffer::new(&pixels, columns, rows)?;
    Ok(pixels)
}

/// Hash RGBA `pixels` with `x_components x y_components` components.
pub fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    x_components: u32,
    y_components: u32,
) -> Result<String> {
    PixelBuffer::new(pixels, width, height)?;
    Ok(blurhash::encode(x_components, y_components, width, height, pixels)?)
}

/// BMP data URI of the hash decoded at `width x height`. At these sizes a
/// BMP is smaller than a PNG.
pub fn blurhash_to_data_uri(hash: &str, width: u32, height: u32) -> Result<String> {
    let pixels = decode(hash, width, height)?;
    let bmp = rgba_pixels_to_bmp(&pixels, width, height)?;
    Ok(data_uri(&bmp, BMP_MIME))
}

/// A rough pure-CSS approximation of the hash: one gradient per grid cell.
pub fn blurhash_to_css_gradients(hash: &str, columns: u32, rows: u32) -> Result<Vec<String>> {
    let pixels = decode(hash, columns, rows)?;
    pixels_to_css_gradients(&pixels, columns, rows)
}

pub fn blurhash_to_css_gradient_string(hash: &str, columns: u32, rows: u32) -> Result<String> {
    Ok(blurhash_to_css_gradients(hash, columns, rows)?.join(","))
}

pub fn blurhash_to_gradient_css_object(hash: &str, columns: u32, rows: u32) -> Result<CssObject> {
    Ok(CssObject {
        background_image: blurhash_to_css_gradient_string(hash, columns, rows)?,
        background_size: None,
    })
}

pub fn blurhash_to_image_css_object(hash: &str, width: u32, height: u32) -> Result<CssObject> {
    let uri = blurhash_to_data_uri(hash, width, height)?;
    Ok(CssObject {
        background_image: format!("url(\"{uri}\")"),
        background_size: Some("cover".to_string()),
    })
}

/// `background: url("...") cover`, for an inline `style` attribute.
pub fn blurhash_to_image_css_string(hash: &str, width: u32, height: u32) -> Result<String> {
    let uri = blurhash_to_data_uri(hash, width, height)?;
    Ok(format!("background: url(\"{uri}\") cover"))
}
