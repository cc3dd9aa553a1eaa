//! Smallest legal BMP for a handful of pixels.
//!
//! At placeholder sizes (a few pixels a side) an uncompressed 24-bit bitmap
//! beats PNG: there is no zlib stream, no chunk CRCs, just a 54 byte header
//! and the rows.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::trace;

use crate::color::PixelBuffer;
use crate::error::{PlaceholderError, Result};

pub const BMP_MIME: &str = "image/bmp";

const BMP_MAGIC: [u8; 2] = *b"BM";
const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;
/// File header + BITMAPINFOHEADER, pixel data starts right after.
pub const HEADER_SIZE: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
const PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = 24;
const BYTES_PER_PIXEL: usize = 3;
const COMPRESSION_RGB: u32 = 0;
/// 2835 pixels/metre, about 72 dpi.
const PIXELS_PER_METRE: i32 = 2835;
const ROW_ALIGN: usize = 4;

/// The two BMP headers, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BmpHeader {
    file_size: u32,
    width: i32,
    height: i32,
    image_size: u32,
}

impl BmpHeader {
    fn write_to(&self, out: &mut Vec<u8>) {
        // BITMAPFILEHEADER
        out.extend_from_slice(&BMP_MAGIC);
        out.extend_from_slice(&self.file_size.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // reserved
        out.extend_from_slice(&0u16.to_le_bytes()); // reserved
        out.extend_from_slice(&HEADER_SIZE.to_le_bytes());
        // BITMAPINFOHEADER
        out.extend_from_slice(&INFO_HEADER_SIZE.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&PLANES.to_le_bytes());
        out.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
        out.extend_from_slice(&COMPRESSION_RGB.to_le_bytes());
        out.extend_from_slice(&self.image_size.to_le_bytes());
        out.extend_from_slice(&PIXELS_PER_METRE.to_le_bytes());
        out.extend_from_slice(&PIXELS_PER_METRE.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // palette colors
        out.extend_from_slice(&0u32.to_le_bytes()); // important colors
    }
}

/// Bytes per stored row: three per pixel, rounded up to a multiple of four.
#[inline]
fn row_stride(width: usize) -> usize {
    (width * BYTES_PER_PIXEL).div_ceil(ROW_ALIGN) * ROW_ALIGN
}

/// Encode RGBA `pixels` as an uncompressed 24-bit BMP.
///
/// Rows are written bottom-up in B,G,R order, alpha is dropped and row
/// padding is always zero, so equal input always gives equal bytes.
///
/// # Errors
/// - `InvalidDimensions` if either side is zero
/// - `BufferSize` if `pixels.len() != width * height * 4`
/// - `TooLarge` if a dimension or size does not fit its header field
pub fn rgba_pixels_to_bmp(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let buffer = PixelBuffer::new(pixels, width, height)?;

    let signed_width = i32::try_from(width).map_err(|_| PlaceholderError::TooLarge("width"))?;
    let signed_height = i32::try_from(height).map_err(|_| PlaceholderError::TooLarge("height"))?;

    let w = width as usize;
    let h = height as usize;
    let stride = row_stride(w);
    let image_size = stride
        .checked_mul(h)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(PlaceholderError::TooLarge("image size"))?;
    let file_size = image_size
        .checked_add(HEADER_SIZE)
        .ok_or(PlaceholderError::TooLarge("file size"))?;

    let header = BmpHeader {
        file_size,
        width: signed_width,
        height: signed_height,
        image_size,
    };

    let mut out = Vec::with_capacity(file_size as usize);
    header.write_to(&mut out);
    debug_assert_eq!(out.len(), HEADER_SIZE as usize);

    let padding = stride - w * BYTES_PER_PIXEL;
    for y in (0..h).rev() {
        for x in 0..w {
            let color = buffer.color_at(y * w + x);
            out.extend_from_slice(&[color.blue, color.green, color.red]);
        }
        out.resize(out.len() + padding, 0);
    }
    trace!("encoded {width}x{height} BMP, {file_size} bytes");

    Ok(out)
}

/// `data:<mime_type>;base64,<payload>`, no line wrapping.
///
/// The MIME type is embedded as given.
pub fn data_uri(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// BMP data URI for the given pixels.
pub fn bmp_data_uri(pixels: &[u8], width: u32, height: u32) -> Result<String> {
    let bmp = rgba_pixels_to_bmp(pixels, width, height)?;
    Ok(data_uri(&bmp, BMP_MIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn le_u16(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    #[test]
    fn single_red_pixel() {
        let bmp = rgba_pixels_to_bmp(&[255, 0, 0, 255], 1, 1).unwrap();
        assert_eq!(bmp.len(), 58);
        assert_eq!(&bmp[0..2], b"BM");
        assert_eq!(le_u32(&bmp, 2), 58);
        assert_eq!(le_u32(&bmp, 6), 0);
        assert_eq!(le_u32(&bmp, 10), 54);
        assert_eq!(le_u32(&bmp, 14), 40);
        assert_eq!(le_u32(&bmp, 18), 1);
        assert_eq!(le_u32(&bmp, 22), 1);
        assert_eq!(le_u16(&bmp, 26), 1);
        assert_eq!(le_u16(&bmp, 28), 24);
        assert_eq!(le_u32(&bmp, 30), 0);
        assert_eq!(le_u32(&bmp, 34), 4);
        assert_eq!(le_u32(&bmp, 38), 2835);
        assert_eq!(le_u32(&bmp, 42), 2835);
        assert_eq!(le_u32(&bmp, 46), 0);
        assert_eq!(le_u32(&bmp, 50), 0);
        assert_eq!(&bmp[54..58], &[0x00, 0x00, 0xff, 0x00]);
    }

    #[test]
    fn rows_are_bottom_up_and_zero_padded() {
        // 2x2: top row red, green; bottom row blue, white
        let pixels = [
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 9,
        ];
        let bmp = rgba_pixels_to_bmp(&pixels, 2, 2).unwrap();
        // stride = 6 rounded to 8
        assert_eq!(bmp.len(), 54 + 16);
        assert_eq!(le_u32(&bmp, 34), 16);
        let data = &bmp[54..];
        assert_eq!(&data[0..8], &[255, 0, 0, 255, 255, 255, 0, 0]);
        assert_eq!(&data[8..16], &[0, 0, 255, 0, 255, 0, 0, 0]);
    }

    #[test]
    fn stride_rounding() {
        assert_eq!(row_stride(1), 4);
        assert_eq!(row_stride(3), 12);
        assert_eq!(row_stride(4), 12);
        assert_eq!(row_stride(5), 16);
    }

    #[test]
    fn output_is_deterministic() {
        let pixels: Vec<u8> = (0..5 * 3 * 4).map(|i| (i * 7 % 256) as u8).collect();
        let a = rgba_pixels_to_bmp(&pixels, 5, 3).unwrap();
        let b = rgba_pixels_to_bmp(&pixels, 5, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            rgba_pixels_to_bmp(&[], 0, 1),
            Err(PlaceholderError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            rgba_pixels_to_bmp(&[0; 8], 1, 1),
            Err(PlaceholderError::BufferSize { expected: 4, actual: 8 })
        ));
    }

    #[test]
    fn data_uri_format() {
        assert_eq!(data_uri(b"hi", "text/plain"), "data:text/plain;base64,aGk=");
        let uri = bmp_data_uri(&[255, 0, 0, 255], 1, 1).unwrap();
        assert!(uri.starts_with("data:image/bmp;base64,Qk"));
        assert!(!uri.contains('\n'));
    }
}
