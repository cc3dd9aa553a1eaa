use palette::Srgb;

use crate::error::{PlaceholderError, Result};

/// An sRGB byte triple. Alpha never survives into a `Color`.
pub type Color = Srgb<u8>;

const CHANNELS: usize = 4;

/// Perceived brightness, used only to order grid cells.
#[inline]
pub fn luminance(color: Color) -> f64 {
    0.299 * color.red as f64 + 0.587 * color.green as f64 + 0.114 * color.blue as f64
}

/// `#rrggbb`, lowercase, never shortened.
pub fn to_hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// `rgb(r,g,b)` with no spaces.
pub fn to_css_rgb(color: Color) -> String {
    format!("rgb({},{},{})", color.red, color.green, color.blue)
}

/// Borrowed RGBA pixels, row-major, top row first.
///
/// Construction checks that `data.len() == width * height * 4`, so every
/// consumer can index without further bounds reasoning.
#[derive(Clone, Copy, Debug)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PlaceholderError::InvalidDimensions { width, height });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or(PlaceholderError::TooLarge("pixel count"))?;
        if data.len() != expected {
            return Err(PlaceholderError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Color of the `index`-th pixel in scan order.
    #[inline]
    pub fn color_at(&self, index: usize) -> Color {
        let i = index * CHANNELS;
        Srgb::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    pub fn colors(&self) -> impl Iterator<Item = Color> + 'a {
        self.data
            .chunks_exact(CHANNELS)
            .map(|px| Srgb::new(px[0], px[1], px[2]))
    }
}

/// Number of whole RGBA pixels in an unshaped buffer.
///
/// Palette extraction works without dimensions, so it validates length only.
pub(crate) fn pixel_count(data: &[u8]) -> Result<usize> {
    if data.is_empty() {
        return Err(PlaceholderError::EmptyBuffer);
    }
    if data.len() % CHANNELS != 0 {
        return Err(PlaceholderError::BufferSize {
            expected: data.len() - data.len() % CHANNELS,
            actual: data.len(),
        });
    }
    Ok(data.len() / CHANNELS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(to_hex(Srgb::new(255, 10, 0)), "#ff0a00");
        assert_eq!(to_hex(Srgb::new(0, 0, 0)), "#000000");
    }

    #[test]
    fn css_rgb_has_no_spaces() {
        assert_eq!(to_css_rgb(Srgb::new(255, 0, 7)), "rgb(255,0,7)");
    }

    #[test]
    fn luminance_weights() {
        assert!((luminance(Srgb::new(255, 255, 255)) - 255.0).abs() < 1e-9);
        assert!(luminance(Srgb::new(0, 255, 0)) > luminance(Srgb::new(255, 0, 0)));
        assert!(luminance(Srgb::new(255, 0, 0)) > luminance(Srgb::new(0, 0, 255)));
    }

    #[test]
    fn buffer_rejects_wrong_length() {
        let data = [0u8; 15];
        match PixelBuffer::new(&data, 2, 2) {
            Err(PlaceholderError::BufferSize { expected: 16, actual: 15 }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn buffer_rejects_zero_dimensions() {
        assert!(matches!(
            PixelBuffer::new(&[], 0, 3),
            Err(PlaceholderError::InvalidDimensions { width: 0, height: 3 })
        ));
    }

    #[test]
    fn buffer_reads_rgb_and_drops_alpha() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8];
        let buf = PixelBuffer::new(&data, 2, 1).unwrap();
        assert_eq!(buf.color_at(1), Srgb::new(5, 6, 7));
        assert_eq!(buf.colors().count(), 2);
    }

    #[test]
    fn pixel_count_rejects_empty_and_ragged() {
        assert!(matches!(pixel_count(&[]), Err(PlaceholderError::EmptyBuffer)));
        assert!(pixel_count(&[0; 6]).is_err());
        assert_eq!(pixel_count(&[0; 8]).unwrap(), 2);
    }
}
