//! Every placeholder artifact for one image or one hash.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::blur;
use crate::bmp::bmp_data_uri;
use crate::clustering::{
    DOMINANT_CLUSTERS, get_dominant_color_with_rng, get_palette_with_rng, get_perceptual_palette,
};
use crate::color::Color;
use crate::css::{generate_gradient_css_class, pixels_to_css_gradients, pixels_to_css_vars};
use crate::error::{PlaceholderError, Result};

// Hashing cost is width * height * components, a thumbnail is plenty.
const BLURHASH_MAX_SIDE: u32 = 64;

/// Knobs for [`Placeholder`]. The defaults match what the library's demo
/// page uses.
#[derive(Clone, Debug)]
pub struct PlaceholderOptions {
    /// Palette length.
    pub palette_colors: usize,
    /// Images wider than this are scaled down before palette extraction.
    pub palette_max_width: u32,
    /// Longest side of the grid taken from an image. The CSS outputs and the
    /// BMP both use this grid.
    pub grid_size: u32,
    /// Grid decoded from a hash for the CSS outputs, `(columns, rows)`.
    pub hash_grid: (u32, u32),
    /// Bitmap decoded from a hash, `(width, height)`.
    pub hash_bmp_size: (u32, u32),
    /// Prefix for the custom property names.
    pub var_prefix: String,
    /// Cluster in Lab rather than RGB. Applies to the dominant color too.
    pub perceptual: bool,
    /// Components used when hashing an image; `None` skips hashing.
    pub blurhash_components: Option<(u32, u32)>,
    /// Pins the palette. `None` draws fresh entropy.
    pub seed: Option<u64>,
}

impl Default for PlaceholderOptions {
    fn default() -> Self {
        Self {
            palette_colors: 8,
            palette_max_width: 800,
            grid_size: 4,
            hash_grid: (crate::css::DEFAULT_COLUMNS, crate::css::DEFAULT_ROWS),
            hash_bmp_size: (blur::DEFAULT_BMP_SIZE, blur::DEFAULT_BMP_SIZE),
            var_prefix: String::new(),
            perceptual: false,
            blurhash_components: Some((4, 3)),
            seed: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Placeholder {
    pub palette: Vec<Color>,
    pub dominant: Color,
    pub columns: u32,
    pub rows: u32,
    pub gradients: Vec<String>,
    pub vars: String,
    pub class: String,
    pub bmp: String,
    pub blurhash: Option<String>,
}

/// Scale `width x height` so the longest side becomes `max_side`, keeping
/// the aspect ratio. Neither side drops below 1.
pub fn scale_to_fit(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let scale = width.max(height) as f64 / max_side.max(1) as f64;
    let w = (width as f64 / scale).round().max(1.0) as u32;
    let h = (height as f64 / scale).round().max(1.0) as u32;
    (w, h)
}

fn cell_count(columns: u32, rows: u32) -> usize {
    columns as usize * rows as usize
}

/// Decode an encoded image (any format the `image` crate reads) to RGBA.
pub fn load_rgba(bytes: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    let img = image::load_from_memory(bytes)?;
    let (w, h) = img.dimensions();
    Ok((img.to_rgba8().into_raw(), w, h))
}

fn resized(img: &DynamicImage, width: u32, height: u32) -> Vec<u8> {
    if img.dimensions() == (width, height) {
        return img.to_rgba8().into_raw();
    }
    image::imageops::resize(img, width, height, FilterType::Triangle).into_raw()
}

impl Placeholder {
    pub fn from_image_bytes(bytes: &[u8], options: &PlaceholderOptions) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Self::from_image(&img, options)
    }

    pub fn from_image(img: &DynamicImage, options: &PlaceholderOptions) -> Result<Self> {
        let (w, h) = img.dimensions();

        let palette_w = w.min(options.palette_max_width.max(1));
        let palette_h = ((h as f64 * palette_w as f64 / w.max(1) as f64).round() as u32).max(1);
        let palette_pixels = resized(img, palette_w, palette_h);

        let (columns, rows) = scale_to_fit(w, h, options.grid_size);
        debug!("{w}x{h} image, {palette_w}x{palette_h} for palette, {columns}x{rows} grid");
        let grid = resized(img, columns, rows);

        let blurhash = match options.blurhash_components {
            Some((x, y)) => {
                let (bw, bh) = scale_to_fit(w, h, BLURHASH_MAX_SIDE.min(w.max(h)));
                Some(blur::encode(&resized(img, bw, bh), bw, bh, x, y)?)
            }
            None => None,
        };

        let bmp = bmp_data_uri(&grid, columns, rows)?;
        Self::assemble(&palette_pixels, &grid, columns, rows, bmp, blurhash, options)
    }

    /// Everything derivable from a hash alone. The palette is taken from the
    /// decoded bitmap.
    pub fn from_blurhash(hash: &str, options: &PlaceholderOptions) -> Result<Self> {
        let (columns, rows) = options.hash_grid;
        let (bmp_w, bmp_h) = options.hash_bmp_size;
        let grid = blur::decode(hash, columns, rows)?;
        let bitmap = blur::decode(hash, bmp_w, bmp_h)?;
        let bmp = bmp_data_uri(&bitmap, bmp_w, bmp_h)?;
        Self::assemble(&bitmap, &grid, columns, rows, bmp, Some(hash.to_string()), options)
    }

    fn assemble(
        palette_pixels: &[u8],
        grid: &[u8],
        columns: u32,
        rows: u32,
        bmp: String,
        blurhash: Option<String>,
        options: &PlaceholderOptions,
    ) -> Result<Self> {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let (palette, dominant) = if options.perceptual {
            let seed = rng.random();
            let palette = get_perceptual_palette(palette_pixels, options.palette_colors, seed)?;
            let dominant = get_perceptual_palette(palette_pixels, DOMINANT_CLUSTERS, seed)?
                .into_iter()
                .next()
                .ok_or(PlaceholderError::EmptyBuffer)?;
            (palette, dominant)
        } else {
            let palette = get_palette_with_rng(palette_pixels, options.palette_colors, &mut rng)?;
            (palette, get_dominant_color_with_rng(palette_pixels, &mut rng)?)
        };

        Ok(Self {
            palette,
            dominant,
            columns,
            rows,
            gradients: pixels_to_css_gradients(grid, columns, rows)?,
            vars: pixels_to_css_vars(grid, columns, rows, &options.var_prefix)?,
            class: generate_gradient_css_class(cell_count(columns, rows), &options.var_prefix),
            bmp,
            blurhash,
        })
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png(img: RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn fit_keeps_aspect() {
        assert_eq!(scale_to_fit(800, 600, 4), (4, 3));
        assert_eq!(scale_to_fit(600, 800, 4), (3, 4));
        assert_eq!(scale_to_fit(1000, 10, 4), (4, 1));
        assert_eq!(scale_to_fit(2, 2, 4), (4, 4));
    }

    #[test]
    fn load_decodes_to_rgba() {
        let bytes = png(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255])));
        let (pixels, w, h) = load_rgba(&bytes).unwrap();
        assert_eq!((w, h), (3, 2));
        assert_eq!(&pixels[..4], &[1, 2, 3, 255]);
    }

    #[test]
    fn solid_image_placeholder() {
        let bytes = png(RgbaImage::from_pixel(40, 30, Rgba([200, 40, 10, 255])));
        let options = PlaceholderOptions {
            seed: Some(11),
            ..PlaceholderOptions::default()
        };
        let placeholder = Placeholder::from_image_bytes(&bytes, &options).unwrap();
        assert_eq!((placeholder.columns, placeholder.rows), (4, 3));
        assert_eq!(placeholder.gradients.len(), 12);
        assert!(placeholder.palette.iter().all(|c| *c == Color::new(200, 40, 10)));
        assert_eq!(placeholder.dominant, Color::new(200, 40, 10));
        assert!(placeholder.bmp.starts_with("data:image/bmp;base64,"));
        assert!(placeholder.class.contains("--p11,"));
        assert!(placeholder.blurhash.is_some());
    }

    fn decoded_bmp_size(uri: &str) -> (u32, u32) {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;

        let payload = uri.strip_prefix("data:image/bmp;base64,").unwrap();
        let bytes = STANDARD.decode(payload).unwrap();
        image::load_from_memory_with_format(&bytes, ImageFormat::Bmp)
            .unwrap()
            .dimensions()
    }

    fn close(a: Color, b: Color) -> bool {
        a.red.abs_diff(b.red) <= 1 && a.green.abs_diff(b.green) <= 1 && a.blue.abs_diff(b.blue) <= 1
    }

    #[test]
    fn image_bmp_uses_the_css_grid() {
        let bytes = png(RgbaImage::from_pixel(30, 40, Rgba([9, 90, 180, 255])));
        let options = PlaceholderOptions {
            seed: Some(3),
            blurhash_components: None,
            ..PlaceholderOptions::default()
        };
        let placeholder = Placeholder::from_image_bytes(&bytes, &options).unwrap();
        assert_eq!((placeholder.columns, placeholder.rows), (3, 4));
        assert_eq!(decoded_bmp_size(&placeholder.bmp), (3, 4));
    }

    #[test]
    fn hash_bmp_uses_its_own_size() {
        let options = PlaceholderOptions {
            seed: Some(3),
            hash_bmp_size: (8, 6),
            ..PlaceholderOptions::default()
        };
        let placeholder = Placeholder::from_blurhash("LkLgR,_NITIUMJIokDs:ROMxNHxu", &options).unwrap();
        assert_eq!(decoded_bmp_size(&placeholder.bmp), (8, 6));
        assert_eq!((placeholder.columns, placeholder.rows), (4, 3));
    }

    #[test]
    fn perceptual_mode_picks_dominant_in_lab() {
        let color = Color::new(200, 40, 10);
        let bytes = png(RgbaImage::from_pixel(40, 30, Rgba([200, 40, 10, 255])));
        let options = PlaceholderOptions {
            seed: Some(5),
            perceptual: true,
            blurhash_components: None,
            ..PlaceholderOptions::default()
        };
        let placeholder = Placeholder::from_image_bytes(&bytes, &options).unwrap();
        assert!(close(placeholder.dominant, color), "{:?}", placeholder.dominant);
        assert!(close(placeholder.palette[0], color), "{:?}", placeholder.palette[0]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn cell_count_does_not_wrap() {
        assert_eq!(cell_count(4, 3), 12);
        assert_eq!(cell_count(u32::MAX, 2), u32::MAX as usize * 2);
    }

    #[test]
    fn hash_placeholder() {
        let options = PlaceholderOptions {
            seed: Some(2),
            var_prefix: "h-".to_string(),
            ..PlaceholderOptions::default()
        };
        let placeholder = Placeholder::from_blurhash("LkLgR,_NITIUMJIokDs:ROMxNHxu", &options).unwrap();
        assert_eq!(placeholder.gradients.len(), 12);
        assert_eq!(placeholder.palette.len(), 8);
        assert!(placeholder.vars.starts_with("--h-p0:"));
        assert_eq!(placeholder.blurhash.as_deref(), Some("LkLgR,_NITIUMJIokDs:ROMxNHxu"));
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        let err = Placeholder::from_image_bytes(b"not an image", &PlaceholderOptions::default()).unwrap_err();
        assert!(matches!(err, crate::error::PlaceholderError::Image(_)));
    }
}
