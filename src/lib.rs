//! Low quality image placeholders.
//!
//! Turns RGBA pixels (from an image or a decoded blurhash) into things that
//! can be inlined while the real image loads:
//!
//! - a palette and dominant color, via k-means ([`get_palette`])
//! - a tiny BMP as a data URI ([`rgba_pixels_to_bmp`], [`data_uri`])
//! - CSS radial gradients, either inline ([`pixels_to_css_gradients`]) or as
//!   custom properties plus one shared class ([`pixels_to_css_vars`],
//!   [`generate_gradient_css_class`])
//!
//! Pixel buffers are always `width * height * 4` bytes of RGBA, top row
//! first.

pub mod blur;
pub mod bmp;
pub mod clustering;
pub mod color;
pub mod css;
pub mod error;
pub mod source;
pub mod wasm;

pub use blur::{
    CssObject, blurhash_to_css_gradient_string, blurhash_to_css_gradients, blurhash_to_data_uri,
    blurhash_to_gradient_css_object, blurhash_to_image_css_object, blurhash_to_image_css_string,
};
pub use bmp::{bmp_data_uri, data_uri, rgba_pixels_to_bmp};
pub use clustering::{
    Cluster, KMeansOptions, get_dominant_color, get_dominant_color_with_rng, get_palette,
    get_palette_with_rng, get_perceptual_palette, k_means_clusters,
};
pub use color::{Color, PixelBuffer, luminance, to_css_rgb, to_hex};
pub use css::{
    GridCell, generate_gradient_css_class, pixels_to_css_gradient_string, pixels_to_css_gradients,
    pixels_to_css_vars, sorted_grid_cells,
};
pub use error::{PlaceholderError, Result};
pub use source::{Placeholder, PlaceholderOptions, load_rgba, scale_to_fit};
