//! JavaScript bindings, named after the functions of the npm package.

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::blur::{self, CssObject, DEFAULT_BMP_SIZE};
use crate::color::{self, Color};
use crate::css::{self, DEFAULT_COLUMNS, DEFAULT_ROWS};
use crate::error::PlaceholderError;
use crate::{bmp, clustering};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn js_error(err: PlaceholderError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn color_to_js(c: Color) -> Array {
    Array::of3(&JsValue::from(c.red), &JsValue::from(c.green), &JsValue::from(c.blue))
}

fn strings_to_js(strings: Vec<String>) -> Array {
    strings.into_iter().map(JsValue::from).collect()
}

fn css_object_to_js(object: CssObject) -> Result<Object, JsValue> {
    let result = Object::new();
    Reflect::set(
        &result,
        &JsValue::from_str("backgroundImage"),
        &JsValue::from_str(&object.background_image),
    )?;
    if let Some(size) = object.background_size {
        Reflect::set(&result, &JsValue::from_str("backgroundSize"), &JsValue::from_str(&size))?;
    }
    Ok(result)
}

/// Palette of `[r, g, b]` arrays, most dominant first.
#[wasm_bindgen(js_name = getPalette)]
pub fn get_palette(pixels: &[u8], cluster_count: Option<u32>) -> Result<Array, JsValue> {
    let count = cluster_count.unwrap_or(8) as usize;
    let palette = clustering::get_palette(pixels, count).map_err(js_error)?;
    Ok(palette.into_iter().map(color_to_js).collect())
}

#[wasm_bindgen(js_name = getDominantColor)]
pub fn get_dominant_color(pixels: &[u8]) -> Result<Array, JsValue> {
    clustering::get_dominant_color(pixels).map(color_to_js).map_err(js_error)
}

#[wasm_bindgen(js_name = rgbColorToCssString)]
pub fn rgb_color_to_css_string(red: u8, green: u8, blue: u8) -> String {
    color::to_css_rgb(Color::new(red, green, blue))
}

#[wasm_bindgen(js_name = rgbaPixelsToBmp)]
pub fn rgba_pixels_to_bmp(pixels: &[u8], width: u32, height: u32) -> Result<Uint8Array, JsValue> {
    let bytes = bmp::rgba_pixels_to_bmp(pixels, width, height).map_err(js_error)?;
    Ok(Uint8Array::from(bytes.as_slice()))
}

#[wasm_bindgen(js_name = imageDataToDataURI)]
pub fn image_data_to_data_uri(data: &[u8], mime_type: &str) -> String {
    bmp::data_uri(data, mime_type)
}

#[wasm_bindgen(js_name = pixelsToCssGradients)]
pub fn pixels_to_css_gradients(pixels: &[u8], columns: u32, rows: u32) -> Result<Array, JsValue> {
    css::pixels_to_css_gradients(pixels, columns, rows)
        .map(strings_to_js)
        .map_err(js_error)
}

#[wasm_bindgen(js_name = pixelsToCssVars)]
pub fn pixels_to_css_vars(
    pixels: &[u8],
    columns: u32,
    rows: u32,
    prefix: Option<String>,
) -> Result<String, JsValue> {
    css::pixels_to_css_vars(pixels, columns, rows, prefix.as_deref().unwrap_or_default())
        .map_err(js_error)
}

#[wasm_bindgen(js_name = generateGradientCssClass)]
pub fn generate_gradient_css_class(total_gradients: u32, prefix: Option<String>) -> String {
    css::generate_gradient_css_class(total_gradients as usize, prefix.as_deref().unwrap_or_default())
}

#[wasm_bindgen(js_name = blurhashToDataUri)]
pub fn blurhash_to_data_uri(hash: &str, width: Option<u32>, height: Option<u32>) -> Result<String, JsValue> {
    blur::blurhash_to_data_uri(
        hash,
        width.unwrap_or(DEFAULT_BMP_SIZE),
        height.unwrap_or(DEFAULT_BMP_SIZE),
    )
    .map_err(js_error)
}

#[wasm_bindgen(js_name = blurhashToCssGradients)]
pub fn blurhash_to_css_gradients(hash: &str, columns: Option<u32>, rows: Option<u32>) -> Result<Array, JsValue> {
    blur::blurhash_to_css_gradients(
        hash,
        columns.unwrap_or(DEFAULT_COLUMNS),
        rows.unwrap_or(DEFAULT_ROWS),
    )
    .map(strings_to_js)
    .map_err(js_error)
}

#[wasm_bindgen(js_name = blurhashToCssGradientString)]
pub fn blurhash_to_css_gradient_string(
    hash: &str,
    columns: Option<u32>,
    rows: Option<u32>,
) -> Result<String, JsValue> {
    blur::blurhash_to_css_gradient_string(
        hash,
        columns.unwrap_or(DEFAULT_COLUMNS),
        rows.unwrap_or(DEFAULT_ROWS),
    )
    .map_err(js_error)
}

#[wasm_bindgen(js_name = blurhashToGradientCssObject)]
pub fn blurhash_to_gradient_css_object(
    hash: &str,
    columns: Option<u32>,
    rows: Option<u32>,
) -> Result<Object, JsValue> {
    let object = blur::blurhash_to_gradient_css_object(
        hash,
        columns.unwrap_or(DEFAULT_COLUMNS),
        rows.unwrap_or(DEFAULT_ROWS),
    )
    .map_err(js_error)?;
    css_object_to_js(object)
}

#[wasm_bindgen(js_name = blurhashToImageCssObject)]
pub fn blurhash_to_image_css_object(
    hash: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<Object, JsValue> {
    let object = blur::blurhash_to_image_css_object(
        hash,
        width.unwrap_or(DEFAULT_BMP_SIZE),
        height.unwrap_or(DEFAULT_BMP_SIZE),
    )
    .map_err(js_error)?;
    css_object_to_js(object)
}

#[wasm_bindgen(js_name = blurhashToImageCssString)]
pub fn blurhash_to_image_css_string(
    hash: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<String, JsValue> {
    blur::blurhash_to_image_css_string(
        hash,
        width.unwrap_or(DEFAULT_BMP_SIZE),
        height.unwrap_or(DEFAULT_BMP_SIZE),
    )
    .map_err(js_error)
}
