//! Pure CSS placeholders built from a tiny pixel grid.
//!
//! Every cell becomes one radial gradient anchored at the cell's position.
//! Cells are emitted brightest first rather than in scan order, so images
//! sharing a set of colors produce the same sequence regardless of
//! orientation, which keeps the output compressing the same way.

use std::fmt::Write;

use crate::color::{Color, PixelBuffer, luminance, to_hex};
use crate::error::Result;

pub const DEFAULT_COLUMNS: u32 = 4;
pub const DEFAULT_ROWS: u32 = 3;

/// One decoded grid position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCell {
    pub column: u32,
    pub row: u32,
    pub color: Color,
    pub luminance: f64,
}

impl GridCell {
    /// Horizontal position in whole percent, 0 for a single column.
    pub fn percent_x(&self, columns: u32) -> u32 {
        axis_percent(self.column, columns)
    }

    /// Vertical position in whole percent, 0 for a single row.
    pub fn percent_y(&self, rows: u32) -> u32 {
        axis_percent(self.row, rows)
    }
}

fn axis_percent(position: u32, cells: u32) -> u32 {
    if cells <= 1 {
        return 0;
    }
    (position as f64 / (cells - 1) as f64 * 100.0).round() as u32
}

// Save some bytes
fn percent_or_zero(value: u32) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("{value}%")
    }
}

/// Cells of a `columns x rows` grid ordered by descending luminance.
///
/// Ties keep scan order. Both CSS builders walk this order, so gradient `i`
/// and custom property index `i` always describe the same cell.
pub fn sorted_grid_cells(pixels: &[u8], columns: u32, rows: u32) -> Result<Vec<GridCell>> {
    let buffer = PixelBuffer::new(pixels, columns, rows)?;
    let mut cells: Vec<GridCell> = buffer
        .colors()
        .enumerate()
        .map(|(index, color)| GridCell {
            column: index as u32 % columns,
            row: index as u32 / columns,
            color,
            luminance: luminance(color),
        })
        .collect();
    cells.sort_by(|a, b| b.luminance.total_cmp(&a.luminance));
    Ok(cells)
}

/// One `radial-gradient()` per grid cell, ready to be comma-joined into a
/// `background-image` value.
///
/// `#00000000` is used over `transparent` because it is shorter.
pub fn pixels_to_css_gradients(pixels: &[u8], columns: u32, rows: u32) -> Result<Vec<String>> {
    let cells = sorted_grid_cells(pixels, columns, rows)?;
    Ok(cells
        .iter()
        .map(|cell| {
            format!(
                "radial-gradient(at {} {},{},#00000000 50%)",
                percent_or_zero(cell.percent_x(columns)),
                percent_or_zero(cell.percent_y(rows)),
                to_hex(cell.color)
            )
        })
        .collect())
}

pub fn pixels_to_css_gradient_string(pixels: &[u8], columns: u32, rows: u32) -> Result<String> {
    Ok(pixels_to_css_gradients(pixels, columns, rows)?.join(","))
}

/// Custom properties for use with [`generate_gradient_css_class`]:
/// `--{prefix}p{i}:X% Y%;--{prefix}c{i}:#rrggbb;` for each cell.
pub fn pixels_to_css_vars(pixels: &[u8], columns: u32, rows: u32, prefix: &str) -> Result<String> {
    let cells = sorted_grid_cells(pixels, columns, rows)?;
    let mut out = String::with_capacity(cells.len() * (prefix.len() * 2 + 32));
    for (index, cell) in cells.iter().enumerate() {
        write!(
            out,
            "--{prefix}p{index}:{}% {}%;--{prefix}c{index}:{};",
            cell.percent_x(columns),
            cell.percent_y(rows),
            to_hex(cell.color)
        )
        .expect("writing to a String cannot fail");
    }
    Ok(out)
}

/// Shared rule body that paints whatever [`pixels_to_css_vars`] sets.
///
/// Include it once per stylesheet; each placeholder then only carries its
/// custom properties. Unset properties fall back to a transparent gradient.
/// Zero gradients give `background-image:none`.
pub fn generate_gradient_css_class(total_gradients: usize, prefix: &str) -> String {
    if total_gradients == 0 {
        return "background-image:none;background-size:cover;".to_string();
    }
    let gradients: Vec<String> = (0..total_gradients)
        .map(|i| {
            format!(
                "radial-gradient(at var(--{prefix}p{i},0 0), var(--{prefix}c{i},#000) 0%, transparent 50%)"
            )
        })
        .collect();
    format!("background-image:{};background-size:cover;", gradients.join(","))
}
