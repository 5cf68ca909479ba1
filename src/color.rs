//! Angle-to-color mapping for visualizing the grid
//!
//! Red follows `sin(angle1)`, green follows `sin(angle2)`, blue is fixed at
//! full intensity. The mapping has no state of its own.

use image::{Rgba, RgbaImage};

use crate::state::{CellState, GridView};

/// Color of a degenerate (non-finite) cell
pub const DEGENERATE_RGBA: [u8; 4] = [0, 0, 0, 255];

/// Map `sin(angle)` from [-1, 1] to [0, 1]
fn channel(angle: f64) -> f64 {
    (angle.sin() + 1.0) / 2.0
}

/// RGB in [0, 1] for one cell.
///
/// A non-finite angle yields a NaN channel.
pub fn cell_color(cell: &CellState) -> [f64; 3] {
    [channel(cell.angle1), channel(cell.angle2), 1.0]
}

/// 8-bit RGBA for one cell; non-finite cells are drawn black
pub fn cell_rgba8(cell: &CellState) -> [u8; 4] {
    if !cell.is_finite() {
        return DEGENERATE_RGBA;
    }
    let [r, g, b] = cell_color(cell);
    [to_u8(r), to_u8(g), to_u8(b), 255]
}

fn to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// One pixel per cell.
///
/// Row 0 of the grid is the bottom row of the image, so the picture has
/// the same orientation as a grid laid out with rows growing upward.
pub fn render_image(view: GridView<'_>) -> RgbaImage {
    let side = view.side() as u32;
    let mut image = RgbaImage::new(side, side);
    for (row, col, cell) in view.iter() {
        let y = side - 1 - row as u32;
        image.put_pixel(col as u32, y, Rgba(cell_rgba8(cell)));
    }
    image
}
