//! Interpolation kernels for sampling a raster at fractional cell indices.
//!
//! Index `(col, row)` addresses cell centers: `(0.0, 0.0)` is the center of
//! the first cell. Missing values (NaN) are never blended into a result.

use crate::types::InterpolationMethod;

/// Read-only row-major raster.
#[derive(Debug, Clone, Copy)]
pub struct RasterView<'a> {
    data: &'a [f32],
    width: usize,
    height: usize,
}

impl<'a> RasterView<'a> {
    /// Wrap `data`; `None` unless it holds exactly `width * height` values.
    pub fn new(data: &'a [f32], width: usize, height: usize) -> Option<Self> {
        (width > 0 && height > 0 && data.len() == width * height).then_some(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at integer indices, clamped to the raster edge.
    fn clamped(&self, col: i64, row: i64) -> Option<f32> {
        let col = col.clamp(0, self.width as i64 - 1) as usize;
        let row = row.clamp(0, self.height as i64 - 1) as usize;
        let value = self.data[row * self.width + col];
        (!value.is_nan()).then_some(value)
    }

    /// Whether a fractional index falls on the raster's cell footprint.
    pub fn covers(&self, col: f64, row: f64) -> bool {
        col >= -0.5 && col <= self.width as f64 - 0.5 && row >= -0.5 && row <= self.height as f64 - 0.5
    }
}

/// Sample with the given method. `None` for missing or uncovered cells.
pub fn sample(view: &RasterView<'_>, method: InterpolationMethod, col: f64, row: f64) -> Option<f32> {
    if !view.covers(col, row) {
        return None;
    }
    match method {
        InterpolationMethod::Nearest => nearest(view, col, row),
        InterpolationMethod::Bilinear => bilinear(view, col, row),
        InterpolationMethod::Cubic => cubic(view, col, row),
    }
}

/// Nearest neighbor interpolation.
pub fn nearest(view: &RasterView<'_>, col: f64, row: f64) -> Option<f32> {
    view.clamped(col.round() as i64, row.round() as i64)
}

/// Bilinear interpolation over the four surrounding cell centers.
///
/// A missing corner with non-zero weight makes the result missing, so a
/// sample exactly on a cell center only needs that cell.
pub fn bilinear(view: &RasterView<'_>, col: f64, row: f64) -> Option<f32> {
    let col = col.clamp(0.0, (view.width - 1) as f64);
    let row = row.clamp(0.0, (view.height - 1) as f64);
    let c0 = col.floor() as i64;
    let r0 = row.floor() as i64;

    let cf = (col - c0 as f64) as f32;
    let rf = (row - r0 as f64) as f32;

    let corners = [
        (c0, r0, (1.0 - cf) * (1.0 - rf)),
        (c0 + 1, r0, cf * (1.0 - rf)),
        (c0, r0 + 1, (1.0 - cf) * rf),
        (c0 + 1, r0 + 1, cf * rf),
    ];

    let mut value = 0.0f32;
    for (c, r, weight) in corners {
        if weight > 0.0 {
            value += weight * view.clamped(c, r)?;
        }
    }
    Some(value)
}

/// Bicubic (Catmull-Rom) interpolation over a 4x4 neighborhood.
///
/// Falls back to bilinear when any of the 16 neighbors is missing.
pub fn cubic(view: &RasterView<'_>, col: f64, row: f64) -> Option<f32> {
    let col = col.clamp(0.0, (view.width - 1) as f64);
    let row = row.clamp(0.0, (view.height - 1) as f64);
    let ci = col.floor() as i64;
    let ri = row.floor() as i64;

    let cf = (col - ci as f64) as f32;
    let rf = (row - ri as f64) as f32;

    let mut rows = [0.0f32; 4];
    for (j, slot) in rows.iter_mut().enumerate() {
        let r = ri + j as i64 - 1;
        let mut p = [0.0f32; 4];
        for (i, value) in p.iter_mut().enumerate() {
            match view.clamped(ci + i as i64 - 1, r) {
                Some(v) => *value = v,
                None => return bilinear(view, col, row),
            }
        }
        *slot = catmull_rom(p, cf);
    }

    Some(catmull_rom(rows, rf))
}

/// 1D cubic interpolation using Catmull-Rom spline.
fn catmull_rom(p: [f32; 4], t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let a = -0.5 * p[0] + 1.5 * p[1] - 1.5 * p[2] + 0.5 * p[3];
    let b = p[0] - 2.5 * p[1] + 2.0 * p[2] - 0.5 * p[3];
    let c = -0.5 * p[0] + 0.5 * p[2];
    let d = p[1];

    a * t3 + b * t2 + c * t + d
}
