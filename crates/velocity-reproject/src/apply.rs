//! Application of cell transforms to warped velocity components.

use crate::types::CellTransform;

/// Re-express warped `(vx, vy)` in the destination basis.
///
/// Cells with a NODATA transform, or where either warped component is the
/// fill value or non-finite, get `nodata` in both outputs.
pub fn apply_transforms(
    cells: &[CellTransform],
    vx: &[f32],
    vy: &[f32],
    nodata: f32,
) -> (Vec<f32>, Vec<f32>) {
    debug_assert_eq!(cells.len(), vx.len());
    debug_assert_eq!(cells.len(), vy.len());

    cells
        .iter()
        .zip(vx.iter().zip(vy))
        .map(|(cell, (&u, &v))| {
            if u == nodata || v == nodata || !u.is_finite() || !v.is_finite() {
                return (nodata, nodata);
            }
            match cell.apply(u as f64, v as f64) {
                Some((x, y)) => (x as f32, y as f32),
                None => (nodata, nodata),
            }
        })
        .unzip()
}

/// Speed magnitude `hypot(vx, vy)`, propagating `nodata`.
pub fn speed(vx: &[f32], vy: &[f32], nodata: f32) -> Vec<f32> {
    vx.iter()
        .zip(vy)
        .map(|(&u, &v)| {
            if u == nodata || v == nodata {
                nodata
            } else {
                u.hypot(v)
            }
        })
        .collect()
}
