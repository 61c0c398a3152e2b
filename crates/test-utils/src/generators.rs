//! Test data generators for synthetic velocity granules.
//!
//! These generators create predictable, verifiable coordinate axes and
//! velocity fields that can be used across the test suite. Every data grid
//! is row-major with the northernmost row first, matching the granule
//! layout.

/// Cell-center x coordinates: `n` cells of `cell_size`, centered on `center`.
///
/// # Example
///
/// ```
/// use test_utils::centered_x_axis;
///
/// let x = centered_x_axis(4, 240.0, 0.0);
/// assert_eq!(x, vec![-360.0, -120.0, 120.0, 360.0]);
/// ```
pub fn centered_x_axis(n: usize, cell_size: f64, center: f64) -> Vec<f64> {
    let half = (n as f64 - 1.0) / 2.0;
    (0..n)
        .map(|i| center + (i as f64 - half) * cell_size)
        .collect()
}

/// Cell-center y coordinates, north to south (descending).
///
/// # Example
///
/// ```
/// use test_utils::centered_y_axis;
///
/// let y = centered_y_axis(4, 240.0, 0.0);
/// assert_eq!(y, vec![360.0, 120.0, -120.0, -360.0]);
/// ```
pub fn centered_y_axis(n: usize, cell_size: f64, center: f64) -> Vec<f64> {
    let half = (n as f64 - 1.0) / 2.0;
    (0..n)
        .map(|i| center - (i as f64 - half) * cell_size)
        .collect()
}

/// Creates a grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that a warp moved data to the right cell
/// by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a uniform flow field `(vx, vy)` of the given speed (m/yr) and
/// direction (degrees counter-clockwise from +x).
pub fn create_uniform_flow(
    width: usize,
    height: usize,
    speed: f32,
    direction_deg: f32,
) -> (Vec<f32>, Vec<f32>) {
    let (sin, cos) = direction_deg.to_radians().sin_cos();
    (
        create_constant_grid(width, height, speed * cos),
        create_constant_grid(width, height, speed * sin),
    )
}

/// Creates a glacier-like outlet flow: speed increases toward the
/// southern edge and the flow converges on the center column.
///
/// Values range from 50 m/yr at the top row to ~5000 m/yr at the bottom.
pub fn create_outlet_flow(width: usize, height: usize) -> (Vec<f32>, Vec<f32>) {
    let mut vx = Vec::with_capacity(width * height);
    let mut vy = Vec::with_capacity(width * height);
    let center = (width as f32 - 1.0) / 2.0;

    for row in 0..height {
        let t = row as f32 / height.saturating_sub(1).max(1) as f32;
        let speed = 50.0 * 100f32.powf(t);
        for col in 0..width {
            let lateral = if center > 0.0 {
                (center - col as f32) / center
            } else {
                0.0
            };
            // Mostly southward (negative y), bending toward the center
            vx.push(speed * 0.3 * lateral);
            vy.push(-speed);
        }
    }
    (vx, vy)
}

/// Replaces the given `(col, row)` cells with `fill`.
pub fn with_fill_cells(
    mut data: Vec<f32>,
    width: usize,
    cells: &[(usize, usize)],
    fill: f32,
) -> Vec<f32> {
    for &(col, row) in cells {
        let index = row * width + col;
        if col < width && index < data.len() {
            data[index] = fill;
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_are_uniform() {
        let x = centered_x_axis(5, 120.0, 1000.0);
        assert_eq!(x[2], 1000.0);
        assert!(x.windows(2).all(|w| w[1] - w[0] == 120.0));

        let y = centered_y_axis(3, 120.0, -500.0);
        assert_eq!(y, vec![-380.0, -500.0, -620.0]);
    }

    #[test]
    fn test_uniform_flow() {
        let (vx, vy) = create_uniform_flow(2, 2, 10.0, 90.0);
        assert!(vx.iter().all(|v| v.abs() < 1e-5));
        assert!(vy.iter().all(|v| (v - 10.0).abs() < 1e-5));
    }

    #[test]
    fn test_outlet_flow_speeds_up_downstream() {
        let (_, vy) = create_outlet_flow(3, 4);
        assert!(vy[0].abs() < vy[9].abs());
        assert!((vy[0] + 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_with_fill_cells() {
        let data = with_fill_cells(vec![1.0; 4], 2, &[(1, 1), (5, 5)], -32767.0);
        assert_eq!(data, vec![1.0, 1.0, 1.0, -32767.0]);
    }
}
