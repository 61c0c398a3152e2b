//! Common test fixtures for reprojection tests.
//!
//! This module provides pre-defined grids and coordinates that represent
//! common scenarios for ITS_LIVE granules.

/// Projections used by ITS_LIVE granules.
pub mod crs {
    use velocity_common::EpsgCode;

    /// NSIDC Sea Ice Polar Stereographic North (Greenland mosaics)
    pub const POLAR_NORTH: EpsgCode = EpsgCode::POLAR_NORTH;

    /// UTM zone 22N (west Greenland scene pairs)
    pub const UTM_22N: EpsgCode = EpsgCode::new(32622);
}

/// Common grid layouts for testing.
pub mod grid {
    use crate::generators::{centered_x_axis, centered_y_axis};

    /// 4x4 cells of 240 m centered on the origin.
    pub const SMALL_4X4: GridSpec = GridSpec {
        nx: 4,
        ny: 4,
        cell_size: 240.0,
        center_x: 0.0,
        center_y: 0.0,
    };

    /// 240 m grid near Jakobshavn Isbrae in UTM 22N.
    pub const JAKOBSHAVN_UTM: GridSpec = GridSpec {
        nx: 24,
        ny: 20,
        cell_size: 240.0,
        center_x: 534_000.0,
        center_y: 7_674_000.0,
    };

    /// Cell-center grid layout.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct GridSpec {
        pub nx: usize,
        pub ny: usize,
        pub cell_size: f64,
        pub center_x: f64,
        pub center_y: f64,
    }

    impl GridSpec {
        /// Total number of cells
        pub fn size(&self) -> usize {
            self.nx * self.ny
        }

        /// Cell-center x axis (ascending).
        pub fn x(&self) -> Vec<f64> {
            centered_x_axis(self.nx, self.cell_size, self.center_x)
        }

        /// Cell-center y axis (descending).
        pub fn y(&self) -> Vec<f64> {
            centered_y_axis(self.ny, self.cell_size, self.center_y)
        }

        /// Cell-boundary extent as (min_x, min_y, max_x, max_y).
        pub fn extent(&self) -> (f64, f64, f64, f64) {
            let half_w = self.nx as f64 * self.cell_size / 2.0;
            let half_h = self.ny as f64 * self.cell_size / 2.0;
            (
                self.center_x - half_w,
                self.center_y - half_h,
                self.center_x + half_w,
                self.center_y + half_h,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::grid::*;

    #[test]
    fn test_small_grid_extent() {
        assert_eq!(SMALL_4X4.extent(), (-480.0, -480.0, 480.0, 480.0));
        assert_eq!(SMALL_4X4.size(), 16);
        assert_eq!(SMALL_4X4.x(), vec![-360.0, -120.0, 120.0, 360.0]);
    }

    #[test]
    fn test_utm_grid_axes() {
        let x = JAKOBSHAVN_UTM.x();
        let y = JAKOBSHAVN_UTM.y();
        assert_eq!(x.len(), 24);
        assert_eq!(y.len(), 20);
        assert!(y[0] > y[1]);
        assert_eq!(x[1] - x[0], 240.0);
    }
}
