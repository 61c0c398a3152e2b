//! Shared test utilities for the velocity reprojection workspace.
//!
//! - Synthetic cell-center axes and velocity fields
//! - Grid and projection fixtures for ITS_LIVE scenes
//! - Coordinate transform doubles (counting, failing, with holes)
//! - Lookup of optional granule files for tests that need real data
//!
//! ```ignore
//! use test_utils::{fixtures, CountingTransform};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;
pub mod transforms;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;
pub use transforms::*;

/// Skip a test when a granule file is not available.
///
/// Real granules are too large to check in. Point `TEST_DATA_DIR` at a
/// directory holding them, or drop them into `testdata/`.
///
/// ```ignore
/// #[test]
/// fn test_read_granule() {
///     let path = test_utils::require_test_file!("jakobshavn_sample.nc");
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: granule '{}' not found. Set TEST_DATA_DIR or add it to testdata/.",
                    $name
                );
                return;
            }
        }
    }};
}
