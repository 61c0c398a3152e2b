//! Locating optional granule files.

use std::path::PathBuf;

/// Workspace root, two levels above this crate's manifest.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Look for `name` in `$TEST_DATA_DIR`, then `crates/velocity-reproject/testdata/`,
/// then `testdata/` at the workspace root.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let root = workspace_root();
    let env_dir = std::env::var("TEST_DATA_DIR").ok().map(PathBuf::from);

    env_dir
        .into_iter()
        .chain([
            root.join("crates").join("velocity-reproject").join("testdata"),
            root.join("testdata"),
        ])
        .map(|dir| dir.join(name))
        .find(|path| path.exists())
}
