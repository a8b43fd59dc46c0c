#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the dashboard data directory.
//!
//! Paths default to the workspace's `data/` directory and can be moved
//! with `CRIME_DASH_DATA_DIR` / `CRIME_DASH_OUTPUT_DIR`.

use std::path::{Path, PathBuf};

/// Environment variable overriding [`data_dir`].
pub const DATA_DIR_ENV: &str = "CRIME_DASH_DATA_DIR";

/// Environment variable overriding [`output_dir`].
pub const OUTPUT_DIR_ENV: &str = "CRIME_DASH_OUTPUT_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the directory holding the input `GeoJSON` files.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the directory the presentation shell writes its outputs to.
#[must_use]
pub fn output_dir() -> PathBuf {
    std::env::var_os(OUTPUT_DIR_ENV).map_or_else(|| data_dir().join("output"), PathBuf::from)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Locations of the three input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Event records (`NOPD_Item`, `TimeCreate`, `TypeText`,
    /// `census_tract`, point geometry).
    pub events: PathBuf,
    /// Marker records (point geometry).
    pub markers: PathBuf,
    /// Tract records (`tract`, polygon geometry).
    pub tracts: PathBuf,
}

impl DataPaths {
    /// Resolves the three file names against a data directory.
    #[must_use]
    pub fn in_dir(dir: &Path, events: &str, markers: &str, tracts: &str) -> Self {
        Self {
            events: dir.join(events),
            markers: dir.join(markers),
            tracts: dir.join(tracts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_files_against_dir() {
        let paths = DataPaths::in_dir(
            Path::new("/tmp/data"),
            "calls.geojson",
            "cameras.geojson",
            "tracts.geojson",
        );
        assert_eq!(paths.events, PathBuf::from("/tmp/data/calls.geojson"));
        assert_eq!(paths.markers, PathBuf::from("/tmp/data/cameras.geojson"));
        assert_eq!(paths.tracts, PathBuf::from("/tmp/data/tracts.geojson"));
    }

    #[test]
    fn project_root_contains_packages_dir() {
        assert!(project_root().join("packages").is_dir());
    }
}
