#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard configuration.
//!
//! Defaults live in `config/default.toml`, embedded at compile time. A
//! user file named by `CRIME_DASH_CONFIG` is merged over the defaults
//! key by key, so it only needs the values it changes.

use std::path::Path;

use crime_dash_dataset::paths::{self, DataPaths};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a user configuration file.
pub const CONFIG_ENV: &str = "CRIME_DASH_CONFIG";

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or does not match the schema.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// Full dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Input file names.
    pub data: DataConfig,
    /// Base map settings.
    pub map: MapConfig,
    /// Choropleth styling.
    pub choropleth: ChoroplethConfig,
    /// Point cluster summary settings.
    pub cluster: ClusterConfig,
}

/// Input file names, resolved against [`paths::data_dir`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Event `GeoJSON` file.
    pub events: String,
    /// Marker `GeoJSON` file.
    pub markers: String,
    /// Tract polygon `GeoJSON` file.
    pub tracts: String,
}

/// Base map settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial map center as `[latitude, longitude]`.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: u8,
    /// Tile set name.
    pub tiles: String,
    /// Marker circle color.
    pub marker_color: String,
    /// Tract outline color.
    pub outline_color: String,
    /// Tract outline stroke weight.
    pub outline_weight: f64,
}

/// Choropleth styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethConfig {
    /// Sequential color palette name (e.g. `YlGnBu`).
    pub palette: String,
    /// Number of graduated color bins.
    pub bins: usize,
    /// Polygon fill opacity.
    pub fill_opacity: f64,
    /// Polygon outline opacity.
    pub line_opacity: f64,
    /// Fill for tracts with no matching rows.
    pub no_data_color: String,
    /// Legend caption.
    pub legend_name: String,
}

/// Point cluster summary settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// H3 resolution used to group call points (0-15).
    pub h3_resolution: u8,
}

impl DashboardConfig {
    /// Returns the embedded default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. Since it is a
    /// compile-time constant, a failure indicates a development error and
    /// is caught by tests.
    #[must_use]
    pub fn embedded() -> Self {
        Self::parse(DEFAULT_CONFIG)
            .unwrap_or_else(|e| panic!("Failed to parse embedded default config: {e}"))
    }

    /// Parses a configuration document, merged over the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid TOML, does not
    /// match the schema, or holds out-of-range values.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut base: toml::Table = toml::from_str(DEFAULT_CONFIG)?;
        let overlay: toml::Table = toml::from_str(text)?;
        merge_tables(&mut base, overlay);

        let config: Self = toml::Value::Table(base).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Loads the file named by `CRIME_DASH_CONFIG`, or the embedded
    /// defaults when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the named file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = Path::new(&path);
                log::info!("Loading config from {}", path.display());
                Self::load_from(path)
            }
            None => {
                log::debug!("{CONFIG_ENV} not set, using embedded defaults");
                Self::parse("")
            }
        }
    }

    /// Resolves the input files against the data directory.
    #[must_use]
    pub fn data_paths(&self) -> DataPaths {
        DataPaths::in_dir(
            &paths::data_dir(),
            &self.data.events,
            &self.data.markers,
            &self.data.tracts,
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=9).contains(&self.choropleth.bins) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "choropleth.bins must be between 2 and 9, got {}",
                    self.choropleth.bins
                ),
            });
        }
        if self.cluster.h3_resolution > 15 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "cluster.h3_resolution must be between 0 and 15, got {}",
                    self.cluster.h3_resolution
                ),
            });
        }
        for (name, value) in [
            ("choropleth.fill_opacity", self.choropleth.fill_opacity),
            ("choropleth.line_opacity", self.choropleth.line_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be between 0 and 1, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Recursively merges `overlay` into `base`. Nested tables merge key by
/// key; any other value replaces the base value.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
