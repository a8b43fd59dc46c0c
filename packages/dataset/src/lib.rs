#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data loading and the in-memory dataset store.
//!
//! Reads the three geocoded `GeoJSON` files (events, markers, tract
//! polygons) once at startup and holds them in an immutable
//! [`DatasetStore`]. Any load failure is fatal; the dashboard cannot
//! start without a complete dataset.

pub mod loader;
pub mod parsing;
pub mod paths;
pub mod progress;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use crime_dash_dataset_models::{Event, Marker, TractPolygon};
use geo::{BoundingRect, Rect};
use thiserror::Error;

use crate::paths::DataPaths;
use crate::progress::ProgressCallback;

/// Errors that can occur while loading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file is not valid `GeoJSON`.
    #[error("Invalid GeoJSON in {path}: {source}")]
    GeoJson {
        /// File that failed.
        path: String,
        /// Underlying parse error.
        source: Box<geojson::Error>,
    },

    /// A file parsed, but is not a `FeatureCollection`.
    #[error("{path} is not a GeoJSON FeatureCollection")]
    NotFeatureCollection {
        /// File that failed.
        path: String,
    },

    /// A required property is absent or null.
    #[error("{path}: feature {index} is missing required property '{field}'")]
    MissingProperty {
        /// File that failed.
        path: String,
        /// Zero-based feature index.
        index: usize,
        /// Property name.
        field: &'static str,
    },

    /// A property is present but cannot be interpreted.
    #[error("{path}: feature {index} has invalid '{field}': {message}")]
    InvalidProperty {
        /// File that failed.
        path: String,
        /// Zero-based feature index.
        index: usize,
        /// Property name.
        field: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A geometry is missing or of the wrong type.
    #[error("{path}: feature {index} has invalid geometry: {message}")]
    InvalidGeometry {
        /// File that failed.
        path: String,
        /// Zero-based feature index.
        index: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Two tract features share an id.
    #[error("{path}: duplicate tract '{tract}'")]
    DuplicateTract {
        /// File that failed.
        path: String,
        /// The repeated tract id.
        tract: String,
    },
}

/// The three immutable tables the dashboard explores.
///
/// Events are kept sorted ascending by creation time (ties keep file
/// order), so every derived view that preserves row order is also
/// time-ordered.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    events: Vec<Event>,
    markers: Vec<Marker>,
    tracts: Vec<TractPolygon>,
}

impl DatasetStore {
    /// Builds a store, sorting events by timestamp.
    #[must_use]
    pub fn new(mut events: Vec<Event>, markers: Vec<Marker>, tracts: Vec<TractPolygon>) -> Self {
        events.sort_by_key(|event| event.time_created);
        Self {
            events,
            markers,
            tracts,
        }
    }

    /// All events, ascending by timestamp.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// All fixed-location markers.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// All tract polygons, in file order.
    #[must_use]
    pub fn tracts(&self) -> &[TractPolygon] {
        &self.tracts
    }

    /// Sorted tract ids from the polygon table, the tract filter vocabulary.
    #[must_use]
    pub fn tract_options(&self) -> Vec<String> {
        let ids: BTreeSet<&str> = self.tracts.iter().map(|t| t.tract_id.as_str()).collect();
        ids.into_iter().map(str::to_owned).collect()
    }

    /// Sorted distinct call types seen in the events.
    #[must_use]
    pub fn call_type_options(&self) -> Vec<String> {
        let types: BTreeSet<&str> = self.events.iter().map(|e| e.call_type.as_str()).collect();
        types.into_iter().map(str::to_owned).collect()
    }

    /// Earliest and latest calendar dates across all events, or `None`
    /// for an empty event table.
    #[must_use]
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.events.first()?;
        let last = self.events.last()?;
        Some((first.date(), last.date()))
    }

    /// Bounding rectangle of all tract polygons.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.tracts
            .iter()
            .filter_map(|t| t.geometry.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }
}

/// Loads all three input files into a [`DatasetStore`].
///
/// # Errors
///
/// Returns [`DatasetError`] if any file is missing or malformed.
pub fn load_dataset(
    paths: &DataPaths,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<DatasetStore, DatasetError> {
    progress.set_total(3);

    progress.set_message(format!("Loading events from {}", paths.events.display()));
    let events = loader::events_from_features(
        &loader::read_feature_collection(&paths.events)?,
        &paths.events,
    )?;
    log::info!(
        "Loaded {} events from {}",
        events.len(),
        paths.events.display()
    );
    progress.inc(1);

    progress.set_message(format!("Loading markers from {}", paths.markers.display()));
    let markers = loader::markers_from_features(
        &loader::read_feature_collection(&paths.markers)?,
        &paths.markers,
    )?;
    log::info!(
        "Loaded {} markers from {}",
        markers.len(),
        paths.markers.display()
    );
    progress.inc(1);

    progress.set_message(format!("Loading tracts from {}", paths.tracts.display()));
    let tracts = loader::tracts_from_features(
        &loader::read_feature_collection(&paths.tracts)?,
        &paths.tracts,
    )?;
    log::info!(
        "Loaded {} tracts from {}",
        tracts.len(),
        paths.tracts.display()
    );
    progress.inc(1);

    let store = DatasetStore::new(events, markers, tracts);

    let known: BTreeSet<&str> = store.tracts.iter().map(|t| t.tract_id.as_str()).collect();
    let unmatched = store
        .events
        .iter()
        .filter(|e| !known.contains(e.census_tract.as_str()))
        .count();
    if unmatched > 0 {
        log::warn!("{unmatched} events reference a tract with no polygon");
    }

    progress.finish(format!("Loaded {} events", store.events.len()));
    Ok(store)
}
