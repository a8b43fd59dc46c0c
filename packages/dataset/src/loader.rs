//! Converts `GeoJSON` feature collections into dataset records.
//!
//! Each file must be a `FeatureCollection`. Required properties that are
//! missing or malformed abort the load; there is no partial dataset.

use std::collections::BTreeSet;
use std::path::Path;

use crime_dash_dataset_models::{Event, GeoPoint, Marker, TractPolygon};
use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, GeoJson};

use crate::DatasetError;
use crate::parsing::{text_from_value, timestamp_from_value};

/// Event property holding the unique item number.
pub const EVENT_ID_FIELD: &str = "NOPD_Item";
/// Event property holding the creation timestamp.
pub const EVENT_TIME_FIELD: &str = "TimeCreate";
/// Event property holding the call-type label.
pub const EVENT_TYPE_FIELD: &str = "TypeText";
/// Event property holding the census tract id.
pub const EVENT_TRACT_FIELD: &str = "census_tract";
/// Tract property holding the tract id.
pub const TRACT_ID_FIELD: &str = "tract";

/// Reads and parses a `GeoJSON` file as a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, is not valid
/// `GeoJSON`, or is not a `FeatureCollection`.
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection, DatasetError> {
    let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_feature_collection(&text, path)
}

/// Parses `GeoJSON` text as a `FeatureCollection`. `path` is only used
/// for error messages.
///
/// # Errors
///
/// Returns [`DatasetError`] if the text is not valid `GeoJSON` or is not
/// a `FeatureCollection`.
pub fn parse_feature_collection(text: &str, path: &Path) -> Result<FeatureCollection, DatasetError> {
    let geojson: GeoJson = text.parse().map_err(|source| DatasetError::GeoJson {
        path: path.display().to_string(),
        source: Box::new(source),
    })?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => Err(DatasetError::NotFeatureCollection {
            path: path.display().to_string(),
        }),
    }
}

/// Converts event features into [`Event`] records, in file order.
///
/// # Errors
///
/// Returns [`DatasetError`] if a required property is missing or
/// malformed, or if a non-null geometry is not a point.
pub fn events_from_features(
    collection: &FeatureCollection,
    path: &Path,
) -> Result<Vec<Event>, DatasetError> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let context = FeatureContext { path, index };

            let id = context.required_text(feature, EVENT_ID_FIELD)?;
            let time_value = context.required_value(feature, EVENT_TIME_FIELD)?;
            let time_created = timestamp_from_value(time_value).ok_or_else(|| {
                context.invalid(EVENT_TIME_FIELD, format!("unparseable timestamp {time_value}"))
            })?;
            let call_type = context.required_text(feature, EVENT_TYPE_FIELD)?;
            let census_tract = context.required_text(feature, EVENT_TRACT_FIELD)?;
            let location = context.optional_point(feature)?;

            Ok(Event {
                id,
                time_created,
                call_type,
                census_tract,
                location,
            })
        })
        .collect()
}

/// Converts marker features into [`Marker`] records.
///
/// # Errors
///
/// Returns [`DatasetError`] if a feature has no point geometry.
pub fn markers_from_features(
    collection: &FeatureCollection,
    path: &Path,
) -> Result<Vec<Marker>, DatasetError> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let context = FeatureContext { path, index };
            let location = context
                .optional_point(feature)?
                .ok_or_else(|| context.invalid_geometry("marker geometry is null"))?;
            Ok(Marker { location })
        })
        .collect()
}

/// Converts tract features into [`TractPolygon`] records.
///
/// # Errors
///
/// Returns [`DatasetError`] if a tract id is missing or duplicated, or a
/// geometry is not a `Polygon`/`MultiPolygon`.
pub fn tracts_from_features(
    collection: &FeatureCollection,
    path: &Path,
) -> Result<Vec<TractPolygon>, DatasetError> {
    let mut seen = BTreeSet::new();
    let mut tracts = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.iter().enumerate() {
        let context = FeatureContext { path, index };
        let tract_id = context.required_text(feature, TRACT_ID_FIELD)?;

        if !seen.insert(tract_id.clone()) {
            return Err(DatasetError::DuplicateTract {
                path: path.display().to_string(),
                tract: tract_id,
            });
        }

        let geometry = context.multi_polygon(feature)?;
        tracts.push(TractPolygon { tract_id, geometry });
    }

    Ok(tracts)
}

/// Location of a feature inside its file, for error reporting.
struct FeatureContext<'a> {
    path: &'a Path,
    index: usize,
}

impl FeatureContext<'_> {
    fn required_value<'f>(
        &self,
        feature: &'f Feature,
        field: &'static str,
    ) -> Result<&'f serde_json::Value, DatasetError> {
        feature
            .property(field)
            .filter(|value| !value.is_null())
            .ok_or_else(|| DatasetError::MissingProperty {
                path: self.path.display().to_string(),
                index: self.index,
                field,
            })
    }

    fn required_text(&self, feature: &Feature, field: &'static str) -> Result<String, DatasetError> {
        let value = self.required_value(feature, field)?;
        text_from_value(value)
            .ok_or_else(|| self.invalid(field, format!("expected text, found {value}")))
    }

    fn invalid(&self, field: &'static str, message: String) -> DatasetError {
        DatasetError::InvalidProperty {
            path: self.path.display().to_string(),
            index: self.index,
            field,
            message,
        }
    }

    fn invalid_geometry(&self, message: impl Into<String>) -> DatasetError {
        DatasetError::InvalidGeometry {
            path: self.path.display().to_string(),
            index: self.index,
            message: message.into(),
        }
    }

    fn geometry(&self, feature: &Feature) -> Result<Option<geo::Geometry<f64>>, DatasetError> {
        let Some(geometry) = &feature.geometry else {
            return Ok(None);
        };
        geo::Geometry::<f64>::try_from(geometry.value.clone())
            .map(Some)
            .map_err(|e| self.invalid_geometry(e.to_string()))
    }

    fn optional_point(&self, feature: &Feature) -> Result<Option<GeoPoint>, DatasetError> {
        match self.geometry(feature)? {
            None => Ok(None),
            Some(geo::Geometry::Point(point)) => Ok(Some(point.into())),
            Some(_) => Err(self.invalid_geometry("expected a Point")),
        }
    }

    fn multi_polygon(&self, feature: &Feature) -> Result<MultiPolygon<f64>, DatasetError> {
        match self.geometry(feature)? {
            Some(geo::Geometry::MultiPolygon(mp)) => Ok(mp),
            Some(geo::Geometry::Polygon(p)) => Ok(MultiPolygon(vec![p])),
            Some(_) => Err(self.invalid_geometry("expected a Polygon or MultiPolygon")),
            None => Err(self.invalid_geometry("tract geometry is null")),
        }
    }
}
