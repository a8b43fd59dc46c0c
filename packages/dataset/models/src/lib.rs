#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types for the geocoded crime-call dataset.
//!
//! Three tables are loaded once at startup and never mutated: service
//! call [`Event`]s, fixed-location [`Marker`]s (e.g. cameras), and
//! [`TractPolygon`] census tract boundaries.

use chrono::{NaiveDate, NaiveDateTime};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
}

impl GeoPoint {
    /// Creates a point from longitude/latitude (`GeoJSON` coordinate order).
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Self::new(point.longitude, point.latitude)
    }
}

/// One service call record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique item number (`NOPD_Item`).
    pub id: String,
    /// When the call was created (`TimeCreate`), local wall time.
    pub time_created: NaiveDateTime,
    /// Call-type label (`TypeText`).
    pub call_type: String,
    /// Census tract identifier (`census_tract`). Soft reference to
    /// [`TractPolygon::tract_id`].
    pub census_tract: String,
    /// Geocoded location. `None` when the source row had a null geometry.
    pub location: Option<GeoPoint>,
}

impl Event {
    /// Calendar date of the call, without the time-of-day component.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.time_created.date()
    }
}

/// A fixed point of interest drawn on every map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Marker location.
    pub location: GeoPoint,
}

/// A census tract boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TractPolygon {
    /// Tract identifier, unique across the tract table.
    pub tract_id: String,
    /// Boundary geometry. Single polygons are stored as a one-element
    /// [`MultiPolygon`].
    pub geometry: MultiPolygon<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_date_drops_time_of_day() {
        let event = Event {
            id: "A0001-15".to_string(),
            time_created: NaiveDate::from_ymd_opt(2015, 1, 31)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
            call_type: "THEFT".to_string(),
            census_tract: "17.00".to_string(),
            location: None,
        };
        assert_eq!(event.date(), NaiveDate::from_ymd_opt(2015, 1, 31).unwrap());
    }

    #[test]
    fn geo_point_round_trips_through_geo_types() {
        let point = GeoPoint::new(-90.07, 29.95);
        let geo_point: geo::Point<f64> = point.into();
        assert!((geo_point.x() - -90.07).abs() < f64::EPSILON);
        assert!((geo_point.y() - 29.95).abs() < f64::EPSILON);
        assert_eq!(GeoPoint::from(geo_point), point);
    }
}
