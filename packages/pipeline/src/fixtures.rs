//! Small in-memory dataset shared by the pipeline tests.

use chrono::{NaiveDate, NaiveDateTime};
use crime_dash_dataset::DatasetStore;
use crime_dash_dataset_models::{Event, GeoPoint, Marker, TractPolygon};
use crime_dash_pipeline_models::{DateRange, Selection};
use geo::{MultiPolygon, polygon};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn event(id: &str, time: &str, call_type: &str, tract: &str, location: Option<GeoPoint>) -> Event {
    Event {
        id: id.to_string(),
        time_created: at(time),
        call_type: call_type.to_string(),
        census_tract: tract.to_string(),
        location,
    }
}

fn square(id: &str, west: f64, south: f64) -> TractPolygon {
    TractPolygon {
        tract_id: id.to_string(),
        geometry: MultiPolygon(vec![polygon![
            (x: west, y: south),
            (x: west + 0.01, y: south),
            (x: west + 0.01, y: south + 0.01),
            (x: west, y: south + 0.01),
            (x: west, y: south),
        ]]),
    }
}

const fn point(longitude: f64, latitude: f64) -> Option<GeoPoint> {
    Some(GeoPoint::new(longitude, latitude))
}

/// Eleven events: five THEFT calls in January 2015, three in February
/// 2015, and three BURGLARY calls spread over 2014-2016 (one in a tract
/// with no polygon, one with no location). Events are deliberately out
/// of time order.
pub fn store() -> DatasetStore {
    let events = vec![
        event("T-FEB-1", "2015-02-01 09:00", "THEFT", "2", point(-90.075, 29.955)),
        event("T-JAN-1", "2015-01-03 10:00", "THEFT", "1", point(-90.085, 29.945)),
        event("T-JAN-2", "2015-01-10 11:30", "THEFT", "1", point(-90.085, 29.946)),
        event("T-JAN-3", "2015-01-10 18:45", "THEFT", "2", point(-90.075, 29.955)),
        event("B-2014", "2014-12-15 08:00", "BURGLARY", "1", point(-90.084, 29.944)),
        event("T-JAN-4", "2015-01-20 07:15", "THEFT", "2", point(-90.074, 29.956)),
        event("T-JAN-5", "2015-01-31 23:00", "THEFT", "1", point(-90.086, 29.947)),
        event("B-2015", "2015-01-05 12:00", "BURGLARY", "3", None),
        event("T-FEB-2", "2015-02-14 14:00", "THEFT", "2", point(-90.076, 29.954)),
        event("T-FEB-3", "2015-02-28 16:00", "THEFT", "2", point(-90.075, 29.953)),
        event("B-2016", "2016-06-01 20:00", "BURGLARY", "99", point(-90.1, 29.9)),
    ];
    let markers = vec![
        Marker {
            location: GeoPoint::new(-90.08, 29.95),
        },
        Marker {
            location: GeoPoint::new(-90.07, 29.96),
        },
    ];
    let tracts = vec![
        square("1", -90.09, 29.94),
        square("2", -90.08, 29.95),
        square("3", -90.07, 29.96),
    ];
    DatasetStore::new(events, markers, tracts)
}

/// The initial selection over the fixture store's full date span.
pub fn full_selection() -> Selection {
    Selection::new(DateRange::new(date(2014, 12, 15), date(2016, 6, 1)))
}
