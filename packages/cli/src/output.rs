//! Writes one pipeline run to disk.

use std::io;
use std::path::{Path, PathBuf};

use crime_dash_dataset::loader::{
    EVENT_ID_FIELD, EVENT_TIME_FIELD, EVENT_TRACT_FIELD, EVENT_TYPE_FIELD,
};
use crime_dash_pipeline_models::output::{AggregatedSeries, FilteredView, PipelineOutput};
use crime_dash_pipeline_models::map::MapSpec;

pub const FILTERED_FILE: &str = "filtered.csv";
pub const AGGREGATED_FILE: &str = "aggregated.csv";
pub const CHART_FILE: &str = "chart.json";
pub const MAP_FILE: &str = "map.json";

/// Writes the filtered rows, one CSV row per event. Events without a
/// location leave the coordinate cells empty.
pub fn write_filtered<W: io::Write>(view: &FilteredView<'_>, writer: W) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        EVENT_ID_FIELD,
        EVENT_TIME_FIELD,
        EVENT_TYPE_FIELD,
        EVENT_TRACT_FIELD,
        "longitude",
        "latitude",
    ])?;

    for event in view.iter() {
        let (longitude, latitude) = event.location.map_or_else(
            || (String::new(), String::new()),
            |p| (p.longitude.to_string(), p.latitude.to_string()),
        );
        csv.write_record([
            event.id.clone(),
            event.time_created.format("%Y-%m-%dT%H:%M:%S").to_string(),
            event.call_type.clone(),
            event.census_tract.clone(),
            longitude,
            latitude,
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Writes the aggregated series with granularity-specific headers.
pub fn write_aggregated<W: io::Write>(series: &AggregatedSeries, writer: W) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(series.columns())?;

    for row in &series.rows {
        let mut record = row.bucket.cells();
        record.push(row.count.to_string());
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Writes every output file for `output` into `dir`, returning the paths
/// written.
pub fn write_all(
    output: &PipelineOutput<'_>,
    map: &MapSpec,
    dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let filtered = dir.join(FILTERED_FILE);
    write_filtered(&output.filtered, std::fs::File::create(&filtered)?)?;

    let aggregated = dir.join(AGGREGATED_FILE);
    write_aggregated(&output.aggregated, std::fs::File::create(&aggregated)?)?;

    let chart = dir.join(CHART_FILE);
    std::fs::write(&chart, serde_json::to_string_pretty(&output.chart)?)?;

    let map_path = dir.join(MAP_FILE);
    std::fs::write(&map_path, serde_json::to_string(map)?)?;

    log::info!(
        "Wrote {} rows, {} buckets to {}",
        output.filtered.len(),
        output.aggregated.len(),
        dir.display()
    );

    Ok(vec![filtered, aggregated, chart, map_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crime_dash_dataset_models::{Event, GeoPoint};
    use crime_dash_pipeline_models::Granularity;
    use crime_dash_pipeline_models::output::{Bucket, SeriesRow};

    fn event(id: &str, location: Option<GeoPoint>) -> Event {
        Event {
            id: id.to_string(),
            time_created: NaiveDate::from_ymd_opt(2015, 1, 10)
                .unwrap()
                .and_hms_opt(11, 30, 0)
                .unwrap(),
            call_type: "THEFT".to_string(),
            census_tract: "1".to_string(),
            location,
        }
    }

    #[test]
    fn filtered_csv_has_source_headers() {
        let events = [
            event("A1", Some(GeoPoint::new(-90.5, 29.25))),
            event("A2", None),
        ];
        let view = FilteredView::new(events.iter().collect());
        let mut buf = Vec::new();
        write_filtered(&view, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "NOPD_Item,TimeCreate,TypeText,census_tract,longitude,latitude",
                "A1,2015-01-10T11:30:00,THEFT,1,-90.5,29.25",
                "A2,2015-01-10T11:30:00,THEFT,1,,",
            ]
        );
    }

    #[test]
    fn aggregated_csv_splits_month_keys() {
        let series = AggregatedSeries {
            granularity: Granularity::Month,
            rows: vec![
                SeriesRow {
                    bucket: Bucket::Month {
                        year: 2015,
                        month: 1,
                    },
                    count: 5,
                },
                SeriesRow {
                    bucket: Bucket::Month {
                        year: 2015,
                        month: 2,
                    },
                    count: 3,
                },
            ],
        };
        let mut buf = Vec::new();
        write_aggregated(&series, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Year,Month,Call count\n2015,1,5\n2015,2,3\n");
    }

    #[test]
    fn empty_series_still_has_headers() {
        let series = AggregatedSeries {
            granularity: Granularity::Day,
            rows: vec![],
        };
        let mut buf = Vec::new();
        write_aggregated(&series, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Date,Call count\n");
    }
}
