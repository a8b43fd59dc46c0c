//! Tabular and chart outputs of a pipeline run.

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate};
use crime_dash_dataset_models::Event;
use serde::Serialize;

use crate::Granularity;
use crate::map::MapSpec;

/// Header used for the count column of every aggregated table.
pub const COUNT_COLUMN: &str = "Call count";

/// Events matching the current selection, in dataset (timestamp) order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Event>,
}

impl<'a> FilteredView<'a> {
    /// Wraps already-filtered rows.
    #[must_use]
    pub const fn new(rows: Vec<&'a Event>) -> Self {
        Self { rows }
    }

    /// The matching rows.
    #[must_use]
    pub fn rows(&self) -> &[&'a Event] {
        &self.rows
    }

    /// Number of matching rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the matching rows.
    pub fn iter(&self) -> impl Iterator<Item = &'a Event> + '_ {
        self.rows.iter().copied()
    }
}

/// A time bucket key. Ordering is chronological within one granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Bucket {
    /// A calendar date.
    Day {
        /// The date.
        date: NaiveDate,
    },
    /// A calendar month. Field order makes the derived ordering
    /// `(year, month)`.
    Month {
        /// Calendar year.
        year: i32,
        /// Month number, 1-12.
        month: u32,
    },
    /// A calendar year.
    Year {
        /// Calendar year.
        year: i32,
    },
}

impl Bucket {
    /// Returns the bucket containing `date` at the given granularity.
    #[must_use]
    pub fn for_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => Self::Day { date },
            Granularity::Month => Self::Month {
                year: date.year(),
                month: date.month(),
            },
            Granularity::Year => Self::Year { year: date.year() },
        }
    }

    /// Display label for chart axes. Month labels are `"{year}-{month}"`
    /// without zero padding, so they are display-only and never a sort key.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Day { date } => date.format("%Y-%m-%d").to_string(),
            Self::Month { year, month } => format!("{year}-{month}"),
            Self::Year { year } => year.to_string(),
        }
    }

    /// Key cells for a tabular rendering, matching
    /// [`AggregatedSeries::columns`] minus the count column.
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        match self {
            Self::Day { date } => vec![date.format("%Y-%m-%d").to_string()],
            Self::Month { year, month } => vec![year.to_string(), month.to_string()],
            Self::Year { year } => vec![year.to_string()],
        }
    }
}

/// One row of the aggregated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRow {
    /// Time bucket.
    pub bucket: Bucket,
    /// Number of filtered rows in the bucket. Never zero.
    pub count: u64,
}

/// Filtered rows counted per time bucket, ascending by bucket. Empty
/// buckets are omitted rather than zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSeries {
    /// Bucket size the rows were grouped by.
    pub granularity: Granularity,
    /// Rows ordered by bucket.
    pub rows: Vec<SeriesRow>,
}

impl AggregatedSeries {
    /// Column headers for a tabular rendering.
    #[must_use]
    pub const fn columns(&self) -> &'static [&'static str] {
        match self.granularity {
            Granularity::Day => &["Date", COUNT_COLUMN],
            Granularity::Month => &["Year", "Month", COUNT_COLUMN],
            Granularity::Year => &["Year", COUNT_COLUMN],
        }
    }

    /// Sum of all bucket counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|row| row.count).sum()
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when there are no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Filtered rows counted per census tract, independent of granularity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TractCounts {
    counts: BTreeMap<String, u64>,
}

impl TractCounts {
    /// Wraps a tract → count map.
    #[must_use]
    pub const fn new(counts: BTreeMap<String, u64>) -> Self {
        Self { counts }
    }

    /// Count for one tract; zero if the tract had no rows.
    #[must_use]
    pub fn get(&self, tract: &str) -> u64 {
        self.counts.get(tract).copied().unwrap_or(0)
    }

    /// Sum over all tracts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterates `(tract, count)` in tract order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(tract, count)| (tract.as_str(), *count))
    }
}

/// Chart type. Only line charts are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    /// A single line series.
    Line,
}

/// A single-series line chart of the aggregated counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    /// Chart type.
    pub kind: ChartKind,
    /// Title naming the selected call types.
    pub title: String,
    /// X axis caption.
    pub x_label: String,
    /// Y axis caption.
    pub y_label: String,
    /// X values (bucket labels), in bucket order.
    pub x: Vec<String>,
    /// Y values (counts), parallel to `x`.
    pub y: Vec<u64>,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput<'a> {
    /// Matching rows.
    pub filtered: FilteredView<'a>,
    /// Rows counted per time bucket.
    pub aggregated: AggregatedSeries,
    /// Rows counted per census tract.
    pub tract_counts: TractCounts,
    /// Line chart of `aggregated`.
    pub chart: ChartSpec,
    /// Map with static and dynamic layers.
    pub map: MapSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_buckets_order_chronologically() {
        let mut buckets = vec![
            Bucket::for_date(date(2015, 10, 1), Granularity::Month),
            Bucket::for_date(date(2016, 1, 1), Granularity::Month),
            Bucket::for_date(date(2015, 2, 1), Granularity::Month),
        ];
        buckets.sort();
        let labels: Vec<String> = buckets.iter().map(Bucket::label).collect();
        assert_eq!(labels, vec!["2015-2", "2015-10", "2016-1"]);
    }

    #[test]
    fn bucket_cells_match_columns() {
        let series = AggregatedSeries {
            granularity: Granularity::Month,
            rows: vec![SeriesRow {
                bucket: Bucket::for_date(date(2015, 1, 9), Granularity::Month),
                count: 5,
            }],
        };
        assert_eq!(series.columns(), &["Year", "Month", "Call count"]);
        assert_eq!(series.rows[0].bucket.cells(), vec!["2015", "1"]);
        assert_eq!(series.total(), 5);
    }

    #[test]
    fn day_bucket_drops_time() {
        let bucket = Bucket::for_date(date(2015, 3, 7), Granularity::Day);
        assert_eq!(bucket.label(), "2015-03-07");
        assert_eq!(
            Bucket::for_date(date(2015, 3, 7), Granularity::Year).label(),
            "2015"
        );
    }

    #[test]
    fn tract_counts_default_to_zero() {
        let counts = TractCounts::new(BTreeMap::from([
            ("1".to_string(), 3),
            ("2".to_string(), 4),
        ]));
        assert_eq!(counts.get("1"), 3);
        assert_eq!(counts.get("99"), 0);
        assert_eq!(counts.total(), 7);
        assert_eq!(TractCounts::default().total(), 0);
    }
}
