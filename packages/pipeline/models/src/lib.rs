#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection state and pipeline output types.
//!
//! A [`Selection`] holds the four filter dimensions plus the map mode.
//! The pipeline turns a selection into a [`output::FilteredView`], an
//! [`output::AggregatedSeries`], a [`output::ChartSpec`], and a
//! [`map::MapSpec`].

pub mod map;
pub mod output;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label used when a set filter is not narrowing anything.
pub const ALL_LABEL: &str = "All";

/// A set-valued filter dimension.
///
/// `All` short-circuits the predicate; `Subset` is a membership test.
/// An empty subset matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "camelCase")]
pub enum SetFilter {
    /// Do not filter on this dimension.
    #[default]
    All,
    /// Keep only rows whose value is in the set.
    Subset(BTreeSet<String>),
}

impl SetFilter {
    /// Builds a subset filter from any iterable of strings.
    #[must_use]
    pub fn subset<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Subset(values.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for the all-pass variant.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns `true` if `value` passes this filter.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Subset(values) => values.contains(value),
        }
    }

    /// Human-readable description: [`ALL_LABEL`] or the comma-joined
    /// values in sorted order.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::All => ALL_LABEL.to_string(),
            Self::Subset(values) => values
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First included date.
    pub start: NaiveDate,
    /// Last included date.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range. A `start` after `end` is allowed and matches
    /// nothing.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns `true` if `date` lies within the range, both ends included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns `true` if this range includes every date from `min` to
    /// `max`, i.e. filtering by it cannot drop a row in that span.
    #[must_use]
    pub fn covers(&self, min: NaiveDate, max: NaiveDate) -> bool {
        self.start <= min && max <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Time-bucket size for the aggregated series.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(ascii_case_insensitive)]
pub enum Granularity {
    /// One bucket per calendar date.
    #[default]
    Day,
    /// One bucket per (year, month).
    Month,
    /// One bucket per calendar year.
    Year,
}

impl Granularity {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Day, Self::Month, Self::Year]
    }
}

/// Which dynamic layer is visible by default.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(ascii_case_insensitive)]
pub enum MapMode {
    /// Clustered call points.
    #[default]
    #[strum(to_string = "PointCluster", serialize = "Default")]
    PointCluster,
    /// Tract polygons shaded by call count.
    Choropleth,
}

impl MapMode {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::PointCluster, Self::Choropleth]
    }
}

/// The mutable session state driving the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Census tract filter.
    pub tracts: SetFilter,
    /// Call-type filter.
    pub call_types: SetFilter,
    /// Inclusive date filter.
    pub date_range: DateRange,
    /// Aggregation bucket size.
    pub granularity: Granularity,
    /// Default-visible dynamic map layer.
    pub map_mode: MapMode,
}

impl Selection {
    /// Initial selection: all tracts, all call types, the given (full)
    /// date range, daily buckets, point clusters.
    #[must_use]
    pub const fn new(date_range: DateRange) -> Self {
        Self {
            tracts: SetFilter::All,
            call_types: SetFilter::All,
            date_range,
            granularity: Granularity::Day,
            map_mode: MapMode::PointCluster,
        }
    }

    /// Replaces the one dimension named by `change`.
    pub fn apply(&mut self, change: SelectionChange) {
        match change {
            SelectionChange::Tracts(filter) => self.tracts = filter,
            SelectionChange::CallTypes(filter) => self.call_types = filter,
            SelectionChange::DateRange(range) => self.date_range = range,
            SelectionChange::Granularity(granularity) => self.granularity = granularity,
            SelectionChange::MapMode(mode) => self.map_mode = mode,
        }
    }
}

/// A single widget change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SelectionChange {
    /// New tract filter.
    Tracts(SetFilter),
    /// New call-type filter.
    CallTypes(SetFilter),
    /// New date range.
    DateRange(DateRange),
    /// New bucket size.
    Granularity(Granularity),
    /// New map mode.
    MapMode(MapMode),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn all_filter_matches_everything() {
        assert!(SetFilter::All.matches("THEFT"));
        assert!(SetFilter::All.matches(""));
        assert!(SetFilter::All.is_all());
    }

    #[test]
    fn subset_filter_tests_membership() {
        let filter = SetFilter::subset(["THEFT", "BURGLARY"]);
        assert!(filter.matches("THEFT"));
        assert!(!filter.matches("ASSAULT"));
        assert!(!filter.is_all());
        assert!(!SetFilter::subset(Vec::<String>::new()).matches("THEFT"));
    }

    #[test]
    fn labels_never_expose_a_sentinel() {
        assert_eq!(SetFilter::All.label(), "All");
        assert_eq!(
            SetFilter::subset(["THEFT", "BURGLARY"]).label(),
            "BURGLARY, THEFT"
        );
    }

    #[test]
    fn date_range_is_inclusive() {
        let range = DateRange::new(date(2015, 1, 1), date(2015, 1, 31));
        assert!(range.contains(date(2015, 1, 1)));
        assert!(range.contains(date(2015, 1, 31)));
        assert!(!range.contains(date(2015, 2, 1)));
        assert!(!range.contains(date(2014, 12, 31)));
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let range = DateRange::new(date(2015, 2, 1), date(2015, 1, 1));
        assert!(!range.contains(date(2015, 1, 15)));
    }

    #[test]
    fn covers_requires_both_ends() {
        let range = DateRange::new(date(2015, 1, 1), date(2015, 12, 31));
        assert!(range.covers(date(2015, 1, 1), date(2015, 12, 31)));
        assert!(range.covers(date(2015, 3, 1), date(2015, 4, 1)));
        assert!(!range.covers(date(2014, 12, 31), date(2015, 4, 1)));
        assert!(!range.covers(date(2015, 3, 1), date(2016, 1, 1)));
    }

    #[test]
    fn selection_starts_unfiltered() {
        let range = DateRange::new(date(2014, 1, 1), date(2020, 12, 9));
        let selection = Selection::new(range);
        assert!(selection.tracts.is_all());
        assert!(selection.call_types.is_all());
        assert_eq!(selection.date_range, range);
        assert_eq!(selection.granularity, Granularity::Day);
        assert_eq!(selection.map_mode, MapMode::PointCluster);
    }

    #[test]
    fn apply_changes_one_dimension() {
        let range = DateRange::new(date(2014, 1, 1), date(2020, 12, 9));
        let mut selection = Selection::new(range);
        selection.apply(SelectionChange::Granularity(Granularity::Month));
        selection.apply(SelectionChange::CallTypes(SetFilter::subset(["THEFT"])));
        assert_eq!(selection.granularity, Granularity::Month);
        assert_eq!(selection.call_types, SetFilter::subset(["THEFT"]));
        assert!(selection.tracts.is_all());
        assert_eq!(selection.date_range, range);
    }

    #[test]
    fn parses_enum_labels() {
        assert_eq!(Granularity::from_str("month").unwrap(), Granularity::Month);
        assert_eq!(MapMode::from_str("Default").unwrap(), MapMode::PointCluster);
        assert_eq!(
            MapMode::from_str("choropleth").unwrap(),
            MapMode::Choropleth
        );
        assert_eq!(Granularity::Year.to_string(), "Year");
    }
}
