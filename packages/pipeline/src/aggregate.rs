//! Time-bucket and per-tract roll-ups of a filtered view.

use std::collections::BTreeMap;

use crime_dash_pipeline_models::Granularity;
use crime_dash_pipeline_models::output::{
    AggregatedSeries, Bucket, FilteredView, SeriesRow, TractCounts,
};

/// Counts filtered rows per time bucket, ascending by bucket. Buckets
/// with no rows are omitted.
#[must_use]
pub fn aggregate_series(view: &FilteredView<'_>, granularity: Granularity) -> AggregatedSeries {
    let mut counts: BTreeMap<Bucket, u64> = BTreeMap::new();

    for event in view.iter() {
        *counts
            .entry(Bucket::for_date(event.date(), granularity))
            .or_default() += 1;
    }

    AggregatedSeries {
        granularity,
        rows: counts
            .into_iter()
            .map(|(bucket, count)| SeriesRow { bucket, count })
            .collect(),
    }
}

/// Counts filtered rows per census tract. Time granularity plays no part.
#[must_use]
pub fn count_by_tract(view: &FilteredView<'_>) -> TractCounts {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for event in view.iter() {
        *counts.entry(event.census_tract.clone()).or_default() += 1;
    }

    TractCounts::new(counts)
}
