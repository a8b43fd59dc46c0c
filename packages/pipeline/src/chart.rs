//! Line chart derivation.

use crime_dash_pipeline_models::output::{AggregatedSeries, COUNT_COLUMN, ChartKind, ChartSpec};
use crime_dash_pipeline_models::{Granularity, SetFilter};

/// Builds the line chart for a series. The title names the selected call
/// types, with the all-pass filter rendered as a readable label.
#[must_use]
pub fn build_chart(series: &AggregatedSeries, call_types: &SetFilter) -> ChartSpec {
    let x_label = match series.granularity {
        Granularity::Day | Granularity::Month => "Date",
        Granularity::Year => "Year",
    };

    ChartSpec {
        kind: ChartKind::Line,
        title: format!("{} Calls", call_types.label()),
        x_label: x_label.to_string(),
        y_label: COUNT_COLUMN.to_string(),
        x: series.rows.iter().map(|row| row.bucket.label()).collect(),
        y: series.rows.iter().map(|row| row.count).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_series;
    use crate::filter::filter_events;
    use crate::fixtures::{full_selection, store};

    #[test]
    fn title_names_selected_types() {
        let store = store();
        let view = filter_events(&store, &full_selection());
        let series = aggregate_series(&view, Granularity::Year);

        let chart = build_chart(&series, &SetFilter::subset(["THEFT", "BURGLARY"]));
        assert_eq!(chart.title, "BURGLARY, THEFT Calls");

        let chart = build_chart(&series, &SetFilter::All);
        assert_eq!(chart.title, "All Calls");
        assert_eq!(chart.x_label, "Year");
        assert_eq!(chart.y_label, "Call count");
    }

    #[test]
    fn month_axis_keeps_bucket_order() {
        let store = store();
        let view = filter_events(&store, &full_selection());
        let series = aggregate_series(&view, Granularity::Month);
        let chart = build_chart(&series, &SetFilter::All);

        assert_eq!(chart.x, vec!["2014-12", "2015-1", "2015-2", "2016-6"]);
        assert_eq!(chart.y, vec![1, 6, 3, 1]);
        assert_eq!(chart.x_label, "Date");
        assert_eq!(chart.kind, ChartKind::Line);
    }

    #[test]
    fn empty_series_gives_empty_axes() {
        let series = AggregatedSeries {
            granularity: Granularity::Day,
            rows: vec![],
        };
        let chart = build_chart(&series, &SetFilter::All);
        assert!(chart.x.is_empty());
        assert!(chart.y.is_empty());
    }
}
