#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter, aggregate, and render pipeline.
//!
//! A [`Pipeline`] turns one [`Selection`] over an immutable
//! [`DatasetStore`] into a [`PipelineOutput`]: the filtered rows, a time
//! series at the selected granularity, per-tract counts, a line chart,
//! and a layered map. Runs are pure, so the same selection always gives
//! equal output and nothing is cached between runs.

pub mod aggregate;
pub mod chart;
pub mod cluster;
pub mod color;
pub mod filter;
pub mod map;
pub mod session;

#[cfg(test)]
mod fixtures;

use crime_dash_config::DashboardConfig;
use crime_dash_dataset::DatasetStore;
use crime_dash_pipeline_models::Selection;
use crime_dash_pipeline_models::output::PipelineOutput;
use h3o::Resolution;
use thiserror::Error;

use crate::map::MapSettings;

/// Errors raised while resolving configuration into a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configured palette is unknown or cannot supply the bin count.
    #[error("Unknown palette: {message}")]
    UnknownPalette {
        /// Description of what went wrong.
        message: String,
    },

    /// The configured H3 resolution is out of range.
    #[error("Invalid H3 resolution: {0}")]
    InvalidResolution(#[from] h3o::error::InvalidResolution),
}

/// A configured pipeline. Palette and resolution are resolved once here so
/// that [`Pipeline::run`] cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    settings: MapSettings,
}

impl Pipeline {
    /// Resolves `config` into a runnable pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the palette name is unknown or the H3
    /// resolution is out of range.
    pub fn new(config: &DashboardConfig) -> Result<Self, PipelineError> {
        let choropleth = &config.choropleth;
        let colors =
            color::palette_colors(&choropleth.palette, choropleth.bins).ok_or_else(|| {
                PipelineError::UnknownPalette {
                    message: format!(
                        "{} with {} bins (available: {})",
                        choropleth.palette,
                        choropleth.bins,
                        color::palette_names().join(", ")
                    ),
                }
            })?;
        let resolution = Resolution::try_from(config.cluster.h3_resolution)?;

        Ok(Self {
            settings: MapSettings {
                map: config.map.clone(),
                choropleth: choropleth.clone(),
                colors,
                resolution,
            },
        })
    }

    /// Resolved map styling.
    #[must_use]
    pub const fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// Runs the full pipeline for one selection.
    #[must_use]
    pub fn run<'a>(&self, store: &'a DatasetStore, selection: &Selection) -> PipelineOutput<'a> {
        let filtered = filter::filter_events(store, selection);
        let aggregated = aggregate::aggregate_series(&filtered, selection.granularity);
        let tract_counts = aggregate::count_by_tract(&filtered);
        let chart = chart::build_chart(&aggregated, &selection.call_types);
        let map = map::build_map(
            store,
            &filtered,
            &tract_counts,
            selection.map_mode,
            &self.settings,
        );

        log::debug!(
            "Pipeline run: {} of {} rows, {} {} buckets, {} tracts, map mode {}",
            filtered.len(),
            store.events().len(),
            aggregated.len(),
            selection.granularity,
            tract_counts.iter().count(),
            selection.map_mode
        );

        PipelineOutput {
            filtered,
            aggregated,
            tract_counts,
            chart,
            map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, full_selection, store};
    use crime_dash_pipeline_models::map::{CALLS_LAYER, CHOROPLETH_LAYER};
    use crime_dash_pipeline_models::output::{Bucket, SeriesRow};
    use crime_dash_pipeline_models::{DateRange, Granularity, SetFilter};

    fn pipeline() -> Pipeline {
        Pipeline::new(&DashboardConfig::embedded()).unwrap()
    }

    #[test]
    fn same_selection_gives_equal_output() {
        let store = store();
        let pipeline = pipeline();
        let selection = full_selection();
        assert_eq!(
            pipeline.run(&store, &selection),
            pipeline.run(&store, &selection)
        );
    }

    #[test]
    fn initial_selection_passes_every_row() {
        let store = store();
        let output = pipeline().run(&store, &full_selection());
        assert_eq!(output.filtered.len(), store.events().len());
        assert!(
            output
                .filtered
                .iter()
                .zip(store.events())
                .all(|(a, b)| std::ptr::eq(a, b))
        );
        assert_eq!(output.aggregated.total(), 11);
        assert_eq!(output.tract_counts.total(), 11);
    }

    #[test]
    fn january_theft_by_month() {
        let store = store();
        let mut selection = full_selection();
        selection.call_types = SetFilter::subset(["THEFT"]);
        selection.date_range = DateRange::new(date(2015, 1, 1), date(2015, 1, 31));
        selection.granularity = Granularity::Month;

        let output = pipeline().run(&store, &selection);
        assert_eq!(output.filtered.len(), 5);
        assert_eq!(
            output.aggregated.rows,
            vec![SeriesRow {
                bucket: Bucket::Month {
                    year: 2015,
                    month: 1
                },
                count: 5
            }]
        );
        assert_eq!(output.chart.title, "THEFT Calls");
        assert_eq!(output.chart.x, vec!["2015-1"]);
        assert_eq!(output.chart.y, vec![5]);
    }

    #[test]
    fn out_of_range_selection_is_empty_everywhere() {
        let store = store();
        let mut selection = full_selection();
        selection.date_range = DateRange::new(date(2030, 1, 1), date(2030, 12, 31));

        let output = pipeline().run(&store, &selection);
        assert!(output.filtered.is_empty());
        assert!(output.aggregated.is_empty());
        assert_eq!(output.tract_counts.total(), 0);
        assert!(output.chart.x.is_empty());
        assert_eq!(output.map.layer(CALLS_LAYER).unwrap().feature_count(), 0);
        assert_eq!(
            output
                .map
                .layer(CHOROPLETH_LAYER)
                .unwrap()
                .data_feature_count(),
            0
        );
    }

    #[test]
    fn granularity_only_changes_the_series() {
        let store = store();
        let pipeline = pipeline();
        let mut selection = full_selection();
        let by_day = pipeline.run(&store, &selection);
        selection.granularity = Granularity::Year;
        let by_year = pipeline.run(&store, &selection);

        assert_eq!(by_year.filtered, by_day.filtered);
        assert_eq!(by_year.tract_counts, by_day.tract_counts);
        assert_eq!(by_year.map, by_day.map);
        assert_ne!(by_year.aggregated, by_day.aggregated);
    }

    #[test]
    fn rejects_unknown_palette() {
        let mut config = DashboardConfig::embedded();
        config.choropleth.palette = "Rainbow".to_string();
        assert!(matches!(
            Pipeline::new(&config),
            Err(PipelineError::UnknownPalette { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_resolution() {
        let mut config = DashboardConfig::embedded();
        config.cluster.h3_resolution = 16;
        assert!(matches!(
            Pipeline::new(&config),
            Err(PipelineError::InvalidResolution(_))
        ));
    }
}
