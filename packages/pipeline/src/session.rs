//! Interactive session: one dataset, one mutable selection, and a rerun of
//! the whole pipeline after every change.

use chrono::Local;
use crime_dash_config::DashboardConfig;
use crime_dash_dataset::DatasetStore;
use crime_dash_pipeline_models::output::PipelineOutput;
use crime_dash_pipeline_models::{DateRange, Selection, SelectionChange};

use crate::{Pipeline, PipelineError};

/// Owns the loaded dataset and the current selection.
#[derive(Debug, Clone)]
pub struct Session {
    store: DatasetStore,
    selection: Selection,
    pipeline: Pipeline,
}

impl Session {
    /// Starts a session with the initial selection: everything selected
    /// over the dataset's full date span. An empty dataset gets today's
    /// date as its span.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if `config` cannot be resolved.
    pub fn new(store: DatasetStore, config: &DashboardConfig) -> Result<Self, PipelineError> {
        let pipeline = Pipeline::new(config)?;
        let (start, end) = store.date_bounds().unwrap_or_else(|| {
            let today = Local::now().date_naive();
            (today, today)
        });
        log::info!(
            "Session over {} events, {} markers, {} tracts ({start} to {end})",
            store.events().len(),
            store.markers().len(),
            store.tracts().len()
        );

        Ok(Self {
            store,
            selection: Selection::new(DateRange::new(start, end)),
            pipeline,
        })
    }

    /// The current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The loaded dataset.
    #[must_use]
    pub const fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Applies one change and reruns the pipeline.
    pub fn apply(&mut self, change: SelectionChange) -> PipelineOutput<'_> {
        log::debug!("Applying {change:?}");
        self.selection.apply(change);
        self.render()
    }

    /// Runs the pipeline for the current selection.
    #[must_use]
    pub fn render(&self) -> PipelineOutput<'_> {
        self.pipeline.run(&self.store, &self.selection)
    }
}
