//! Selection filtering.
//!
//! Three predicates (tract, call type, date) are ANDed. Each one is
//! `None` when its dimension is untouched, so an all-pass dimension costs
//! nothing per row and never runs a boundary comparison.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use crime_dash_dataset::DatasetStore;
use crime_dash_dataset_models::Event;
use crime_dash_pipeline_models::output::FilteredView;
use crime_dash_pipeline_models::{DateRange, Selection, SetFilter};

/// The active predicates for one selection.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter<'s> {
    tracts: Option<&'s BTreeSet<String>>,
    call_types: Option<&'s BTreeSet<String>>,
    dates: Option<DateRange>,
}

const fn membership(filter: &SetFilter) -> Option<&BTreeSet<String>> {
    match filter {
        SetFilter::All => None,
        SetFilter::Subset(values) => Some(values),
    }
}

impl<'s> EventFilter<'s> {
    /// Builds the predicates for `selection`. A date range covering
    /// `date_bounds` (the dataset's full span) is dropped entirely.
    #[must_use]
    pub fn new(selection: &'s Selection, date_bounds: Option<(NaiveDate, NaiveDate)>) -> Self {
        let range = selection.date_range;
        let dates = match date_bounds {
            Some((min, max)) if range.covers(min, max) => None,
            _ => Some(range),
        };

        Self {
            tracts: membership(&selection.tracts),
            call_types: membership(&selection.call_types),
            dates,
        }
    }

    /// Returns `true` when no predicate is active.
    #[must_use]
    pub const fn is_pass_through(&self) -> bool {
        self.tracts.is_none() && self.call_types.is_none() && self.dates.is_none()
    }

    /// Returns `true` if `event` passes every active predicate.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        self.tracts
            .is_none_or(|tracts| tracts.contains(&event.census_tract))
            && self
                .call_types
                .is_none_or(|types| types.contains(&event.call_type))
            && self.dates.is_none_or(|range| range.contains(event.date()))
    }

    /// Narrows a timestamp-sorted slice to the rows the date predicate can
    /// accept, without scanning.
    fn date_window<'e>(&self, events: &'e [Event]) -> &'e [Event] {
        let Some(range) = self.dates else {
            return events;
        };
        if range.start > range.end {
            return &[];
        }
        let lo = events.partition_point(|e| e.date() < range.start);
        let hi = events.partition_point(|e| e.date() <= range.end);
        &events[lo..hi]
    }
}

/// Applies `selection` to the store, preserving timestamp order.
#[must_use]
pub fn filter_events<'a>(store: &'a DatasetStore, selection: &Selection) -> FilteredView<'a> {
    let filter = EventFilter::new(selection, store.date_bounds());

    if filter.is_pass_through() {
        return FilteredView::new(store.events().iter().collect());
    }

    let window = filter.date_window(store.events());
    let rows = window.iter().filter(|event| filter.matches(event)).collect();
    FilteredView::new(rows)
}
