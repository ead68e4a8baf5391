// src/binder.rs
//! Glue between the dropdown and the two outputs.
//!
//! A binder belongs to one session and handles one input event at a time.
//! Every event carries a sequence number; the newest one wins.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    data::{resolve, Table},
    view::{project, ChartSpec},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderState {
    /// Last rendered outputs are on screen.
    Idle,
    /// Recomputing for this sequence number.
    Updating { seq: u64 },
}

/// The dropdown changed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputChanged {
    pub seq: u64,
    pub value: String,
}

/// What the binder pushes to the status text and chart regions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outputs {
    pub seq: u64,
    pub status: String,
    pub figure: ChartSpec,
}

/// An event that passed the staleness check; only [`ReactiveBinder::begin`]
/// hands these out.
#[derive(Debug)]
pub struct Accepted(InputChanged);

pub struct ReactiveBinder {
    table: Arc<Table>,
    state: BinderState,
    last_applied: Option<u64>,
}

impl ReactiveBinder {
    pub fn new(table: Arc<Table>) -> Self {
        Self {
            table,
            state: BinderState::Idle,
            last_applied: None,
        }
    }

    pub fn state(&self) -> BinderState {
        self.state
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }

    /// Recompute outputs for `event`.
    ///
    /// Returns `None` for an event older than one already applied, so a
    /// late result can never replace a newer one.
    pub fn on_input_changed(&mut self, event: InputChanged) -> Option<Outputs> {
        let accepted = self.begin(event)?;
        Some(self.complete(accepted))
    }

    /// Idle → Updating. `None` if the event is stale; state is left alone.
    pub fn begin(&mut self, event: InputChanged) -> Option<Accepted> {
        if self.last_applied.is_some_and(|last| event.seq < last) {
            debug!(seq = event.seq, last = ?self.last_applied, "dropping stale input");
            return None;
        }

        self.state = BinderState::Updating { seq: event.seq };
        info!(seq = event.seq, selection = %event.value, "bee-killer selected");
        Some(Accepted(event))
    }

    /// Run resolve + project for an accepted event, then Updating → Idle.
    pub fn complete(&mut self, accepted: Accepted) -> Outputs {
        let Accepted(event) = accepted;
        let view = resolve(self.table.records(), &event.value);
        let (status, figure) = project(&view, &event.value);
        debug!(rows = view.len(), series = figure.series.len(), "view projected");

        self.last_applied = Some(event.seq);
        self.state = BinderState::Idle;
        Outputs {
            seq: event.seq,
            status,
            figure,
        }
    }

    /// Handle a burst of queued events, computing only for the newest.
    pub fn on_burst<I>(&mut self, events: I) -> Option<Outputs>
    where
        I: IntoIterator<Item = InputChanged>,
    {
        let newest = events.into_iter().max_by_key(|e| e.seq)?;
        self.on_input_changed(newest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AggregatedRecord;

    fn table() -> Arc<Table> {
        let rec = |state: &str, affected_by: &str, pct: f64| AggregatedRecord {
            state: state.to_string(),
            ansi: 16,
            affected_by: affected_by.to_string(),
            year: 2015,
            state_code: "XX".to_string(),
            pct_impacted: Some(pct),
        };
        Arc::new(Table::new(
            vec![
                rec("Idaho", "Pesticides", 37.5),
                rec("Idaho", "Varroa_mites", 60.0),
                rec("New York", "Pesticides", 22.1),
            ],
            "memory",
        ))
    }

    fn ev(seq: u64, value: &str) -> InputChanged {
        InputChanged {
            seq,
            value: value.to_string(),
        }
    }

    #[test]
    fn test_binder_returns_to_idle() {
        let mut binder = ReactiveBinder::new(table());
        assert_eq!(binder.state(), BinderState::Idle);

        let out = binder.on_input_changed(ev(1, "Pesticides")).unwrap();
        assert_eq!(binder.state(), BinderState::Idle);
        assert_eq!(binder.last_applied(), Some(1));
        assert_eq!(out.seq, 1);
        assert_eq!(out.status, "The bee-killer chosen by user was: Pesticides");
        assert_eq!(out.figure.series.len(), 2);
    }

    #[test]
    fn test_updating_visible_between_begin_and_complete() {
        let mut binder = ReactiveBinder::new(table());
        let accepted = binder.begin(ev(4, "Pesticides")).unwrap();
        assert_eq!(binder.state(), BinderState::Updating { seq: 4 });
        assert_eq!(binder.last_applied(), None);

        let out = binder.complete(accepted);
        assert_eq!(out.seq, 4);
        assert_eq!(binder.state(), BinderState::Idle);
        assert_eq!(binder.last_applied(), Some(4));

        // stale begin leaves the binder idle
        assert!(binder.begin(ev(2, "Disease")).is_none());
        assert_eq!(binder.state(), BinderState::Idle);
    }

    #[test]
    fn test_stale_event_does_not_overwrite() {
        let mut binder = ReactiveBinder::new(table());
        assert!(binder.on_input_changed(ev(5, "Varroa_mites")).is_some());
        assert!(binder.on_input_changed(ev(3, "Pesticides")).is_none());
        assert_eq!(binder.last_applied(), Some(5));
        assert_eq!(binder.state(), BinderState::Idle);
    }

    #[test]
    fn test_burst_computes_newest_only() {
        let mut binder = ReactiveBinder::new(table());
        let out = binder
            .on_burst(vec![ev(1, "Disease"), ev(3, "Varroa_mites"), ev(2, "Other")])
            .unwrap();
        assert_eq!(out.seq, 3);
        assert!(out.status.ends_with("Varroa_mites"));
        assert_eq!(out.figure.series.len(), 1);
        assert!(binder.on_burst(Vec::new()).is_none());
    }

    #[test]
    fn test_unknown_value_renders_empty_chart() {
        let mut binder = ReactiveBinder::new(table());
        let out = binder.on_input_changed(ev(1, "Wasps")).unwrap();
        assert!(out.figure.series.is_empty());
        assert_eq!(out.status, "The bee-killer chosen by user was: Wasps");
    }
}
