use serde::Serialize;

use super::AggregatedRecord;

/// States the dashboard plots, whatever the selection.
pub const HIGHLIGHTED_STATES: [&str; 3] = ["Idaho", "New York", "New Mexico"];

/// Rows of the aggregated table matching one selection, in table order.
/// Recomputed on every interaction.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilteredView {
    rows: Vec<AggregatedRecord>,
}

impl FilteredView {
    pub fn rows(&self) -> &[AggregatedRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl AsRef<[AggregatedRecord]> for FilteredView {
    fn as_ref(&self) -> &[AggregatedRecord] {
        &self.rows
    }
}

/// Keep the rows whose cause equals `selection` and whose state is one of
/// [`HIGHLIGHTED_STATES`].
///
/// Values outside the dropdown's options are not rejected; they simply match
/// nothing.
pub fn resolve<T>(table: &T, selection: &str) -> FilteredView
where
    T: AsRef<[AggregatedRecord]> + ?Sized,
{
    let rows = table
        .as_ref()
        .iter()
        .filter(|r| r.affected_by == selection)
        .filter(|r| HIGHLIGHTED_STATES.contains(&r.state.as_str()))
        .cloned()
        .collect();
    FilteredView { rows }
}
