//! The materialised, sorted sequence of visible rows.
//!
//! The controller never looks at train data itself. Callers hand it comparators that look the
//! records up, which keeps the roster and the ordering in separate owners.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use shared::domain::TrainId;

use crate::{
    columns::{Column, ColumnSet},
    train_list::TrainList,
};

/// Identifies a row for as long as its train stays in the view, wherever the row moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: Column,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(column: Column) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::ascending(Column::LeadUnit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRow {
    pub handle: RowHandle,
    pub train: TrainId,
}

/// Where [`SortedViewController::place`] put a train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub handle: RowHandle,
    /// Index of the row before the call, if the train was already shown.
    pub previous: Option<usize>,
    pub row: usize,
}

#[derive(Debug)]
pub struct SortedViewController {
    rows: Vec<ViewRow>,
    sort: SortKey,
    next_handle: u64,
}

impl SortedViewController {
    pub fn new(sort: SortKey) -> Self {
        Self {
            rows: Vec::new(),
            sort,
            next_handle: 0,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ViewRow] {
        &self.rows
    }

    pub fn trains(&self) -> impl Iterator<Item = TrainId> + '_ {
        self.rows.iter().map(|row| row.train)
    }

    pub fn index_of(&self, handle: RowHandle) -> Option<usize> {
        self.rows.iter().position(|row| row.handle == handle)
    }

    /// Moves or inserts `train` to the lower bound of its sort key.
    ///
    /// `existing` is the train's current row, if any. `compare` orders another row's train
    /// against `train` by the active column, ascending; the view applies the direction.
    pub fn place(
        &mut self,
        train: TrainId,
        existing: Option<RowHandle>,
        mut compare: impl FnMut(TrainId) -> Ordering,
    ) -> Placement {
        let previous = existing.and_then(|handle| self.index_of(handle));
        let handle = match (existing, previous) {
            (Some(handle), Some(index)) => {
                self.rows.remove(index);
                handle
            }
            _ => self.allocate(),
        };

        let direction = self.sort.direction;
        let row = self
            .rows
            .partition_point(|candidate| direction.apply(compare(candidate.train)).is_lt());
        self.rows.insert(row, ViewRow { handle, train });
        Placement {
            handle,
            previous,
            row,
        }
    }

    /// Removes a row, returning the index it occupied.
    pub fn remove(&mut self, handle: RowHandle) -> Option<usize> {
        let index = self.index_of(handle)?;
        self.rows.remove(index);
        Some(index)
    }

    /// Reorders every row under a new sort key. Rows with equal keys keep their relative order.
    pub fn resort(&mut self, sort: SortKey, mut compare: impl FnMut(TrainId, TrainId) -> Ordering) {
        self.sort = sort;
        self.rows
            .sort_by(|a, b| sort.direction.apply(compare(a.train, b.train)));
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    fn allocate(&mut self) -> RowHandle {
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}

/// Receives every change made to the view, in order, addressed by row index.
pub trait ViewObserver {
    /// A row appeared at `row`. All of its cells need rendering.
    fn row_inserted(&mut self, row: usize);

    fn row_removed(&mut self, row: usize);

    fn cells_changed(&mut self, row: usize, columns: ColumnSet);

    /// Every row may have moved.
    fn reset(&mut self);

    fn clock_changed(&mut self, time: DateTime<Utc>);

    /// The territory filter changed. Rows it hid have already been removed.
    fn filter_changed(&mut self) {}

    /// Called by the dispatch loop once a message has been fully applied to `list`.
    fn refresh(&mut self, _list: &TrainList) {}
}

/// An observer for callers that only read the list on demand.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ViewObserver for NullObserver {
    fn row_inserted(&mut self, _row: usize) {}

    fn row_removed(&mut self, _row: usize) {}

    fn cells_changed(&mut self, _row: usize, _columns: ColumnSet) {}

    fn reset(&mut self) {}

    fn clock_changed(&mut self, _time: DateTime<Utc>) {}
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
