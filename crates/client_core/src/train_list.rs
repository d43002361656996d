//! The roster and its sorted view, kept in step with the session's message stream.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use shared::{
    domain::{TerritoryId, TrainId},
    protocol::{SimulationState, TrainData},
};
use tracing::{debug, info};

use crate::{
    columns::{Column, ColumnSet},
    filter::TerritoryFilter,
    gazetteer::Gazetteer,
    roster::{RosterStore, TrainRecord},
    session::SessionMessage,
    view::{RowHandle, SortDirection, SortKey, SortedViewController, ViewObserver},
};

/// A change the dispatcher asks for while the session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCommand {
    /// Sort by a column, flipping the direction when it is already the sort column.
    SortBy(Column),
    ToggleTerritory(TerritoryId),
    ToggleUnknown,
}

/// Formatted cells of one row, in column order.
pub type RowText = [String; Column::COUNT];

#[derive(Debug)]
pub struct TrainList {
    gazetteer: Gazetteer,
    filter: TerritoryFilter,
    roster: RosterStore,
    view: SortedViewController,
    simulation_time: Option<DateTime<Utc>>,
}

impl TrainList {
    pub fn new(gazetteer: Gazetteer, filter: TerritoryFilter, sort: SortKey) -> Self {
        Self {
            gazetteer,
            filter,
            roster: RosterStore::new(),
            view: SortedViewController::new(sort),
            simulation_time: None,
        }
    }

    pub fn apply<O: ViewObserver + ?Sized>(&mut self, message: &SessionMessage, observer: &mut O) {
        match message {
            SessionMessage::Heartbeat(state) => self.apply_heartbeat(state, observer),
            SessionMessage::TrainUpdate(data) => self.apply_train_update(data, observer),
        }
    }

    /// Advances the clock and ages out trains that have stopped reporting.
    pub fn apply_heartbeat<O: ViewObserver + ?Sized>(
        &mut self,
        state: &SimulationState,
        observer: &mut O,
    ) {
        self.simulation_time = Some(state.simulation_time);
        observer.clock_changed(state.simulation_time);

        for record in self.roster.age_all() {
            self.remove_row(&record, observer);
        }
    }

    pub fn apply_train_update<O: ViewObserver + ?Sized>(
        &mut self,
        data: &TrainData,
        observer: &mut O,
    ) {
        let territories = self.gazetteer.territories();
        let territory = territories.territory_for_block(data.block);
        if !self.filter.is_visible(territory, territories) {
            self.drop_train(data.train_id, observer);
            return;
        }

        let (record, created) = self.roster.touch(data.train_id);
        let changed = record.apply(data, &self.gazetteer);
        let existing = record.row;
        let sort = self.view.sort_key();

        if created || existing.is_none() || changed.contains(sort.column) {
            self.reposition(data.train_id, existing, sort.column, observer);
        } else if !changed.is_empty() {
            if let Some(row) = existing.and_then(|handle| self.view.index_of(handle)) {
                observer.cells_changed(row, changed);
            }
        }
    }

    fn reposition<O: ViewObserver + ?Sized>(
        &mut self,
        id: TrainId,
        existing: Option<RowHandle>,
        column: Column,
        observer: &mut O,
    ) {
        let Some(record) = self.roster.get(id) else {
            return;
        };
        let roster = &self.roster;
        let gazetteer = &self.gazetteer;
        let placement = self.view.place(id, existing, |other| {
            roster
                .get(other)
                .map_or(Ordering::Equal, |candidate| {
                    column.compare(candidate, record, gazetteer)
                })
        });

        match placement.previous {
            Some(previous) if previous == placement.row => {
                observer.cells_changed(placement.row, ColumnSet::ALL)
            }
            Some(previous) => {
                observer.row_removed(previous);
                observer.row_inserted(placement.row);
            }
            None => observer.row_inserted(placement.row),
        }

        if let Some(record) = self.roster.get_mut(id) {
            record.row = Some(placement.handle);
        }
    }

    pub fn execute<O: ViewObserver + ?Sized>(&mut self, command: ViewCommand, observer: &mut O) {
        match command {
            ViewCommand::SortBy(column) => self.sort_by(column, observer),
            ViewCommand::ToggleTerritory(territory) => {
                let enabled = !self.filter.is_enabled(territory);
                self.set_territory_enabled(territory, enabled, observer);
            }
            ViewCommand::ToggleUnknown => {
                let enabled = !self.filter.unknown_enabled();
                self.set_unknown_enabled(enabled, observer);
            }
        }
    }

    /// Shows or hides a known territory. Hiding it removes every row now out of view.
    pub fn set_territory_enabled<O: ViewObserver + ?Sized>(
        &mut self,
        territory: TerritoryId,
        enabled: bool,
        observer: &mut O,
    ) {
        let territories = self.gazetteer.territories();
        if self.filter.set_enabled(territory, enabled, territories) {
            info!(%territory, enabled, "territory visibility changed");
            if !enabled {
                self.purge_hidden(observer);
            }
            observer.filter_changed();
        }
    }

    /// Shows or hides unknown territories and unsignalled track.
    pub fn set_unknown_enabled<O: ViewObserver + ?Sized>(&mut self, enabled: bool, observer: &mut O) {
        if self.filter.set_unknown_enabled(enabled) {
            info!(enabled, "unknown territory visibility changed");
            if !enabled {
                self.purge_hidden(observer);
            }
            observer.filter_changed();
        }
    }

    /// Sorts by `column`, flipping the direction if it is already the sort column.
    pub fn sort_by<O: ViewObserver + ?Sized>(&mut self, column: Column, observer: &mut O) {
        let current = self.view.sort_key();
        let direction = if current.column == column {
            current.direction.toggled()
        } else {
            SortDirection::Ascending
        };
        self.set_sort(SortKey { column, direction }, observer);
    }

    pub fn set_sort<O: ViewObserver + ?Sized>(&mut self, sort: SortKey, observer: &mut O) {
        let roster = &self.roster;
        let gazetteer = &self.gazetteer;
        self.view.resort(sort, |a, b| match (roster.get(a), roster.get(b)) {
            (Some(a), Some(b)) => sort.column.compare(a, b, gazetteer),
            _ => Ordering::Equal,
        });
        debug!(column = %sort.column, direction = ?sort.direction, "view re-sorted");
        observer.reset();
    }

    pub fn sort_key(&self) -> SortKey {
        self.view.sort_key()
    }

    pub fn filter(&self) -> &TerritoryFilter {
        &self.filter
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Timestamp of the latest heartbeat.
    pub fn simulation_time(&self) -> Option<DateTime<Utc>> {
        self.simulation_time
    }

    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn record(&self, id: TrainId) -> Option<&TrainRecord> {
        self.roster.get(id)
    }

    pub fn record_at(&self, row: usize) -> Option<&TrainRecord> {
        let train = self.view.rows().get(row)?.train;
        self.roster.get(train)
    }

    /// Visible train ids in display order.
    pub fn order(&self) -> Vec<TrainId> {
        self.view.trains().collect()
    }

    pub fn row_text(&self, row: usize) -> Option<RowText> {
        let record = self.record_at(row)?;
        Some(Column::ALL.map(|column| column.format(record, &self.gazetteer)))
    }

    /// Formatted text of every visible row, in display order.
    pub fn rows(&self) -> Vec<RowText> {
        (0..self.view.len())
            .filter_map(|row| self.row_text(row))
            .collect()
    }

    fn purge_hidden<O: ViewObserver + ?Sized>(&mut self, observer: &mut O) {
        let territories = self.gazetteer.territories();
        let filter = &self.filter;
        let hidden = self
            .roster
            .ids_where(|record| !filter.is_visible(record.territory, territories));
        if !hidden.is_empty() {
            debug!(count = hidden.len(), "removing trains in hidden territories");
        }
        for id in hidden {
            self.drop_train(id, observer);
        }
    }

    fn drop_train<O: ViewObserver + ?Sized>(&mut self, id: TrainId, observer: &mut O) {
        if let Some(record) = self.roster.remove(id) {
            self.remove_row(&record, observer);
        }
    }

    fn remove_row<O: ViewObserver + ?Sized>(&mut self, record: &TrainRecord, observer: &mut O) {
        if let Some(row) = record.row.and_then(|handle| self.view.remove(handle)) {
            observer.row_removed(row);
        }
    }
}

#[cfg(test)]
#[path = "tests/train_list_tests.rs"]
mod tests;
