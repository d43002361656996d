use std::collections::{hash_map::Entry, HashMap};

use shared::{
    domain::{BlockId, EngineerType, TerritoryId, TrainId},
    protocol::TrainData,
};
use tracing::debug;

use crate::{
    columns::{Column, ColumnSet},
    gazetteer::Gazetteer,
    view::RowHandle,
};

/// Heartbeats a train may go unreported before it is dropped.
pub const EVICTION_THRESHOLD: u32 = 5;

/// Everything the list knows about one live train.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainRecord {
    pub train_id: TrainId,
    pub lead_unit: String,
    pub symbol: String,
    pub length_feet: u32,
    pub weight_tons: u32,
    pub horsepower_per_ton: f32,
    pub speed_mph: i32,
    /// `None` while the train is on unsignalled track.
    pub territory: Option<TerritoryId>,
    pub block: BlockId,
    /// Most recent block worth showing in the location column.
    pub last_named_block: BlockId,
    pub crew_type: EngineerType,
    pub crew_name: String,
    /// Heartbeats since the last update for this train.
    pub age: u32,
    pub(crate) row: Option<RowHandle>,
}

impl TrainRecord {
    pub fn new(train_id: TrainId) -> Self {
        Self {
            train_id,
            lead_unit: String::new(),
            symbol: String::new(),
            length_feet: 0,
            weight_tons: 0,
            horsepower_per_ton: 0.0,
            speed_mph: 0,
            territory: None,
            block: BlockId::UNSIGNALLED,
            last_named_block: BlockId::UNSIGNALLED,
            crew_type: EngineerType::None,
            crew_name: String::new(),
            age: 0,
            row: None,
        }
    }

    /// The row currently showing this record, if it is in the view.
    pub fn row(&self) -> Option<RowHandle> {
        self.row
    }

    /// Runs every column's update and returns the columns whose value changed.
    pub fn apply(&mut self, source: &TrainData, gazetteer: &Gazetteer) -> ColumnSet {
        Column::ALL
            .into_iter()
            .filter(|column| column.update(self, source, gazetteer))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct RosterStore {
    records: HashMap<TrainId, TrainRecord>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: TrainId) -> Option<&TrainRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: TrainId) -> Option<&mut TrainRecord> {
        self.records.get_mut(&id)
    }

    /// Finds or creates the record for `id` and marks it freshly seen.
    ///
    /// The flag is `true` when the record was created by this call.
    pub fn touch(&mut self, id: TrainId) -> (&mut TrainRecord, bool) {
        let (record, created) = match self.records.entry(id) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => {
                debug!(train = %id, "tracking new train");
                (entry.insert(TrainRecord::new(id)), true)
            }
        };
        record.age = 0;
        (record, created)
    }

    pub fn remove(&mut self, id: TrainId) -> Option<TrainRecord> {
        self.records.remove(&id)
    }

    /// Ages every record by one heartbeat and removes those past [`EVICTION_THRESHOLD`].
    ///
    /// Evicted records are returned in id order.
    pub fn age_all(&mut self) -> Vec<TrainRecord> {
        let mut expired = Vec::new();
        for record in self.records.values_mut() {
            record.age = record.age.saturating_add(1);
            if record.age > EVICTION_THRESHOLD {
                expired.push(record.train_id);
            }
        }
        expired.sort_unstable();

        let evicted: Vec<TrainRecord> = expired
            .into_iter()
            .filter_map(|id| self.records.remove(&id))
            .collect();
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "evicted stale trains");
        }
        evicted
    }

    /// Ids of records matching `predicate`, in id order.
    pub fn ids_where(&self, mut predicate: impl FnMut(&TrainRecord) -> bool) -> Vec<TrainId> {
        let mut ids: Vec<TrainId> = self
            .records
            .values()
            .filter(|record| predicate(record))
            .map(|record| record.train_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainRecord> {
        self.records.values()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
#[path = "tests/roster_tests.rs"]
mod tests;
