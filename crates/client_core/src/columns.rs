//! The fixed column set of the train list.
//!
//! Every column knows how to copy its field out of a train update, render it, and order two
//! records by it. Column order is display order and also the set of valid sort columns.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::{domain::BlockId, protocol::TrainData};
use thiserror::Error;

use crate::{gazetteer::Gazetteer, roster::TrainRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    LeadUnit,
    Symbol,
    Length,
    Weight,
    HorsepowerPerTon,
    Speed,
    Territory,
    Location,
    Crew,
}

#[derive(Debug, Error)]
#[error("unknown column {0:?}")]
pub struct UnknownColumn(pub String);

impl Column {
    pub const COUNT: usize = 9;

    pub const ALL: [Column; Column::COUNT] = [
        Column::LeadUnit,
        Column::Symbol,
        Column::Length,
        Column::Weight,
        Column::HorsepowerPerTon,
        Column::Speed,
        Column::Territory,
        Column::Location,
        Column::Crew,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable identifier used in settings and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Column::LeadUnit => "lead_unit",
            Column::Symbol => "symbol",
            Column::Length => "length",
            Column::Weight => "weight",
            Column::HorsepowerPerTon => "horsepower_per_ton",
            Column::Speed => "speed",
            Column::Territory => "territory",
            Column::Location => "location",
            Column::Crew => "crew",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::LeadUnit => "Lead Unit",
            Column::Symbol => "Symbol",
            Column::Length => "Length (ft)",
            Column::Weight => "Weight (t)",
            Column::HorsepowerPerTon => "HP/t",
            Column::Speed => "Speed (mph)",
            Column::Territory => "Territory",
            Column::Location => "Location",
            Column::Crew => "Crew",
        }
    }

    /// Copies this column's field from `source` into `record`, reporting whether it changed.
    ///
    /// The stored value is overwritten even when equal.
    pub fn update(self, record: &mut TrainRecord, source: &TrainData, gazetteer: &Gazetteer) -> bool {
        match self {
            Column::LeadUnit => assign(&mut record.lead_unit, source.lead_unit()),
            Column::Symbol => assign(&mut record.symbol, source.symbol.clone()),
            Column::Length => assign(&mut record.length_feet, source.length_feet),
            Column::Weight => assign(&mut record.weight_tons, source.weight_tons),
            Column::HorsepowerPerTon => {
                assign(&mut record.horsepower_per_ton, source.horsepower_per_ton)
            }
            Column::Speed => assign(&mut record.speed_mph, source.speed_mph as i32),
            Column::Territory => assign(
                &mut record.territory,
                gazetteer.territories().territory_for_block(source.block),
            ),
            Column::Location => update_location(record, source.block, gazetteer),
            Column::Crew => {
                let kind = assign(&mut record.crew_type, source.engineer_type);
                let name = assign(&mut record.crew_name, source.engineer_name.clone());
                kind || name
            }
        }
    }

    pub fn format(self, record: &TrainRecord, gazetteer: &Gazetteer) -> String {
        match self {
            Column::LeadUnit => record.lead_unit.clone(),
            Column::Symbol => record.symbol.clone(),
            Column::Length => record.length_feet.to_string(),
            Column::Weight => record.weight_tons.to_string(),
            Column::HorsepowerPerTon => format!("{:.1}", record.horsepower_per_ton),
            Column::Speed => record.speed_mph.to_string(),
            Column::Territory => match record.territory {
                Some(id) => gazetteer
                    .territories()
                    .territory_name(id)
                    .map_or_else(|| id.to_string(), str::to_string),
                None => String::new(),
            },
            Column::Location => format_location(record, gazetteer),
            Column::Crew => record.crew_name.clone(),
        }
    }

    /// Ascending order of two records by this column.
    pub fn compare(self, a: &TrainRecord, b: &TrainRecord, gazetteer: &Gazetteer) -> Ordering {
        match self {
            Column::LeadUnit => a.lead_unit.cmp(&b.lead_unit),
            Column::Symbol => a.symbol.cmp(&b.symbol),
            Column::Length => compare_numbers(a.length_feet, b.length_feet),
            Column::Weight => compare_numbers(a.weight_tons, b.weight_tons),
            Column::HorsepowerPerTon => compare_numbers(a.horsepower_per_ton, b.horsepower_per_ton),
            Column::Speed => compare_numbers(a.speed_mph, b.speed_mph),
            Column::Territory => compare_territories(a, b, gazetteer),
            Column::Location => compare_numbers(a.block.0, b.block.0),
            Column::Crew => a
                .crew_type
                .sort_priority()
                .cmp(&b.crew_type.sort_priority())
                .then_with(|| a.crew_name.cmp(&b.crew_name)),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

fn assign<T: PartialEq>(slot: &mut T, value: T) -> bool {
    let changed = *slot != value;
    *slot = value;
    changed
}

// NaN compares equal to everything.
fn compare_numbers<T: PartialOrd>(a: T, b: T) -> Ordering {
    if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

fn update_location(record: &mut TrainRecord, block: BlockId, gazetteer: &Gazetteer) -> bool {
    let changed = assign(&mut record.block, block);
    let locations = gazetteer.locations();
    if block.is_signalled()
        && (locations.location_name(block).is_some()
            || locations.location_name(record.last_named_block).is_none())
    {
        record.last_named_block = block;
    }
    changed
}

fn format_location(record: &TrainRecord, gazetteer: &Gazetteer) -> String {
    let locations = gazetteer.locations();
    if record.last_named_block == record.block {
        if !record.block.is_signalled() {
            return String::new();
        }
        return locations
            .location_name(record.block)
            .map_or_else(|| record.block.to_string(), str::to_string);
    }
    locations
        .location_name(record.last_named_block)
        .map_or_else(|| record.last_named_block.to_string(), str::to_string)
}

fn compare_territories(a: &TrainRecord, b: &TrainRecord, gazetteer: &Gazetteer) -> Ordering {
    let (x, y) = match (a.territory, b.territory) {
        (Some(x), Some(y)) => (x, y),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => return Ordering::Equal,
    };
    let territories = gazetteer.territories();
    match (territories.territory_name(x), territories.territory_name(y)) {
        (Some(xn), Some(yn)) => xn.cmp(yn),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => x.cmp(&y),
    }
}

/// One bit per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnSet(u16);

impl ColumnSet {
    pub const EMPTY: ColumnSet = ColumnSet(0);
    pub const ALL: ColumnSet = ColumnSet((1 << Column::COUNT) - 1);

    pub fn insert(&mut self, column: Column) {
        self.0 |= 1 << column.index();
    }

    pub fn contains(self, column: Column) -> bool {
        self.0 & (1 << column.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Column> {
        Column::ALL
            .into_iter()
            .filter(move |column| self.contains(*column))
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut set = ColumnSet::EMPTY;
        for column in iter {
            set.insert(column);
        }
        set
    }
}

#[cfg(test)]
#[path = "tests/columns_tests.rs"]
mod tests;
