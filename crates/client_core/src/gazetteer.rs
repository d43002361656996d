//! Name lookups for territories and locations.
//!
//! The train list only ever asks two questions of the outside world: which territory a block
//! belongs to (and what that territory is called), and what a block is called. Both are pure
//! lookups behind [`TerritoryDirectory`] and [`LocationDirectory`].

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use shared::domain::{BlockId, TerritoryId};
use thiserror::Error;
use tracing::info;

pub trait TerritoryDirectory: Send + Sync {
    /// The territory a block lies in, or `None` for unsignalled track.
    fn territory_for_block(&self, block: BlockId) -> Option<TerritoryId>;

    fn territory_name(&self, territory: TerritoryId) -> Option<&str>;

    /// Every territory with a known name, in id order.
    fn known_territories(&self) -> Vec<TerritoryId>;

    fn is_known(&self, territory: TerritoryId) -> bool {
        self.territory_name(territory).is_some()
    }
}

pub trait LocationDirectory: Send + Sync {
    fn location_name(&self, block: BlockId) -> Option<&str>;
}

const RUN8_TERRITORIES: [(TerritoryId, &str); 7] = [
    (TerritoryId(100), "Mojave"),
    (TerritoryId(110), "Needles"),
    (TerritoryId(120), "Cajon"),
    (TerritoryId(130), "Seligman"),
    (TerritoryId(150), "Barstow"),
    (TerritoryId(200), "San Bernardino"),
    (TerritoryId(250), "Bakersfield"),
];

/// Number of decimal digits that identify the territory at the front of a block id.
const TERRITORY_DIGITS: u32 = 3;

/// The territories shipped with the simulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Run8Territories;

impl TerritoryDirectory for Run8Territories {
    fn territory_for_block(&self, block: BlockId) -> Option<TerritoryId> {
        let raw = u32::try_from(block.0).ok()?;
        let digits = decimal_digits(raw);
        if digits < TERRITORY_DIGITS {
            return None;
        }
        Some(TerritoryId(raw / 10u32.pow(digits - TERRITORY_DIGITS)))
    }

    fn territory_name(&self, territory: TerritoryId) -> Option<&str> {
        RUN8_TERRITORIES
            .binary_search_by_key(&territory, |(id, _)| *id)
            .ok()
            .map(|index| RUN8_TERRITORIES[index].1)
    }

    fn known_territories(&self) -> Vec<TerritoryId> {
        RUN8_TERRITORIES.iter().map(|(id, _)| *id).collect()
    }
}

fn decimal_digits(value: u32) -> u32 {
    value.checked_ilog10().map_or(1, |log| log + 1)
}

#[derive(Debug, Error)]
pub enum LocationTableError {
    #[error("failed to read location table {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid location table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("location {name:?} refers to unknown route {route:?}")]
    UnknownRoute { route: String, name: String },
    #[error("location {name:?} has an invalid block number {value:?}")]
    InvalidBlock { value: String, name: String },
    #[error("block {block} is named twice ({first:?} and {second:?})")]
    DuplicateBlock {
        block: BlockId,
        first: String,
        second: String,
    },
}

#[derive(Debug, Deserialize)]
struct LocationFile {
    #[serde(default)]
    routes: BTreeMap<String, u32>,
    #[serde(default, rename = "location")]
    locations: Vec<LocationEntry>,
}

#[derive(Debug, Deserialize)]
struct LocationEntry {
    route: String,
    blocks: String,
    name: String,
}

/// Display names for blocks, keyed by full block id.
///
/// ```toml
/// [routes]
/// barstow = 150
///
/// [[location]]
/// route = "barstow"
/// blocks = "1, 2 3"
/// name = "Barstow Yard"
/// ```
///
/// Block numbers in the file omit the territory prefix; `1` on route `barstow` is block `1501`.
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    names: HashMap<BlockId, String>,
}

impl LocationTable {
    pub fn load(path: &Path) -> Result<Self, LocationTableError> {
        let text = fs::read_to_string(path).map_err(|source| LocationTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_toml_str(&text)?;
        info!(path = %path.display(), locations = table.len(), "loaded location table");
        Ok(table)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, LocationTableError> {
        let file: LocationFile = toml::from_str(text)?;
        let mut table = Self::default();
        for entry in file.locations {
            let territory = *file.routes.get(&entry.route).ok_or_else(|| {
                LocationTableError::UnknownRoute {
                    route: entry.route.clone(),
                    name: entry.name.clone(),
                }
            })?;
            for value in entry
                .blocks
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|value| !value.is_empty())
            {
                let block = full_block_id(territory, value).ok_or_else(|| {
                    LocationTableError::InvalidBlock {
                        value: value.to_string(),
                        name: entry.name.clone(),
                    }
                })?;
                table.insert(block, entry.name.clone())?;
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, block: BlockId, name: String) -> Result<(), LocationTableError> {
        if let Some(first) = self.names.get(&block) {
            return Err(LocationTableError::DuplicateBlock {
                block,
                first: first.clone(),
                second: name,
            });
        }
        self.names.insert(block, name);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn full_block_id(territory: u32, value: &str) -> Option<BlockId> {
    let local: u32 = value.parse().ok()?;
    let scale = 10i64.checked_pow(decimal_digits(local))?;
    let full = i64::from(territory)
        .checked_mul(scale)?
        .checked_add(i64::from(local))?;
    i32::try_from(full).ok().map(BlockId)
}

impl LocationDirectory for LocationTable {
    fn location_name(&self, block: BlockId) -> Option<&str> {
        self.names.get(&block).map(String::as_str)
    }
}

/// The pair of lookups the column model works against.
#[derive(Clone)]
pub struct Gazetteer {
    territories: Arc<dyn TerritoryDirectory>,
    locations: Arc<dyn LocationDirectory>,
}

impl Gazetteer {
    pub fn new(
        territories: Arc<dyn TerritoryDirectory>,
        locations: Arc<dyn LocationDirectory>,
    ) -> Self {
        Self {
            territories,
            locations,
        }
    }

    /// Simulator territories with the given location names.
    pub fn run8(locations: LocationTable) -> Self {
        Self::new(Arc::new(Run8Territories), Arc::new(locations))
    }

    pub fn territories(&self) -> &dyn TerritoryDirectory {
        self.territories.as_ref()
    }

    pub fn locations(&self) -> &dyn LocationDirectory {
        self.locations.as_ref()
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::run8(LocationTable::default())
    }
}

impl std::fmt::Debug for Gazetteer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gazetteer")
            .field("territories", &self.territories.known_territories())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "tests/gazetteer_tests.rs"]
mod tests;
