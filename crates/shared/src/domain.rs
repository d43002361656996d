use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(TrainId, u32);
id_newtype!(BlockId, i32);
id_newtype!(TerritoryId, u32);

impl BlockId {
    /// Block reported for trains outside any dispatcher-visible block.
    pub const UNSIGNALLED: BlockId = BlockId(-1);

    pub fn is_signalled(self) -> bool {
        self.0 >= 0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::UNSIGNALLED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngineerType {
    #[default]
    None,
    Player,
    #[serde(rename = "AI")]
    Ai,
}

impl EngineerType {
    /// Crew ordering used by the roster: players first, then AI, then uncrewed trains.
    pub fn sort_priority(self) -> u8 {
        match self {
            EngineerType::Player => 0,
            EngineerType::Ai => 1,
            EngineerType::None => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionLevel {
    Granted,
    Rescinded,
    Observer,
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PermissionLevel::Granted => "granted",
            PermissionLevel::Rescinded => "rescinded",
            PermissionLevel::Observer => "observer",
        };
        f.write_str(label)
    }
}
