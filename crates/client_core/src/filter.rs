use std::collections::BTreeSet;

use shared::domain::TerritoryId;
use tracing::warn;

use crate::gazetteer::TerritoryDirectory;

/// Which territories the dispatcher wants to see.
///
/// Known territories are toggled individually. Everything else, unknown territory ids and
/// unsignalled track alike, shares a single flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryFilter {
    disabled: BTreeSet<TerritoryId>,
    unknown_enabled: bool,
}

impl Default for TerritoryFilter {
    fn default() -> Self {
        Self {
            disabled: BTreeSet::new(),
            unknown_enabled: true,
        }
    }
}

impl TerritoryFilter {
    pub fn new(disabled: impl IntoIterator<Item = TerritoryId>, unknown_enabled: bool) -> Self {
        Self {
            disabled: disabled.into_iter().collect(),
            unknown_enabled,
        }
    }

    pub fn is_visible(
        &self,
        territory: Option<TerritoryId>,
        directory: &dyn TerritoryDirectory,
    ) -> bool {
        match territory {
            Some(id) if directory.is_known(id) => !self.disabled.contains(&id),
            _ => self.unknown_enabled,
        }
    }

    pub fn is_enabled(&self, territory: TerritoryId) -> bool {
        !self.disabled.contains(&territory)
    }

    pub fn unknown_enabled(&self) -> bool {
        self.unknown_enabled
    }

    /// Returns whether the flag actually changed.
    ///
    /// Territories `directory` does not know fall under the unknown flag and are left alone.
    pub fn set_enabled(
        &mut self,
        territory: TerritoryId,
        enabled: bool,
        directory: &dyn TerritoryDirectory,
    ) -> bool {
        if !directory.is_known(territory) {
            warn!(%territory, "not a known territory; use the unknown territory flag instead");
            return false;
        }
        if enabled {
            self.disabled.remove(&territory)
        } else {
            self.disabled.insert(territory)
        }
    }

    /// Returns whether the flag actually changed.
    pub fn set_unknown_enabled(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.unknown_enabled, enabled) != enabled
    }
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
