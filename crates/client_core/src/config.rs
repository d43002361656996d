use std::path::{Path, PathBuf};

use anyhow::Context;
use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use shared::{
    domain::TerritoryId,
    protocol::{SERVICE_PATH, SERVICE_PORT},
};
use tracing::warn;

use crate::{
    columns::Column,
    filter::TerritoryFilter,
    gazetteer::{Gazetteer, LocationTable, TerritoryDirectory},
    transport::ServiceEndpoint,
    view::{SortDirection, SortKey},
};

/// Settings file looked up in the working directory when no path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "trainlist.toml";
pub const ENV_PREFIX: &str = "TRAINLIST";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub locations_file: Option<PathBuf>,
    pub disabled_territories: Vec<TerritoryId>,
    pub show_unknown_territories: bool,
    pub sort_column: Column,
    pub sort_descending: bool,
    pub log_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: SERVICE_PORT,
            path: SERVICE_PATH.into(),
            locations_file: None,
            disabled_territories: Vec::new(),
            show_unknown_territories: true,
            sort_column: Column::LeadUnit,
            sort_descending: false,
            log_filter: "info".into(),
        }
    }
}

impl ClientSettings {
    /// Layers defaults, the settings file and `TRAINLIST__*` environment variables.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_from(Some(path), true, ENV_PREFIX),
            None => Self::load_from(Some(Path::new(DEFAULT_SETTINGS_FILE)), false, ENV_PREFIX),
        }
    }

    pub(crate) fn load_from(
        file: Option<&Path>,
        required: bool,
        env_prefix: &str,
    ) -> anyhow::Result<Self> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(
                File::from(file)
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }
        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("disabled_territories"),
        );

        let settings = builder
            .build()
            .context("failed to read client settings")?
            .try_deserialize::<Self>()
            .context("invalid client settings")?;
        Ok(settings)
    }

    pub fn endpoint(&self) -> ServiceEndpoint {
        ServiceEndpoint {
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
        }
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey {
            column: self.sort_column,
            direction: if self.sort_descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }
    }

    /// The startup filter. Ids `directory` does not know are dropped with a warning.
    pub fn territory_filter(&self, directory: &dyn TerritoryDirectory) -> TerritoryFilter {
        let disabled = self.disabled_territories.iter().copied().filter(|&id| {
            let known = directory.is_known(id);
            if !known {
                warn!(territory = %id, "ignoring unknown territory in disabled_territories");
            }
            known
        });
        TerritoryFilter::new(disabled, self.show_unknown_territories)
    }

    /// Simulator territories plus the configured location table, if any.
    pub fn gazetteer(&self) -> anyhow::Result<Gazetteer> {
        let locations = match &self.locations_file {
            Some(path) => LocationTable::load(path)
                .with_context(|| format!("failed to load locations from {}", path.display()))?,
            None => LocationTable::default(),
        };
        Ok(Gazetteer::run8(locations))
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
