use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::columns::ModelId;

/// Load-stage configuration, read from a TOML file when one exists.
///
/// Model 18 ships excluded by default: a retired evaluation run whose
/// results predate the current labeling pass. The exclusion is data, not a
/// literal in the pipeline, so other ids can be retired the same way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub excluded_models: BTreeSet<ModelId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excluded_models: BTreeSet::from([18]),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_file_path()
            && let Ok(content) = std::fs::read_to_string(config_path)
            && let Ok(config) = toml::from_str(&content)
        {
            return config;
        }
        Self::default()
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            std::fs::write(config_path, content)?;
        }
        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("grovemetrics");
            path.push("config.toml");
            path
        })
    }

    /// Extra exclusions from the command line, merged on top of the file.
    pub fn with_excluded(mut self, extra: impl IntoIterator<Item = ModelId>) -> Self {
        self.excluded_models.extend(extra);
        self
    }
}
