use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Where undo snapshots are kept
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UndoMode {
    /// Each snapshot is a schematic file in the temporary directory
    #[default]
    Disk,
    /// Each snapshot is a copy of the object graph
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    /// Record undo history at all
    pub enabled: bool,

    /// disk: snapshots are written to temporary files
    /// memory: snapshots are copies of the document
    pub mode: UndoMode,

    /// How many undo levels to keep
    pub levels: usize,

    /// Extra levels allowed before the history is trimmed back to `levels`
    pub padding: usize,

    /// Check whether trimming is needed every this many commits
    pub trim_every: u64,
}

impl Default for UndoConfig {
    fn default() -> Self {
        UndoConfig {
            enabled: true,
            mode: UndoMode::Disk,
            levels: 10,
            padding: 5,
            trim_every: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Seconds between backups of changed pages, 0 disables backups
    pub interval: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        AutoSaveConfig { interval: 120 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub undo: UndoConfig,
    pub autosave: AutoSaveConfig,
}

pub fn read_config(config_path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(config_path))
        .build()?;

    let config = config.try_deserialize::<Config>()?;

    Ok(config)
}
