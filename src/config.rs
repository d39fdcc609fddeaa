//! User-configurable parameters, loaded from an optional `roster.toml` in
//! the working directory.  Anything not present in the file keeps its
//! default.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::editor::list_mode::ListCmd;

/// Mapping of menu tokens to list commands.
/// Shortcut definition, also allows us to change the type if needed.
pub type ListKeyMap = HashMap<&'static str, ListCmd>;

/// Generates the 'canonical' [`ListKeyMap`]: the single- and double-letter
/// tokens of the list menu
pub fn default_list_keymap() -> ListKeyMap {
    hmap::hmap! {
        "A" => ListCmd::Add,
        "D" => ListCmd::Delete,
        "I" => ListCmd::Insert,
        "U" => ListCmd::Update,
        "M" => ListCmd::Move,
        "V" => ListCmd::View,
        "S" => ListCmd::Save,
        "O" => ListCmd::Open,
        "C" => ListCmd::Clear,
        "Q" => ListCmd::Quit,
        "VL" => ListCmd::LoadVersion,
        "Z" => ListCmd::Undo,
        "Y" => ListCmd::Redo,
        "LF" => ListCmd::ListFiles
    }
}

/// A struct to hold the entire run-time configuration of roster
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How many undo steps each session remembers.  One bound for both
    /// collection flavours.
    pub undo_depth: usize,
    /// Extension given to list files, and used to find them when opening
    pub list_extension: String,
    /// Directory collecting record-table backups
    pub backup_dir: String,
    /// The file a list session saves to before the operator picks one
    pub default_list_file: String,
    /// Token keymap for the list menu (not read from the file)
    #[serde(skip, default = "default_list_keymap")]
    pub list_keymap: ListKeyMap,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            undo_depth: 10,
            list_extension: ".txt".to_owned(),
            backup_dir: "versions".to_owned(),
            default_list_file: "list.txt".to_owned(),
            list_keymap: default_list_keymap(),
        }
    }
}

/// The possible ways that reading a config file can fail
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(inner) => write!(f, "couldn't read config file: {}", inner),
            ConfigError::Parse(inner) => write!(f, "couldn't parse config file: {}", inner),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads and parses the config file at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Like [`Config::load`], but a missing file silently becomes the
    /// default config and a broken one is reported and skipped
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from '{}'", path.display());
                config
            }
            Err(ConfigError::Io(_)) => {
                log::trace!("No config file at '{}', using defaults", path.display());
                Config::default()
            }
            Err(error) => {
                log::warn!("{}; using defaults", error);
                Config::default()
            }
        }
    }
}
