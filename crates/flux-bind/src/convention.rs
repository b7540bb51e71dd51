//! Naming convention used to pick action methods out of a store definition.
//!
//! Loaded from `.flux-bind.toml` when present:
//!
//! ```toml
//! action_prefix = "on"
//! sync_prefix = "on"
//! sync_suffix = "Sync"
//! ```

use std::{env, path::PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = ".flux-bind.toml";

/// Prefixes and suffixes that mark store methods as actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// Methods starting with this become async actions
    #[serde(default = "default_action_prefix")]
    pub action_prefix: String,

    /// Methods starting with this and ending with `sync_suffix` become sync actions
    #[serde(default = "default_sync_prefix")]
    pub sync_prefix: String,

    #[serde(default = "default_sync_suffix")]
    pub sync_suffix: String,
}

fn default_action_prefix() -> String {
    "on".to_string()
}

fn default_sync_prefix() -> String {
    "on".to_string()
}

fn default_sync_suffix() -> String {
    "Sync".to_string()
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            action_prefix: default_action_prefix(),
            sync_prefix: default_sync_prefix(),
            sync_suffix: default_sync_suffix(),
        }
    }
}

impl NamingConvention {
    /// Default async predicate: the name starts with `action_prefix`.
    pub fn is_action(&self, name: &str) -> bool {
        name.starts_with(&self.action_prefix)
    }

    /// Default sync predicate: the name starts with `sync_prefix` and ends
    /// with `sync_suffix`.
    pub fn is_sync_action(&self, name: &str) -> bool {
        name.starts_with(&self.sync_prefix) && name.ends_with(&self.sync_suffix)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from CWD first, then the home directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = load_config_file() {
            match Self::from_toml_str(&content) {
                Ok(convention) => {
                    log::info!("Loaded naming convention from file");
                    return convention;
                }
                Err(e) => {
                    log::warn!("Failed to parse naming convention: {}", e);
                }
            }
        }

        log::debug!("Using default naming convention");
        Self::default()
    }
}

fn load_config_file() -> Option<String> {
    if let Ok(content) = std::fs::read_to_string(CONFIG_FILE) {
        log::debug!("Loaded config from {}", CONFIG_FILE);
        return Some(content);
    }

    let home_config = env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))?;
    let content = std::fs::read_to_string(&home_config).ok()?;
    log::debug!("Loaded config from {}", home_config.display());
    Some(content)
}
