//! Charm settings
//!
//! Settings come from an optional `wsgi-charm.toml` at the root of the charm
//! directory. Every field has a default matching the standard charm layout,
//! so a charm without the file works unchanged.
//!
//! ```toml
//! role_path = "roles/wsgi-app"
//! role_templates = ["defaults/main.yml", "vars/main.yml"]
//! cache_dir = "/var/lib/wsgi-charm"
//! ```
//!
//! # Configuration Priority
//!
//! 1. Environment variables (`CHARM_DIR`, `WSGI_CHARM_CACHE_DIR`)
//! 2. `wsgi-charm.toml` in the charm directory
//! 3. Default values

mod parser;

pub use parser::parse_config;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Result;
use crate::resolver::{DEFAULT_ROLE_PATH, DEFAULT_ROLE_TEMPLATES};

/// Settings file name, looked up in the charm directory
pub const SETTINGS_FILE_NAME: &str = "wsgi-charm.toml";

/// Environment variable naming the charm directory
pub const CHARM_DIR_ENV: &str = "CHARM_DIR";

/// Environment variable overriding [`CharmSettings::cache_dir`]
pub const CACHE_DIR_ENV: &str = "WSGI_CHARM_CACHE_DIR";

/// Settings for one charm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CharmSettings {
    /// Role directory, relative to the charm directory
    pub role_path: PathBuf,

    /// Role variable files, relative to `role_path`, in resolution order
    pub role_templates: Vec<String>,

    /// Directory holding `env.json`. Relative paths are taken from the charm
    /// directory; `None` means the charm directory itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl Default for CharmSettings {
    fn default() -> Self {
        Self {
            role_path: PathBuf::from(DEFAULT_ROLE_PATH),
            role_templates: DEFAULT_ROLE_TEMPLATES.iter().map(ToString::to_string).collect(),
            cache_dir: None,
        }
    }
}

impl CharmSettings {
    /// Load settings for `charm_dir`, applying environment overrides.
    pub fn load(charm_dir: &Path) -> Result<Self> {
        let mut settings = Self::load_from_file(&charm_dir.join(SETTINGS_FILE_NAME))?;
        settings.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Load settings from `path`, or defaults when the file does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        match parse_config(path)? {
            Some(settings) => {
                tracing::debug!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            None => Ok(Self::default()),
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
            tracing::debug!("Cache directory overridden by {CACHE_DIR_ENV}: {dir}");
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    /// Directory holding the environment store for `charm_dir`.
    pub fn cache_dir_for(&self, charm_dir: &Path) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => charm_dir.join(dir),
            None => charm_dir.to_path_buf(),
        }
    }
}

/// Charm directory from an explicit value, `CHARM_DIR`, or the current
/// directory, in that order.
pub fn charm_dir(explicit: Option<&Path>) -> std::io::Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    match std::env::var_os(CHARM_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => std::env::current_dir(),
    }
}
