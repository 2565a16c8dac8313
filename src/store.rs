//! Persistent environment-variable store.
//!
//! Hooks hand values to the WSGI application through a single JSON object on
//! disk (`env.json` in the charm's cache directory). Every mutation is a
//! read-modify-write of the whole object, rewritten atomically.
//!
//! # Concurrency
//!
//! No file locking is done. The orchestration runtime never runs two hooks of
//! the same unit at once, and the store relies on that: two processes calling
//! [`EnvStore::set_one`] concurrently could lose one of the updates.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wsgi_charm::store::EnvStore;
//!
//! # fn example() -> wsgi_charm::core::Result<()> {
//! let store = EnvStore::in_dir("/var/lib/juju/agents/unit-app-0/charm");
//! store.set_one("DATABASE_URL", "postgresql://app@db/app")?;
//! assert!(store.get_all()?.contains_key("DATABASE_URL"));
//! store.delete_one("DATABASE_URL")?;
//! # Ok(())
//! # }
//! ```

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::core::{CharmError, Result};
use crate::utils::fs::{atomic_write, read_text_file_if_exists};

/// File name of the store inside a cache directory
pub const ENV_FILE_NAME: &str = "env.json";

/// The stored mapping: string keys to JSON values
pub type EnvVars = Map<String, Value>;

/// Key/value store backed by one JSON file
#[derive(Debug, Clone)]
pub struct EnvStore {
    path: PathBuf,
}

impl EnvStore {
    /// Store backed by the file at `path`. Nothing is touched on disk yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Store backed by [`ENV_FILE_NAME`] inside `cache_dir`.
    pub fn in_dir(cache_dir: impl AsRef<Path>) -> Self {
        Self::new(cache_dir.as_ref().join(ENV_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole mapping.
    ///
    /// A missing file is an empty mapping. A file that exists but does not
    /// hold a JSON object is a [`CharmError::Decode`]; it is never treated as
    /// empty, since that would discard whatever was stored before.
    pub fn get_all(&self) -> Result<EnvVars> {
        let Some(content) = read_text_file_if_exists(&self.path, "loading environment variables")?
        else {
            tracing::debug!("No environment store at {}, treating as empty", self.path.display());
            return Ok(EnvVars::new());
        };

        serde_json::from_str(&content).map_err(|source| CharmError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the stored mapping with exactly `vars`.
    pub fn set_all(&self, vars: &EnvVars) -> Result<()> {
        // A string-keyed map of JSON values always serializes
        let json = Value::Object(vars.clone()).to_string();
        atomic_write(&self.path, json.as_bytes(), "saving environment variables")?;
        tracing::debug!("Saved {} environment variable(s) to {}", vars.len(), self.path.display());
        Ok(())
    }

    /// Set one key, keeping every other stored key.
    pub fn set_one(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let mut vars = self.get_all()?;
        vars.insert(key.to_string(), value.into());
        self.set_all(&vars)
    }

    /// Remove one key. Removing a key that is not stored is a no-op.
    pub fn delete_one(&self, key: &str) -> Result<()> {
        let mut vars = self.get_all()?;
        if vars.remove(key).is_none() {
            tracing::debug!("Environment variable '{key}' was not set");
        }
        self.set_all(&vars)
    }

    /// Look up a single key.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_all()?.remove(key))
    }
}
