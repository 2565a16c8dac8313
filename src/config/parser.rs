//! TOML parsing for settings files, with the file path kept in errors.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::core::{CharmError, Result};
use crate::utils::fs::read_text_file_if_exists;

/// Parse a TOML file into `T`, or `None` when the file does not exist.
///
/// Read failures other than "not found" are file errors; invalid TOML or a
/// schema mismatch is [`CharmError::Config`].
pub fn parse_config<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let Some(content) = read_text_file_if_exists(path, "loading charm settings")? else {
        return Ok(None);
    };

    toml::from_str(&content).map(Some).map_err(|e| CharmError::Config {
        path: path.to_path_buf(),
        reason: e.message().to_string(),
    })
}
