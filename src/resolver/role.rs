//! Variables of the charm's WSGI application role.

use std::path::Path;

use super::ConfigResolver;
use crate::config::CharmSettings;
use crate::core::{ConfigMap, ConfigValue, Result};
use crate::templating::TemplateSource;

/// Role directory inside the charm, unless the settings say otherwise
pub const DEFAULT_ROLE_PATH: &str = "roles/wsgi-app";

/// Variable files of the role, in resolution order
pub const DEFAULT_ROLE_TEMPLATES: &[&str] = &["defaults/main.yml", "vars/main.yml"];

/// Key under which the charm directory is made available to templates
pub const CHARM_DIR_KEY: &str = "charm_dir";

/// Resolve the role's variable files on top of the live charm config.
///
/// `charm_dir` is injected as [`CHARM_DIR_KEY`] before resolution, replacing
/// any value of that name in `runtime_config`. Every call reads the role
/// files again; nothing is cached.
pub fn resolve_role_config(
    charm_dir: &Path,
    settings: &CharmSettings,
    runtime_config: &ConfigMap,
) -> Result<ConfigMap> {
    let role_dir = charm_dir.join(&settings.role_path);
    tracing::debug!("Loading role variables from {}", role_dir.display());

    let sources = settings
        .role_templates
        .iter()
        .map(|name| TemplateSource::load(&role_dir, name))
        .collect::<Result<Vec<_>>>()?;

    let mut initial = runtime_config.clone();
    initial.insert(CHARM_DIR_KEY.to_string(), ConfigValue::from(charm_dir.display().to_string()));

    ConfigResolver::new().resolve(&sources, &initial)
}
