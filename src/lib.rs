//! wsgi-charm - helpers for the hooks of a WSGI application charm
//!
//! The charm deploys a WSGI application with an Ansible-style role. Hooks
//! need three things from this crate: the role's configuration, resolved
//! against the live charm config; a small persistent store of environment
//! variables handed to the application; and connection URLs for related
//! services.
//!
//! # Core Modules
//!
//! ## Configuration Resolution
//! - [`resolver`] - Fixpoint resolution of role variable files
//! - [`templating`] - Tera rendering and referenced-variable extraction
//!
//! ## Hook Support
//! - [`store`] - The `env.json` environment store
//! - [`url`] - URL composition
//! - [`relation`] - PostgreSQL relation events
//!
//! ## Supporting Modules
//! - [`core`] - Value types and error handling
//! - [`config`] - Charm settings (`wsgi-charm.toml`)
//! - [`cli`] - Command-line interface used by the hook scripts
//! - [`utils`] - File system helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wsgi_charm::config::CharmSettings;
//! use wsgi_charm::core::{ConfigMap, ConfigValue};
//! use wsgi_charm::resolver::resolve_role_config;
//!
//! # fn example() -> wsgi_charm::core::Result<()> {
//! let charm_dir = Path::new("/var/lib/juju/agents/unit-blog-0/charm");
//! let settings = CharmSettings::load(charm_dir)?;
//!
//! let mut runtime = ConfigMap::new();
//! runtime.insert("app_name".into(), ConfigValue::from("blog"));
//!
//! let config = resolve_role_config(charm_dir, &settings, &runtime)?;
//! println!("{} variables", config.len());
//! # Ok(())
//! # }
//! ```

// Configuration resolution
pub mod resolver;
pub mod templating;

// Hook support
pub mod relation;
pub mod store;
pub mod url;

// Supporting modules
pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
