//! Test fixtures for creating sample charm directories
//!
//! This module provides role variable files in the layout the hooks expect
//! (`roles/wsgi-app/defaults/main.yml` and `roles/wsgi-app/vars/main.yml`).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolver::DEFAULT_ROLE_PATH;

/// Test fixture for the two variable files of the WSGI role
#[derive(Clone, Debug)]
pub struct RoleFixture {
    pub name: String,
    pub defaults: String,
    pub vars: String,
}

impl RoleFixture {
    /// Defaults built from the runtime `app_name`, vars built from defaults
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            defaults: r#"
app_user: "{{ app_name }}"
app_dir: "/srv/{{ app_name }}"
wsgi_file: wsgi.py
workers: 2
"#
            .trim()
            .to_string(),
            vars: r#"
static_dir: "{{ app_dir }}/static"
log_dir: "/var/log/{{ app_user }}"
"#
            .trim()
            .to_string(),
        }
    }

    /// Defaults that can only render after vars has been rendered
    pub fn forward_reference() -> Self {
        Self {
            name: "forward_reference".to_string(),
            defaults: r#"
listen: "{{ bind_host }}:{{ bind_port }}"
"#
            .trim()
            .to_string(),
            vars: r#"
bind_host: 0.0.0.0
bind_port: 8000
"#
            .trim()
            .to_string(),
        }
    }

    /// Two variables that only define each other
    pub fn cyclic() -> Self {
        Self {
            name: "cyclic".to_string(),
            defaults: "x: \"{{ y }}\"".to_string(),
            vars: "y: \"{{ x }}\"".to_string(),
        }
    }

    /// A variable nothing ever defines
    pub fn missing_variable() -> Self {
        Self {
            name: "missing_variable".to_string(),
            defaults: "port: 8000".to_string(),
            vars: "database_url: \"postgresql://{{ db_host }}/app\"".to_string(),
        }
    }

    /// Defaults with an unterminated expression
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            defaults: "app_dir: \"{{ app_name\"".to_string(),
            vars: String::new(),
        }
    }

    /// Write the role under `charm_dir` and return the role directory.
    pub fn write_to(&self, charm_dir: &Path) -> Result<PathBuf> {
        let role_dir = charm_dir.join(DEFAULT_ROLE_PATH);
        for (file, content) in [("defaults/main.yml", &self.defaults), ("vars/main.yml", &self.vars)]
        {
            let path = role_dir.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, content)
                .with_context(|| format!("Failed to write fixture {}", path.display()))?;
        }
        Ok(role_dir)
    }
}
