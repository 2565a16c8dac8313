//! Common test utilities for wsgi-charm integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wsgi_charm::test_utils::RoleFixture;

/// A charm directory in a temp dir, removed on drop
pub struct TestCharm {
    temp: TempDir,
}

impl TestCharm {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: TempDir::new()?,
        })
    }

    /// Charm directory with `fixture` written as its role
    pub fn with_role(fixture: &RoleFixture) -> Result<Self> {
        let charm = Self::new()?;
        fixture.write_to(charm.path())?;
        Ok(charm)
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Raw content of the environment store
    pub fn env_json(&self) -> Result<Value> {
        let content = fs::read_to_string(self.path().join("env.json"))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The binary, pointed at this charm and isolated from the caller's env
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("wsgi-charm").expect("binary is built");
        cmd.env_remove("RUST_LOG")
            .env_remove("WSGI_CHARM_CACHE_DIR")
            .env("CHARM_DIR", self.path());
        cmd
    }
}
