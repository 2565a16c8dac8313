//! `resolve` command: print the resolved role configuration.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::CommandContext;
use crate::core::{CharmError, ConfigMap};
use crate::resolver::resolve_role_config;
use crate::utils::fs::read_text_file;

#[derive(Args)]
pub struct ResolveCommand {
    /// JSON object with the live charm config; empty when omitted
    #[arg(long, value_name = "FILE")]
    runtime_config: Option<PathBuf>,
}

impl ResolveCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let runtime = match &self.runtime_config {
            Some(path) => {
                let content =
                    read_text_file(path, "loading runtime config").map_err(CharmError::from)?;
                serde_json::from_str::<ConfigMap>(&content).with_context(|| {
                    format!("Runtime config {} is not a JSON object", path.display())
                })?
            }
            None => ConfigMap::new(),
        };

        let config = resolve_role_config(&ctx.charm_dir, &ctx.settings, &runtime)?;
        println!("{}", serde_json::to_string_pretty(&config)?);
        Ok(())
    }
}
