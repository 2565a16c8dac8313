//! `relation` command: react to relation events from the hooks.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};

use super::CommandContext;
use crate::relation::{RelationData, RelationEvent, handle_pgsql_event};

#[derive(Args)]
pub struct RelationCommand {
    #[command(subcommand)]
    relation: Relations,
}

#[derive(Subcommand)]
enum Relations {
    /// PostgreSQL database relation
    Pgsql {
        #[arg(value_enum)]
        event: Event,

        #[arg(long)]
        database: Option<String>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<String>,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Event {
    Joined,
    Changed,
    Broken,
}

impl From<Event> for RelationEvent {
    fn from(event: Event) -> Self {
        match event {
            Event::Joined => Self::Joined,
            Event::Changed => Self::Changed,
            Event::Broken => Self::Broken,
        }
    }
}

impl RelationCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self.relation {
            Relations::Pgsql {
                event,
                database,
                host,
                port,
                user,
                password,
            } => {
                let data = RelationData {
                    database,
                    host,
                    port,
                    user,
                    password,
                };
                handle_pgsql_event(&ctx.env_store(), event.into(), &data)?;
            }
        }
        Ok(())
    }
}
