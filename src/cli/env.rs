//! `env` command: the environment store handed to the application.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde_json::Value;

use super::CommandContext;

#[derive(Args)]
pub struct EnvCommand {
    #[command(subcommand)]
    command: EnvSubcommands,
}

#[derive(Subcommand)]
enum EnvSubcommands {
    /// Print every stored variable as a JSON object
    List,

    /// Print one variable
    Get {
        key: String,
    },

    /// Set one variable, keeping the others
    ///
    /// VALUE is stored as JSON when it parses as JSON (`8080`, `true`,
    /// `["a"]`), otherwise as a plain string.
    Set {
        key: String,
        value: String,
    },

    /// Remove one variable; removing a variable that is not set is not an error
    Unset {
        key: String,
    },
}

impl EnvCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let store = ctx.env_store();

        match self.command {
            EnvSubcommands::List => {
                println!("{}", serde_json::to_string_pretty(&store.get_all()?)?);
            }
            EnvSubcommands::Get {
                key,
            } => match store.get(&key)? {
                Some(Value::String(s)) => println!("{s}"),
                Some(value) => println!("{value}"),
                None => bail!("Environment variable '{key}' is not set"),
            },
            EnvSubcommands::Set {
                key,
                value,
            } => {
                store.set_one(&key, parse_value(&value))?;
                tracing::info!("Set {key}");
            }
            EnvSubcommands::Unset {
                key,
            } => {
                store.delete_one(&key)?;
                tracing::info!("Unset {key}");
            }
        }
        Ok(())
    }
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
