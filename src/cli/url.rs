//! `url` command

use anyhow::Result;
use clap::Args;

use crate::url::{UrlParts, build_url};

#[derive(Args)]
pub struct UrlCommand {
    /// URL scheme, e.g. `postgresql`
    scheme: String,

    /// Host name or address
    domain: String,

    #[arg(long)]
    port: Option<String>,

    #[arg(long)]
    username: Option<String>,

    /// Ignored without --username
    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    path: Option<String>,

    #[arg(long)]
    params: Option<String>,

    #[arg(long)]
    query: Option<String>,

    #[arg(long)]
    fragment: Option<String>,
}

impl UrlCommand {
    pub fn execute(self) -> Result<()> {
        let parts = UrlParts::new(&self.scheme, &self.domain)
            .port(self.port.as_deref())
            .credentials(self.username.as_deref(), self.password.as_deref())
            .path(self.path.as_deref())
            .params(self.params.as_deref())
            .query(self.query.as_deref())
            .fragment(self.fragment.as_deref());

        println!("{}", build_url(&parts));
        Ok(())
    }
}
