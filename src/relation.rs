//! PostgreSQL relation handling.
//!
//! When a database unit publishes its connection settings over the `pgsql`
//! relation, the application gets them as a single `DATABASE_URL` in the
//! environment store. The URL is removed again when the relation goes away.

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::store::EnvStore;
use crate::url::{UrlParts, build_url};

/// Environment store key holding the database connection URL
pub const DATABASE_URL_KEY: &str = "DATABASE_URL";

/// URL scheme used for the connection URL
pub const DATABASE_SCHEME: &str = "postgresql";

/// Settings published by the database side of the relation.
///
/// Every field is optional; the remote unit fills them in over several
/// relation-changed events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationData {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Relation lifecycle events the charm reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationEvent {
    Joined,
    Changed,
    Broken,
}

/// Connection URL for `data`, once both `database` and `host` are known.
pub fn database_url(data: &RelationData) -> Option<String> {
    let database = data.database.as_deref().filter(|d| !d.is_empty())?;
    let host = data.host.as_deref().filter(|h| !h.is_empty())?;

    let parts = UrlParts::new(DATABASE_SCHEME, host)
        .port(data.port.as_deref())
        .credentials(data.user.as_deref(), data.password.as_deref())
        .path(Some(database));
    Some(build_url(&parts))
}

/// Apply a `pgsql` relation event to the environment store.
///
/// Joined and changed events store [`DATABASE_URL_KEY`] when the URL can be
/// built and leave the store alone otherwise. A broken relation removes the
/// key. Returns the URL that was stored, if any.
pub fn handle_pgsql_event(
    store: &EnvStore,
    event: RelationEvent,
    data: &RelationData,
) -> Result<Option<String>> {
    match event {
        RelationEvent::Joined | RelationEvent::Changed => match database_url(data) {
            Some(url) => {
                store.set_one(DATABASE_URL_KEY, url.clone())?;
                tracing::info!("Stored {DATABASE_URL_KEY} for host {}", data.host.as_deref().unwrap_or(""));
                Ok(Some(url))
            }
            None => {
                tracing::info!("Database relation is not ready yet: waiting for database and host");
                Ok(None)
            }
        },
        RelationEvent::Broken => {
            store.delete_one(DATABASE_URL_KEY)?;
            tracing::info!("Removed {DATABASE_URL_KEY}");
            Ok(None)
        }
    }
}
