//! Test utilities for wsgi-charm
//!
//! This module provides helpers for writing tests: logging setup and fixtures
//! that lay out a charm directory on disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use tempfile::TempDir;
//! use wsgi_charm::test_utils::RoleFixture;
//!
//! let temp = TempDir::new().unwrap();
//! RoleFixture::basic().write_to(temp.path()).unwrap();
//! ```

pub mod fixtures;

pub use fixtures::RoleFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
