//! Integration test suite for wsgi-charm
//!
//! End-to-end tests for role configuration resolution, the environment
//! store, and the command-line interface.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolver**: Role resolution from files on disk
//! - **store**: Environment store behavior across store instances
//! - **cli**: The `wsgi-charm` binary
//! - **settings**: `wsgi-charm.toml` and environment overrides

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod resolver;
mod settings;
mod store;
