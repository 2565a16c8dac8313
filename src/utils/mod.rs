//! Filesystem utilities
//!
//! - [`fs`] - Atomic whole-file writes and optional reads

pub mod fs;

pub use fs::{atomic_write, parent_dir, read_text_file, read_text_file_if_exists};
