//! Core types shared by every part of the charm helpers
//!
//! - [`CharmError`] and [`ErrorContext`]: typed library errors and their
//!   user-facing rendering
//! - [`FileOperationError`]: IO failures with the path and purpose attached
//! - [`ConfigValue`] and [`ConfigMap`]: the configuration dictionary model

pub mod error;
pub mod file_error;
pub mod value;

pub use error::{CharmError, ErrorContext, Result, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
pub use value::{ConfigMap, ConfigValue, merge_into};
