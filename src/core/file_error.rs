//! Structured file system errors.
//!
//! File operations capture their context at the call site (what was being
//! done, to which path, and why) instead of leaving callers to parse
//! `std::io::Error` messages.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Types of file operations performed by the charm helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Reading a file completely
    Read,
    /// Creating or writing a file
    Write,
    /// Flushing file contents to disk
    Sync,
    /// Moving a temp file over its target
    Rename,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Sync => write!(f, "syncing"),
            FileOperation::Rename => write!(f, "renaming"),
        }
    }
}

/// File operation error with the context it happened in
#[derive(Error, Debug)]
#[error("File operation failed: {operation} {} ({purpose})", .file_path.display())]
pub struct FileOperationError {
    /// The type of operation that failed
    pub operation: FileOperation,
    /// The file path that was being accessed
    pub file_path: PathBuf,
    /// Why the file was being accessed
    pub purpose: String,
    /// The underlying IO error
    #[source]
    pub source: std::io::Error,
}

impl FileOperationError {
    pub fn new(
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self {
            operation,
            file_path: file_path.into(),
            purpose: purpose.into(),
            source,
        }
    }

    /// Get a user-friendly error message with context
    pub fn user_message(&self) -> String {
        let mut message = format!(
            "Failed {} '{}' for {}",
            self.operation,
            self.file_path.display(),
            self.purpose
        );

        match self.source.kind() {
            std::io::ErrorKind::NotFound => {
                let parent = self.file_path.parent().map(Path::display);
                match parent {
                    Some(dir) if self.operation != FileOperation::Read => {
                        message.push_str(&format!(
                            "\n\nThe directory '{dir}' does not exist. It is not created automatically."
                        ));
                    }
                    _ => message.push_str("\n\nThe file does not exist at the specified path."),
                }
            }
            std::io::ErrorKind::PermissionDenied => {
                message.push_str(&format!(
                    "\n\nPermission denied. Check file/directory permissions for: {}",
                    self.file_path.display()
                ));
            }
            std::io::ErrorKind::InvalidData => {
                message.push_str("\n\nThe file contains invalid data or encoding.");
            }
            _ => {
                message.push_str(&format!("\n\nError details: {}", self.source));
            }
        }

        message
    }
}

/// Extension trait attaching file context to `std::io::Result`
pub trait FileResultExt<T> {
    fn with_file_context(
        self,
        operation: FileOperation,
        path: &Path,
        purpose: &str,
    ) -> Result<T, FileOperationError>;
}

impl<T> FileResultExt<T> for std::io::Result<T> {
    fn with_file_context(
        self,
        operation: FileOperation,
        path: &Path,
        purpose: &str,
    ) -> Result<T, FileOperationError> {
        self.map_err(|source| FileOperationError::new(operation, path, purpose, source))
    }
}
