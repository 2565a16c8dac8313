//! File system helpers
//!
//! Writes are whole-file and atomic from a reader's point of view: content
//! goes to a temp file next to the target, is synced, then renamed over the
//! target. Parent directories are never created here; a missing directory is
//! reported to the caller.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::core::{FileOperation, FileOperationError, FileResultExt};

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Write content to `<target>.tmp` in the same directory
/// 2. Sync the temp file to disk
/// 3. Rename the temp file over the target
///
/// Readers see either the old content or the new content, never a partial
/// write.
pub fn atomic_write(path: &Path, content: &[u8], purpose: &str) -> Result<(), FileOperationError> {
    let temp_path = temp_path_for(path);

    let mut file =
        fs::File::create(&temp_path).with_file_context(FileOperation::Write, &temp_path, purpose)?;
    let written = file
        .write_all(content)
        .with_file_context(FileOperation::Write, &temp_path, purpose)
        .and_then(|()| file.sync_all().with_file_context(FileOperation::Sync, &temp_path, purpose));
    drop(file);

    // Cleanup is best effort; the original failure is what the caller needs to see
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(FileOperationError::new(FileOperation::Rename, path, purpose, err));
    }

    tracing::trace!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads a UTF-8 text file.
pub fn read_text_file(path: &Path, purpose: &str) -> Result<String, FileOperationError> {
    fs::read_to_string(path).with_file_context(FileOperation::Read, path, purpose)
}

/// Reads a UTF-8 text file, returning `None` when it does not exist.
///
/// Any other failure (permissions, invalid UTF-8, a directory at the path)
/// is still an error.
pub fn read_text_file_if_exists(
    path: &Path,
    purpose: &str,
) -> Result<Option<String>, FileOperationError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(FileOperationError::new(FileOperation::Read, path, purpose, err)),
    }
}

/// Absolute parent of a directory, or of the directory containing a file.
///
/// `/srv/charm/hooks` (a directory) gives `/srv/charm`; `/srv/charm/hooks/install`
/// (a file) gives `/srv/charm` as well. Relative paths are taken from the
/// current working directory. Symlinks are not resolved.
pub fn parent_dir(path: &Path) -> std::io::Result<PathBuf> {
    let dir = if path.is_dir() {
        path.to_path_buf()
    } else {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    };

    let absolute = if dir.is_absolute() {
        dir
    } else {
        std::env::current_dir()?.join(dir)
    };

    let mut normalized = normalize_path(&absolute);
    normalized.pop();
    Ok(normalized)
}

/// Lexically resolve `.` and `..` components.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
