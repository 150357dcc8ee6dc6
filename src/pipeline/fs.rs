//! File system helpers for bundle staging.

use crate::error::{Error, Result};
use std::io;
use std::path::Path;
use tokio::fs;

/// Recursively copies a directory, creating any parent directories of the
/// destination as necessary. Symlinks inside app bundles are preserved.
///
/// Fails if the source path is not a directory or doesn't exist.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{from:?} is not a directory"),
        )));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Blocking traversal runs on the dedicated thread pool
    tokio::task::spawn_blocking(move || -> io::Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry.map_err(io::Error::other)?;
            let rel_path = entry
                .path()
                .strip_prefix(&from)
                .map_err(io::Error::other)?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path())?;
                symlink(&target, &dest_path)?;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path)?;
            } else {
                std::fs::copy(entry.path(), &dest_path)?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| Error::Io(io::Error::other(format!("directory copy task panicked: {e}"))))??;

    Ok(())
}

/// Removes a file if it exists; absence is not an error.
pub async fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}
