//! External tool detection.
//!
//! Both tools are resolved through PATH lookup before they are run so a
//! missing toolchain surfaces as a named error instead of a spawn failure.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Locates the xcodebuild binary.
pub fn xcodebuild() -> Result<PathBuf> {
    locate("xcodebuild")
}

/// Locates the zip binary used for archive creation.
pub fn zip() -> Result<PathBuf> {
    locate("zip")
}

fn locate(tool: &'static str) -> Result<PathBuf> {
    match which::which(tool) {
        Ok(path) => {
            log::debug!("Found {} at: {}", tool, path.display());
            Ok(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", tool, e);
            Err(Error::ToolNotFound(tool))
        }
    }
}
