//! Project and workspace file discovery.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// What kind of Xcode source file to look for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// A `.xcodeproj` directory
    Project,
    /// A `.xcworkspace` directory
    Workspace,
}

impl SourceKind {
    /// Extension the source file carries, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            SourceKind::Project => "xcodeproj",
            SourceKind::Workspace => "xcworkspace",
        }
    }
}

/// Resolves the project or workspace file for a source root.
///
/// If the root itself carries the matching extension it is used directly;
/// otherwise the first `*.{ext}` entry inside the root wins.
///
/// # Errors
///
/// - [`Error::SourceNotFound`] when the root does not exist
/// - [`Error::SourceFileNotFound`] when no matching entry exists
pub fn locate(root: &Path, kind: SourceKind) -> Result<PathBuf> {
    if !root.exists() {
        return Err(Error::SourceNotFound(root.to_path_buf()));
    }

    if root.extension().and_then(|ext| ext.to_str()) == Some(kind.extension()) {
        return Ok(root.to_path_buf());
    }

    // Plain read_dir: discovery is non-recursive and the root may contain
    // glob metacharacters.
    let mut matches: Vec<PathBuf> = std::fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(kind.extension()))
        .collect();
    matches.sort();

    matches
        .into_iter()
        .next()
        .ok_or_else(|| Error::SourceFileNotFound {
            dir: root.to_path_buf(),
            extension: kind.extension(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn root_with_matching_extension_is_used_directly() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("App.xcodeproj");
        fs::create_dir(&project).unwrap();

        assert_eq!(locate(&project, SourceKind::Project).unwrap(), project);
    }

    #[test]
    fn first_child_entry_is_chosen() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("App.xcodeproj")).unwrap();
        fs::create_dir(dir.path().join("Other.txt")).unwrap();

        let found = locate(dir.path(), SourceKind::Project).unwrap();
        assert_eq!(found, dir.path().join("App.xcodeproj"));
    }

    #[test]
    fn workspace_lookup_ignores_projects() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("App.xcodeproj")).unwrap();

        let err = locate(dir.path(), SourceKind::Workspace).unwrap_err();
        assert!(matches!(
            err,
            Error::SourceFileNotFound {
                extension: "xcworkspace",
                ..
            }
        ));
    }

    #[test]
    fn roots_with_glob_metacharacters_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("wei[rd] *dir?");
        fs::create_dir(&root).unwrap();
        fs::create_dir(root.join("App.xcodeproj")).unwrap();

        let found = locate(&root, SourceKind::Project).unwrap();
        assert_eq!(found, root.join("App.xcodeproj"));
    }

    #[test]
    fn missing_root_fails_cleanly() {
        let err = locate(Path::new("/no/such/root"), SourceKind::Project).unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }
}
