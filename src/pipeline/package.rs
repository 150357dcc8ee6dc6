//! Repackages built .app bundles into .ipa archives.
//!
//! Each bundle is staged under a fixed `Payload/` directory inside a scratch
//! dir and compressed with `zip -qr`. The scratch dir is dropped on every
//! path; the destination archive is overwritten, never duplicated.

use crate::error::{Error, Result};
use crate::pipeline::{fs, tools};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Archive extension produced for every bundle.
const ARCHIVE_EXT: &str = "ipa";

/// Fixed payload directory name inside the archive.
const PAYLOAD_DIR: &str = "Payload";

/// Packages every .app bundle found at the top level of `build_dir` into an
/// archive in `output_dir`.
///
/// Returns the discovered bundle paths and the produced archive paths, one
/// archive per bundle.
///
/// # Errors
///
/// [`Error::NoBundles`] when the build left nothing to package; archive
/// failures are reported per bundle.
pub async fn package_bundles(
    build_dir: &Path,
    output_dir: &Path,
) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    tokio::fs::create_dir_all(output_dir).await?;
    // The archive command runs with the scratch dir as cwd, so the
    // destination must be absolute.
    let output_dir = output_dir.canonicalize()?;

    let bundles = discover_bundles(build_dir)?;
    if bundles.is_empty() {
        return Err(Error::NoBundles(build_dir.to_path_buf()));
    }

    let mut archives = Vec::with_capacity(bundles.len());
    for bundle in &bundles {
        let archive = output_dir.join(archive_name(bundle));
        archive_bundle(bundle, &archive).await?;
        log::info!("✓ Packaged {}", archive.display());
        archives.push(archive);
    }

    log::info!(
        "Build succeeded: {} archive(s) in {}",
        archives.len(),
        output_dir.display()
    );
    Ok((bundles, archives))
}

/// Lists top-level .app bundles in the build directory, sorted by name.
pub fn discover_bundles(build_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut bundles = Vec::new();
    for entry in std::fs::read_dir(build_dir)? {
        let path = entry?.path();
        if path.is_dir() && path.extension() == Some(OsStr::new("app")) {
            bundles.push(path);
        }
    }
    bundles.sort();
    Ok(bundles)
}

/// `<bundle_stem>.ipa`
fn archive_name(bundle: &Path) -> PathBuf {
    let mut name = bundle.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(ARCHIVE_EXT);
    PathBuf::from(name)
}

/// Stages one bundle under `Payload/` in a scratch dir and compresses it to
/// `archive`, replacing any previous archive at that path.
async fn archive_bundle(bundle: &Path, archive: &Path) -> Result<()> {
    let zip = tools::zip()?;

    let scratch = tempfile::tempdir()?;
    let payload = scratch.path().join(PAYLOAD_DIR);
    tokio::fs::create_dir(&payload).await?;

    let bundle_name = bundle.file_name().unwrap_or(bundle.as_os_str());
    fs::copy_dir(bundle, &payload.join(bundle_name)).await?;

    fs::remove_file_if_exists(archive).await?;

    let output = Command::new(&zip)
        .arg("-qr")
        .arg(archive)
        .arg(PAYLOAD_DIR)
        .current_dir(scratch.path())
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| Error::Spawn {
            program: "zip".to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(Error::ArchiveFailed {
            archive: archive.to_path_buf(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    // Scratch dir is removed on drop, success or not
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use std::io::Read;
    use tempfile::TempDir;

    fn fake_bundle(build_dir: &Path, name: &str) -> PathBuf {
        let bundle = build_dir.join(name);
        stdfs::create_dir_all(bundle.join("Frameworks")).unwrap();
        stdfs::write(bundle.join("Info.plist"), b"<plist/>").unwrap();
        stdfs::write(bundle.join("Frameworks/lib.dylib"), b"\xfe\xed\xfa\xce").unwrap();
        bundle
    }

    fn have_zip() -> bool {
        which::which("zip").is_ok()
    }

    #[test]
    fn discovery_lists_only_top_level_app_dirs() {
        let build = TempDir::new().unwrap();
        fake_bundle(build.path(), "B.app");
        fake_bundle(build.path(), "A.app");
        stdfs::create_dir(build.path().join("NotABundle")).unwrap();
        stdfs::write(build.path().join("loose.app"), b"file, not dir").unwrap();
        // Nested bundles must not be picked up
        fake_bundle(&build.path().join("NotABundle"), "Nested.app");

        let bundles = discover_bundles(build.path()).unwrap();
        let names: Vec<_> = bundles
            .iter()
            .map(|b| b.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.app", "B.app"]);
    }

    #[test]
    fn archive_names_substitute_the_extension() {
        assert_eq!(
            archive_name(Path::new("/tmp/build/My App.app")),
            PathBuf::from("My App.ipa")
        );
    }

    #[tokio::test]
    async fn zero_bundles_is_an_error_and_writes_nothing() {
        let build = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        let err = package_bundles(build.path(), out.path()).await.unwrap_err();
        assert!(matches!(err, Error::NoBundles(_)));
        assert_eq!(stdfs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn each_bundle_yields_one_archive() {
        if !have_zip() {
            return;
        }
        let build = TempDir::new().unwrap();
        fake_bundle(build.path(), "One.app");
        fake_bundle(build.path(), "Two.app");
        let out = TempDir::new().unwrap();

        let (bundles, archives) = package_bundles(build.path(), out.path()).await.unwrap();
        assert_eq!(bundles.len(), 2);
        let names: Vec<_> = archives
            .iter()
            .map(|a| a.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["One.ipa", "Two.ipa"]);
        assert!(archives.iter().all(|a| a.is_file()));
    }

    #[tokio::test]
    async fn archive_round_trips_the_bundle_under_payload() {
        if !have_zip() {
            return;
        }
        let build = TempDir::new().unwrap();
        fake_bundle(build.path(), "Demo.app");
        let out = TempDir::new().unwrap();

        let (_, archives) = package_bundles(build.path(), out.path()).await.unwrap();
        let file = stdfs::File::open(&archives[0]).unwrap();
        let mut zip = zip::ZipArchive::new(file).unwrap();

        let names: Vec<_> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.iter().all(|n| n.starts_with("Payload/")));
        assert!(names.contains(&"Payload/Demo.app/Info.plist".to_string()));

        let mut contents = Vec::new();
        zip.by_name("Payload/Demo.app/Frameworks/lib.dylib")
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        assert_eq!(contents, b"\xfe\xed\xfa\xce");
    }

    #[tokio::test]
    async fn repackaging_overwrites_instead_of_duplicating() {
        if !have_zip() {
            return;
        }
        let build = TempDir::new().unwrap();
        fake_bundle(build.path(), "Demo.app");
        let out = TempDir::new().unwrap();

        package_bundles(build.path(), out.path()).await.unwrap();
        package_bundles(build.path(), out.path()).await.unwrap();

        let ipas = stdfs::read_dir(out.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension() == Some(OsStr::new("ipa")))
            .count();
        assert_eq!(ipas, 1);
    }
}
