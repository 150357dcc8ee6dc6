//! CLI-level validation tests.
//!
//! Every scenario here must fail before any external process is spawned, so
//! the tests run without xcodebuild installed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn xcpack() -> Command {
    Command::cargo_bin("xcpack").unwrap()
}

#[test]
fn help_documents_custom_settings() {
    xcpack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn missing_source_directory_fails() {
    xcpack()
        .arg("/no/such/source/dir")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn workspace_mode_without_scheme_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("App.xcworkspace")).unwrap();

    xcpack()
        .arg(dir.path())
        .arg("-w")
        .assert()
        .failure()
        .stderr(predicate::str::contains("scheme"));
}

#[test]
fn directory_without_project_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    xcpack()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No .xcodeproj"));
}

#[test]
fn publish_without_upload_url_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("App.xcodeproj")).unwrap();

    xcpack()
        .arg(dir.path())
        .arg("--publish")
        .env_remove("XCPACK_UPLOAD_URL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--upload-url"));
}

/// Pipeline behavior around external tool exits, driven through stub
/// executables placed first on PATH.
#[cfg(unix)]
mod tool_exits {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A stand-in xcodebuild that honors TARGET_BUILD_DIR and deposits one
    /// app bundle there, like a successful build would.
    const BUILD_OK: &str = r#"#!/bin/sh
for arg in "$@"; do
    case "$arg" in
        TARGET_BUILD_DIR=*) build_dir="${arg#TARGET_BUILD_DIR=}" ;;
    esac
done
mkdir -p "$build_dir/Stub.app"
echo '<plist/>' > "$build_dir/Stub.app/Info.plist"
echo "BUILD SUCCEEDED"
exit 0
"#;

    fn write_stub(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn stub_path(stubs: &Path) -> String {
        format!("{}:/usr/bin:/bin", stubs.display())
    }

    fn project_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("App.xcodeproj")).unwrap();
        dir
    }

    #[test]
    fn failed_build_aborts_before_packaging() {
        let stubs = tempfile::tempdir().unwrap();
        write_stub(
            stubs.path(),
            "xcodebuild",
            "#!/bin/sh\necho 'error: no signing identity' >&2\nexit 65\n",
        );
        let project = project_dir();
        let out = tempfile::tempdir().unwrap();
        let out_dir = out.path().join("dist");

        xcpack()
            .arg(project.path())
            .arg("-o")
            .arg(&out_dir)
            .env("PATH", stub_path(stubs.path()))
            .assert()
            .failure()
            .stderr(predicate::str::contains("xcodebuild failed"));

        // Nothing was packaged after the failed build
        let produced = fs::read_dir(&out_dir).map(|it| it.count()).unwrap_or(0);
        assert_eq!(produced, 0);
    }

    #[test]
    fn zip_failure_is_reported_with_detail() {
        let stubs = tempfile::tempdir().unwrap();
        write_stub(stubs.path(), "xcodebuild", BUILD_OK);
        write_stub(
            stubs.path(),
            "zip",
            "#!/bin/sh\necho 'stub zip: disk full' >&2\nexit 12\n",
        );
        let project = project_dir();
        let out = tempfile::tempdir().unwrap();
        let out_dir = out.path().join("dist");

        xcpack()
            .arg(project.path())
            .arg("-o")
            .arg(&out_dir)
            .env("PATH", stub_path(stubs.path()))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to create archive"))
            .stderr(predicate::str::contains("Stub.ipa"))
            .stderr(predicate::str::contains("disk full"));

        assert!(!out_dir.join("Stub.ipa").exists());
    }

    #[test]
    fn successful_build_packages_each_bundle() {
        // Needs the real zip tool behind the stub directory
        let Ok(real_zip) = which::which("zip") else {
            return;
        };
        let stubs = tempfile::tempdir().unwrap();
        write_stub(stubs.path(), "xcodebuild", BUILD_OK);
        let project = project_dir();
        let out = tempfile::tempdir().unwrap();
        let out_dir: PathBuf = out.path().join("dist");

        let zip_dir = real_zip.parent().unwrap_or(Path::new("/usr/bin"));
        xcpack()
            .arg(project.path())
            .arg("-o")
            .arg(&out_dir)
            .env(
                "PATH",
                format!("{}:{}", stub_path(stubs.path()), zip_dir.display()),
            )
            .assert()
            .success();

        assert!(out_dir.join("Stub.ipa").is_file());
    }
}

#[test]
fn mapping_without_identifiers_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("App.xcodeproj")).unwrap();

    xcpack()
        .arg(dir.path())
        .arg("--mapping")
        .arg("--upload-url")
        .arg("https://example.com/upload")
        .env_remove("XCPACK_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--proj"));
}
