//! The build-and-package pipeline.
//!
//! Control flow is strictly linear: settings are resolved once, the
//! xcodebuild invocation is assembled and run, and every produced bundle is
//! repackaged as an archive. The temporary build directory lives exactly as
//! long as one invocation.
//!
//! # Module Structure
//!
//! - `settings` - canonical build parameters and their builder
//! - `project` - project/workspace file discovery
//! - `command` - xcodebuild invocation assembly
//! - `runner` - child process execution with streamed output
//! - `package` - .app to .ipa repackaging
//! - `publish` - optional artifact upload
//! - `tools` - external tool detection

mod command;
mod fs;
mod package;
mod project;
mod publish;
mod runner;
mod settings;
mod tools;

pub use command::BuildCommand;
pub use package::discover_bundles;
pub use project::{SourceKind, locate};
pub use publish::{BundleInfo, HttpPublisher, MappingUpload, Publisher, bundle_info, find_mapping_file};
pub use settings::{BuildSettings, CustomSettings, SettingsBuilder};

use crate::error::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Artifacts produced by one pipeline run.
///
/// Holds the temporary build directory alive so the discovered bundles stay
/// inspectable (for the mapping upload) until the artifacts are dropped.
#[derive(Debug)]
pub struct BuildArtifacts {
    /// Discovered .app bundle paths inside the build directory.
    pub bundles: Vec<PathBuf>,
    /// Produced .ipa archive paths, one per bundle.
    pub archives: Vec<PathBuf>,
    _build_dir: TempDir,
}

impl BuildArtifacts {
    /// First produced archive, if any.
    pub fn first_archive(&self) -> Option<&Path> {
        self.archives.first().map(PathBuf::as_path)
    }

    /// First discovered bundle, if any.
    pub fn first_bundle(&self) -> Option<&Path> {
        self.bundles.first().map(PathBuf::as_path)
    }
}

/// Linear build-and-package pipeline.
///
/// # Examples
///
/// ```no_run
/// use xcpack::pipeline::{Pipeline, SettingsBuilder};
///
/// # async fn example() -> xcpack::Result<()> {
/// let settings = SettingsBuilder::new()
///     .source_dir("/path/to/App")
///     .configuration(Some("Release".into()))
///     .build()?;
///
/// let pipeline = Pipeline::new(settings, "/path/to/App/build_ipa".into());
/// let artifacts = pipeline.run().await?;
/// println!("Created {} archive(s)", artifacts.archives.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline {
    settings: BuildSettings,
    output_dir: PathBuf,
}

impl Pipeline {
    /// Creates a pipeline for the given settings and output directory.
    pub fn new(settings: BuildSettings, output_dir: PathBuf) -> Self {
        Self {
            settings,
            output_dir,
        }
    }

    /// Returns the resolved build settings.
    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Returns the final output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs the pipeline: assemble the build command, execute it, then
    /// package every produced bundle.
    ///
    /// The output directory is created if absent; prior contents other than
    /// same-named archives are left untouched.
    pub async fn run(&self) -> Result<BuildArtifacts> {
        // Fresh per invocation, removed on drop of the returned artifacts
        let build_dir = tempfile::tempdir()?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let output_dir = self.output_dir.canonicalize()?;

        let command = command::assemble(&self.settings, build_dir.path(), &output_dir)?;
        let program = tools::xcodebuild()?;
        runner::run_build(&program, &command).await?;

        let (bundles, archives) = package::package_bundles(build_dir.path(), &output_dir).await?;

        Ok(BuildArtifacts {
            bundles,
            archives,
            _build_dir: build_dir,
        })
    }
}
