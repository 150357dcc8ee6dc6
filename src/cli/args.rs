//! Command line argument parsing and validation.

use clap::Parser;
use std::path::PathBuf;

/// IPA packaging frontend for xcodebuild
#[derive(Parser, Debug)]
#[command(
    name = "xcpack",
    version,
    about = "Builds an Xcode project or workspace and packages the output as .ipa archives",
    long_about = "Builds an Xcode project or workspace with xcodebuild, collects the produced
.app bundles from an ephemeral build directory and repackages each one as an
installable .ipa archive in the output directory. dSYM bundles are deposited
next to the archives.

Usage:
  xcpack /path/to/App
  xcpack /path/to/App -t App -c Release -o ./dist
  xcpack /path/to/App -w -S AppScheme ENABLE_BITCODE=NO
  xcpack /path/to/App --publish --upload-url https://builds.example.com/upload

Exit code 0 = every discovered bundle has a matching archive in the output directory."
)]
pub struct Args {
    /// Xcode project or workspace directory (or the .xcodeproj/.xcworkspace itself)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Extra build settings forwarded to xcodebuild, each as KEY=VALUE
    #[arg(value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Build a workspace instead of a project (requires --scheme)
    #[arg(short = 'w', long)]
    pub workspace: bool,

    /// Scheme to build in workspace mode
    #[arg(short = 'S', long, value_name = "NAME")]
    pub scheme: Option<String>,

    /// Target passed to xcodebuild
    #[arg(short = 't', long, value_name = "NAME")]
    pub target: Option<String>,

    /// Build configuration, e.g. Debug or Release
    #[arg(short = 'c', long, value_name = "NAME")]
    pub configuration: Option<String>,

    /// Output directory for archives and dSYMs [default: <SOURCE>/build_ipa]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Override the produced app name; the wrapper becomes <stem>.app
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: Option<PathBuf>,

    /// Upload the first produced archive after packaging
    #[arg(long)]
    pub publish: bool,

    /// Upload the dSYM mapping file after packaging
    #[arg(long)]
    pub mapping: bool,

    /// Project identifier sent along with the mapping upload
    #[arg(long, value_name = "ID")]
    pub proj: Option<String>,

    /// API token for the upload endpoint
    #[arg(short = 'T', long, value_name = "TOKEN", env = "XCPACK_TOKEN")]
    pub token: Option<String>,

    /// Upload endpoint for --publish and --mapping
    #[arg(long, value_name = "URL", env = "XCPACK_UPLOAD_URL")]
    pub upload_url: Option<String>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if (self.publish || self.mapping) && self.upload_url.is_none() {
            return Err("--publish and --mapping require --upload-url".to_string());
        }

        if self.mapping && (self.proj.is_none() || self.token.is_none()) {
            return Err("--mapping requires --proj and --token".to_string());
        }

        // Settings are parsed leniently later; a bare `=` can never name a key
        if self.settings.iter().any(|s| s.trim_start().starts_with('=')) {
            return Err("Build settings must be of the form KEY=VALUE".to_string());
        }

        Ok(())
    }
}
