//! Error types for the build-and-package pipeline.
//!
//! Every failure is a value returned to the caller; only `main` translates a
//! terminal error into a process exit code.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for all pipeline operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    Usage {
        /// Reason for the error
        reason: String,
    },

    /// The source directory passed on the command line does not exist
    #[error("Source directory {0:?} does not exist")]
    SourceNotFound(PathBuf),

    /// Workspace mode was requested without naming a scheme
    #[error("A scheme is required (-S/--scheme) when building a workspace")]
    SchemeRequired,

    /// No project or workspace file could be discovered in the source directory
    #[error("No .{extension} found in {dir:?}")]
    SourceFileNotFound {
        /// Directory that was searched
        dir: PathBuf,
        /// Extension that was searched for
        extension: &'static str,
    },

    /// The build finished but left no .app bundle to package
    #[error("Build produced no .app bundle in {0:?}, nothing to package")]
    NoBundles(PathBuf),

    /// A required external tool is not on PATH
    #[error("Required tool `{0}` not found on PATH")]
    ToolNotFound(&'static str),

    /// An external command could not be started
    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying IO error
        source: io::Error,
    },

    /// xcodebuild exited with a non-zero status
    #[error("xcodebuild failed with {status}")]
    BuildFailed {
        /// Exit status of the build command
        status: ExitStatus,
    },

    /// The archive command exited with a non-zero status
    #[error("Failed to create archive {archive:?}: {detail}")]
    ArchiveFailed {
        /// Destination archive path
        archive: PathBuf,
        /// Captured stderr of the archive command
        detail: String,
    },

    /// Publishing was requested but the expected artifact was never produced
    #[error("Publishing requested but no {0} was produced")]
    MissingArtifact(&'static str),

    /// The upload endpoint rejected the artifact
    #[error("Upload to {endpoint} rejected with status {status}")]
    UploadRejected {
        /// Endpoint the upload was sent to
        endpoint: String,
        /// HTTP status returned by the service
        status: reqwest::StatusCode,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Info.plist parsing errors
    #[error("Failed to read bundle Info.plist: {0}")]
    Plist(#[from] plist::Error),

    /// Invalid glob pattern (paths containing glob metacharacters)
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// HTTP transport errors during upload
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
