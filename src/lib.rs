//! Builds an Xcode project or workspace and packages the output into
//! installable IPA archives.
//!
//! The pipeline is strictly linear: resolve build settings, assemble the
//! `xcodebuild` invocation, run it while streaming its output, wrap every
//! produced `.app` bundle into a `Payload/`-rooted zip archive, and
//! optionally hand the artifacts to an upload endpoint.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use error::{Error, Result};
pub use pipeline::{BuildArtifacts, BuildSettings, Pipeline, SettingsBuilder};
