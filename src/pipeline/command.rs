//! Assembles the xcodebuild invocation.
//!
//! The invocation is an argument vector, never a shell string, so scheme,
//! target and configuration names are passed through verbatim.

use crate::error::Result;
use crate::pipeline::project::{self, SourceKind};
use crate::pipeline::settings::BuildSettings;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

/// A fully assembled external command: program name plus argument vector.
#[derive(Clone, Debug)]
pub struct BuildCommand {
    program: &'static str,
    args: Vec<OsString>,
}

impl BuildCommand {
    fn new(program: &'static str) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends a `KEY=value` build-setting argument.
    fn setting(&mut self, key: &str, value: impl AsRef<OsStr>) -> &mut Self {
        let mut arg = OsString::from(key);
        arg.push("=");
        arg.push(value.as_ref());
        self.args.push(arg);
        self
    }

    /// Program to execute.
    pub fn program(&self) -> &str {
        self.program
    }

    /// Argument vector, in order.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Assembles the `xcodebuild build -sdk iphoneos` invocation for the given
/// settings, pointing build products at `build_dir` and dSYM output at
/// `output_dir`.
///
/// Caller-supplied settings come first in insertion order; the injected
/// overrides follow, each only when the caller did not already supply it.
pub fn assemble(
    settings: &BuildSettings,
    build_dir: &Path,
    output_dir: &Path,
) -> Result<BuildCommand> {
    let mut command = BuildCommand::new("xcodebuild");
    command.arg("build").arg("-sdk").arg("iphoneos");

    if settings.workspace() {
        let workspace = project::locate(settings.source_dir(), SourceKind::Workspace)?;
        command.arg("-workspace").arg(&workspace);
        if let Some(scheme) = settings.scheme() {
            command.arg("-scheme").arg(scheme);
        }
    } else {
        let project = project::locate(settings.source_dir(), SourceKind::Project)?;
        command.arg("-project").arg(&project);
    }

    if let Some(configuration) = settings.configuration() {
        command.arg("-configuration").arg(configuration);
    }
    if let Some(target) = settings.target() {
        command.arg("-target").arg(target);
    }

    let custom = settings.custom();
    for (key, value) in custom.iter() {
        command.setting(key, value);
    }

    if let Some(wrapper) = settings.wrapper_name()
        && !custom.contains_key("WRAPPER_NAME")
    {
        command.setting("WRAPPER_NAME", wrapper);
    }
    if !custom.contains_key("TARGET_BUILD_DIR") {
        command.setting("TARGET_BUILD_DIR", build_dir);
    }
    if !custom.contains_key("CONFIGURATION_BUILD_DIR") {
        command.setting("CONFIGURATION_BUILD_DIR", build_dir);
    }
    if !custom.contains_key("DWARF_DSYM_FOLDER_PATH") {
        command.setting("DWARF_DSYM_FOLDER_PATH", output_dir);
    }
    if let Some(dsym) = settings.dsym_name()
        && !custom.contains_key("DWARF_DSYM_FILE_NAME")
    {
        command.setting("DWARF_DSYM_FILE_NAME", dsym);
    }

    Ok(command)
}
