//! Canonical build parameters and their builder.
//!
//! User input is resolved exactly once into an immutable [`BuildSettings`]
//! value which every later stage receives by reference.

use crate::error::{Error, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Ordered map of custom `KEY=value` build settings.
///
/// Keys are unique with last occurrence winning, but the original insertion
/// position is preserved so settings reach xcodebuild in the order the user
/// wrote them.
#[derive(Clone, Debug, Default)]
pub struct CustomSettings(Vec<(String, String)>);

impl CustomSettings {
    /// Creates an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses free-form `KEY=value` tokens.
    ///
    /// Each token is split on the first `=` with both sides trimmed; a token
    /// without `=` becomes a key with an empty value.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut settings = Self::new();
        for token in tokens {
            let (key, value) = match token.as_ref().split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (token.as_ref().trim(), ""),
            };
            if !key.is_empty() {
                settings.insert(key, value);
            }
        }
        settings
    }

    /// Inserts a setting; an existing key keeps its position, only the value
    /// is replaced.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    /// Returns true if the caller supplied this key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Iterates settings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no settings were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Immutable parameters for one build-and-package invocation.
///
/// Constructed via [`SettingsBuilder`]; stages receive this by reference and
/// never mutate it.
#[derive(Clone, Debug)]
pub struct BuildSettings {
    /// Project or workspace root directory.
    source_dir: PathBuf,

    /// Whether to build a workspace (`-workspace -scheme`) instead of a
    /// project (`-project`).
    workspace: bool,

    /// Scheme name, required in workspace mode.
    scheme: Option<String>,

    /// Target passed to xcodebuild.
    target: Option<String>,

    /// Build configuration name.
    configuration: Option<String>,

    /// Wrapper (.app) name derived from the output-name override.
    wrapper_name: Option<String>,

    /// dSYM bundle name derived from the wrapper name.
    dsym_name: Option<String>,

    /// Caller-supplied build settings.
    custom: CustomSettings,
}

impl BuildSettings {
    /// Returns the resolved source directory.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Returns true when building a workspace.
    pub fn workspace(&self) -> bool {
        self.workspace
    }

    /// Returns the scheme name, if any.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Returns the target name, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Returns the configuration name, if any.
    pub fn configuration(&self) -> Option<&str> {
        self.configuration.as_deref()
    }

    /// Returns the wrapper (.app) name when an output-name override was given.
    pub fn wrapper_name(&self) -> Option<&str> {
        self.wrapper_name.as_deref()
    }

    /// Returns the derived dSYM bundle name, if any.
    pub fn dsym_name(&self) -> Option<&str> {
        self.dsym_name.as_deref()
    }

    /// Returns the caller-supplied build settings.
    pub fn custom(&self) -> &CustomSettings {
        &self.custom
    }
}

/// Builder for constructing [`BuildSettings`].
///
/// Validates the combination of inputs: the source directory must exist and
/// workspace mode requires a scheme.
#[derive(Default)]
pub struct SettingsBuilder {
    source_dir: Option<PathBuf>,
    workspace: bool,
    scheme: Option<String>,
    target: Option<String>,
    configuration: Option<String>,
    output_name: Option<PathBuf>,
    custom: CustomSettings,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project or workspace root directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Selects workspace mode.
    pub fn workspace(mut self, workspace: bool) -> Self {
        self.workspace = workspace;
        self
    }

    /// Sets the scheme to build.
    pub fn scheme(mut self, scheme: Option<String>) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the xcodebuild target.
    pub fn target(mut self, target: Option<String>) -> Self {
        self.target = target;
        self
    }

    /// Sets the build configuration.
    pub fn configuration(mut self, configuration: Option<String>) -> Self {
        self.configuration = configuration;
        self
    }

    /// Sets the output-name override.
    ///
    /// The wrapper name becomes the override's file stem with `.app`
    /// appended, and the dSYM name is the wrapper name with `.dSYM` appended.
    pub fn output_name(mut self, name: Option<PathBuf>) -> Self {
        self.output_name = name;
        self
    }

    /// Sets the caller-supplied build settings.
    pub fn custom_settings(mut self, custom: CustomSettings) -> Self {
        self.custom = custom;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// - [`Error::Usage`] when no source directory was set
    /// - [`Error::SourceNotFound`] when the source path does not exist
    /// - [`Error::SchemeRequired`] in workspace mode without a scheme
    pub fn build(self) -> Result<BuildSettings> {
        let source_dir = self.source_dir.ok_or_else(|| Error::Usage {
            reason: "source directory is required".to_string(),
        })?;
        let source_dir = source_dir.absolutize()?.into_owned();
        if !source_dir.exists() {
            return Err(Error::SourceNotFound(source_dir));
        }

        let scheme = non_blank(self.scheme);
        if self.workspace && scheme.is_none() {
            return Err(Error::SchemeRequired);
        }

        let wrapper_name = self
            .output_name
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|stem| stem.to_str())
            .map(|stem| format!("{stem}.app"));
        let dsym_name = wrapper_name.as_deref().map(|name| format!("{name}.dSYM"));

        Ok(BuildSettings {
            source_dir,
            workspace: self.workspace,
            scheme,
            target: non_blank(self.target),
            configuration: non_blank(self.configuration),
            wrapper_name,
            dsym_name,
            custom: self.custom,
        })
    }
}

/// Empty and whitespace-only option values count as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
