//! Optional artifact publishing.
//!
//! The pipeline hands finished artifacts to a [`Publisher`]; the concrete
//! wire protocol stays behind that seam. [`HttpPublisher`] ships a generic
//! authenticated multipart upload.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio_util::codec::{BytesCodec, FramedRead};

/// Version identifiers read from a bundle's Info.plist.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleInfo {
    /// CFBundleVersion, the build number
    #[serde(rename = "CFBundleVersion")]
    pub build: String,
    /// CFBundleShortVersionString, the marketing version
    #[serde(rename = "CFBundleShortVersionString")]
    pub version: String,
}

/// Reads build number and version from an .app bundle.
pub fn bundle_info(bundle: &Path) -> Result<BundleInfo> {
    Ok(plist::from_file(bundle.join("Info.plist"))?)
}

/// Locates the first dSYM mapping file deposited in the output directory,
/// at the fixed relative path `*.dSYM/Contents/Resources/DWARF/*`.
pub fn find_mapping_file(output_dir: &Path) -> Result<Option<PathBuf>> {
    // The directory prefix is user-controlled and must not be interpreted
    // as a pattern.
    let pattern = format!(
        "{}/*.dSYM/Contents/Resources/DWARF/*",
        glob::Pattern::escape(&output_dir.to_string_lossy())
    );
    let mut matches = glob::glob(&pattern)?;
    Ok(matches.find_map(|entry| entry.ok()))
}

/// A dSYM mapping file together with the identifiers the service needs to
/// associate it with a release.
#[derive(Debug, Clone, Copy)]
pub struct MappingUpload<'a> {
    /// Path to the mapping file inside the dSYM bundle
    pub file: &'a Path,
    /// Project identifier on the remote service
    pub proj: &'a str,
    /// Build number from the bundle
    pub build: &'a str,
    /// Marketing version from the bundle
    pub version: &'a str,
    /// API token
    pub token: &'a str,
}

/// Destination for finished artifacts.
pub trait Publisher {
    /// Uploads a produced archive.
    fn publish_build(&self, archive: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Uploads a dSYM mapping file with its release identifiers.
    fn upload_mapping(&self, upload: MappingUpload<'_>) -> impl Future<Output = Result<()>> + Send;
}

/// Publishes artifacts as authenticated multipart POSTs to one endpoint.
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpPublisher {
    /// Creates a publisher for the given endpoint; the token, when present,
    /// is sent as a bearer credential.
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token,
        }
    }

    async fn send(&self, form: reqwest::multipart::Form) -> Result<()> {
        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::UploadRejected {
                endpoint: self.endpoint.clone(),
                status: response.status(),
            });
        }
        Ok(())
    }
}

impl Publisher for HttpPublisher {
    async fn publish_build(&self, archive: &Path) -> Result<()> {
        log::info!("Uploading {} to {}", archive.display(), self.endpoint);
        let form = reqwest::multipart::Form::new().part("file", file_part(archive).await?);
        self.send(form).await?;
        log::info!("✓ Uploaded {}", archive.display());
        Ok(())
    }

    async fn upload_mapping(&self, upload: MappingUpload<'_>) -> Result<()> {
        log::info!(
            "Uploading mapping file {} (build {}, version {})",
            upload.file.display(),
            upload.build,
            upload.version
        );
        let form = reqwest::multipart::Form::new()
            .text("proj", upload.proj.to_string())
            .text("build", upload.build.to_string())
            .text("version", upload.version.to_string())
            .text("token", upload.token.to_string())
            .part("file", file_part(upload.file).await?);
        self.send(form).await?;
        log::info!("✓ Uploaded mapping file");
        Ok(())
    }
}

/// Streams a file as a multipart form part without loading it into memory.
async fn file_part(path: &Path) -> Result<reqwest::multipart::Part> {
    let file = tokio::fs::File::open(path).await?;
    let stream = FramedRead::new(file, BytesCodec::new());
    let mut part = reqwest::multipart::Part::stream(reqwest::Body::wrap_stream(stream));
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        part = part.file_name(name.to_string());
    }
    Ok(part)
}
