//! Command line interface for xcpack.
//!
//! Translates parsed arguments into immutable [`BuildSettings`], drives the
//! pipeline, and runs the optional publish steps. All failures bubble up as
//! [`Error`] values; the exit code is decided in `main`.

mod args;

pub use args::Args;

use crate::error::{Error, Result};
use crate::pipeline::{
    BuildArtifacts, CustomSettings, HttpPublisher, MappingUpload, Pipeline, Publisher,
    SettingsBuilder, bundle_info, find_mapping_file,
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate().map_err(|reason| Error::Usage { reason })?;

    let settings = SettingsBuilder::new()
        .source_dir(&args.source)
        .workspace(args.workspace)
        .scheme(args.scheme.clone())
        .target(args.target.clone())
        .configuration(args.configuration.clone())
        .output_name(args.name.clone())
        .custom_settings(CustomSettings::parse(&args.settings))
        .build()?;

    let output_dir = resolve_output_dir(args.output.as_deref(), settings.source_dir())?;

    let pipeline = Pipeline::new(settings, output_dir);
    let artifacts = pipeline.run().await?;

    if args.publish || args.mapping {
        publish_artifacts(&args, &pipeline, &artifacts).await?;
    }

    Ok(0)
}

/// Default output directory sits next to the sources, mirroring where
/// developers expect build products; an explicit -o wins.
fn resolve_output_dir(output: Option<&Path>, source_dir: &Path) -> Result<PathBuf> {
    let dir = match output {
        Some(path) => path.absolutize()?.into_owned(),
        None => source_dir.join("build_ipa"),
    };
    Ok(dir)
}

async fn publish_artifacts(
    args: &Args,
    pipeline: &Pipeline,
    artifacts: &BuildArtifacts,
) -> Result<()> {
    // validate() has already required the URL for either flag
    let Some(endpoint) = args.upload_url.as_deref() else {
        return Err(Error::Usage {
            reason: "--publish and --mapping require --upload-url".to_string(),
        });
    };
    let publisher = HttpPublisher::new(endpoint, args.token.clone());

    if args.publish {
        let archive = artifacts
            .first_archive()
            .ok_or(Error::MissingArtifact("archive"))?;
        publisher.publish_build(archive).await?;
    }

    if args.mapping {
        let (Some(proj), Some(token)) = (args.proj.as_deref(), args.token.as_deref()) else {
            return Err(Error::Usage {
                reason: "--mapping requires --proj and --token".to_string(),
            });
        };

        let bundle = artifacts
            .first_bundle()
            .ok_or(Error::MissingArtifact("application bundle"))?;
        let info = bundle_info(bundle)?;
        let mapping_file = find_mapping_file(pipeline.output_dir())?
            .ok_or(Error::MissingArtifact("dSYM mapping file"))?;

        publisher
            .upload_mapping(MappingUpload {
                file: &mapping_file,
                proj,
                build: &info.build,
                version: &info.version,
                token,
            })
            .await?;
    }

    Ok(())
}
