//! xcpack - IPA packaging frontend for xcodebuild.
//!
//! This binary builds an Xcode project or workspace, collects the produced
//! .app bundles and repackages each one as an installable .ipa archive,
//! optionally uploading the results to a distribution endpoint.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match xcpack::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
