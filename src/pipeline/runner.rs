//! Executes the assembled build command.
//!
//! Both output pipes are drained concurrently and forwarded to the log sink
//! line by line, so long builds show progress instead of buffering until
//! exit.

use crate::error::{Error, Result};
use crate::pipeline::command::BuildCommand;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Runs the build command to completion. The caller resolves `program`
/// (normally via [`crate::pipeline::tools`]) so the lookup stays separate
/// from execution.
///
/// # Errors
///
/// - [`Error::Spawn`] when the child cannot be started
/// - [`Error::BuildFailed`] when the child exits non-zero
pub async fn run_build(program: &Path, command: &BuildCommand) -> Result<()> {
    log::info!("Running: {command}");

    let mut child = Command::new(program)
        .args(command.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Spawn {
            program: command.program().to_string(),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (out, err, status) = tokio::join!(
        stream_lines(stdout),
        stream_lines(stderr),
        child.wait()
    );
    out?;
    err?;
    let status = status?;

    if !status.success() {
        return Err(Error::BuildFailed { status });
    }
    Ok(())
}

/// Forwards each line of a child pipe to the log sink as it arrives.
async fn stream_lines<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<()> {
    let Some(pipe) = pipe else { return Ok(()) };
    let mut lines = BufReader::new(pipe).lines();
    while let Some(line) = lines.next_line().await? {
        log::info!("{line}");
    }
    Ok(())
}
