//! Runner that launches descriptors directly on the host.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::{PhaseOutput, ProcessRunner};
use crate::command::ProcessDescriptor;

/// Spawns each descriptor as a child of the current process.
///
/// No isolation is applied; the working directory must already contain
/// the submission.
#[derive(Debug, Default, Clone)]
pub struct LocalRunner {}

impl LocalRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl ProcessRunner for LocalRunner {
    #[instrument(skip(self, descriptor), fields(exec = %descriptor.executable, dir = %descriptor.working_directory.display()))]
    async fn launch(
        &self,
        descriptor: &ProcessDescriptor,
        timeout: Duration,
    ) -> Result<PhaseOutput> {
        anyhow::ensure!(!descriptor.is_noop(), "Cannot launch an empty descriptor");
        debug!(args = ?descriptor.arguments, "Launching process");

        let mut child = Command::new(&descriptor.executable)
            .args(&descriptor.arguments)
            .current_dir(&descriptor.working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn: {}", descriptor.executable))?;

        // Take pipe handles out so `child` stays in scope for kill-on-timeout
        let mut child_stdout = child.stdout.take().context("Failed to open stdout")?;
        let mut child_stderr = child.stderr.take().context("Failed to open stderr")?;

        // Buffers live outside the deadline so a timed-out phase keeps its
        // partial output. The deadline covers both pipes and the exit.
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();
        let finish = async {
            let (r1, r2) = tokio::join!(
                drain(&mut child_stdout, &mut stdout_buf),
                drain(&mut child_stderr, &mut stderr_buf),
            );
            r1.context("Failed to read stdout")?;
            r2.context("Failed to read stderr")?;
            child.wait().await.context("Failed to wait for process")
        };

        let finished = tokio::time::timeout(timeout, finish).await;
        let Ok(status) = finished else {
            warn!(timeout_ms = timeout.as_millis(), "Process timed out, killing");
            // Kill waits for the child, so it is reaped here.
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill timed-out process");
            }
            return Ok(PhaseOutput {
                exit_code: -1,
                stdout: String::from_utf8_lossy(&stdout_buf).into_owned(),
                stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
                timed_out: true,
            });
        };
        let status = status?;

        let output = PhaseOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&stdout_buf).into_owned(),
            stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
            timed_out: false,
        };

        debug!(exit_code = output.exit_code, "Process exited");

        Ok(output)
    }
}

/// Read a pipe to EOF, appending each chunk as it arrives.
///
/// Chunks already appended stay in `buf` if the future is dropped.
async fn drain<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<()> {
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}
