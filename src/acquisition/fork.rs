//! Scoped fork process.
//!
//! The fork program is started with piped output and reports readiness by
//! printing `Listening on <addr>` on stdout. The handle owns the child for
//! the whole acquisition: `shutdown` kills and reaps it, and dropping the
//! handle without a shutdown still issues a kill. Kills go to the whole
//! process group, so helpers the fork program started die with it.

use super::process::{kill_group, own_group};
use super::request::TraceRequest;
use crate::utils::config::FORK_READY_MARKER;
use crate::utils::error::AcquisitionError;
use crate::utils::format::excerpt;
use log::{debug, info, warn};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

pub struct ForkHandle {
    child: Child,
    stdout: Option<Lines<BufReader<ChildStdout>>>,
    stderr: Option<JoinHandle<String>>,
    drain: Option<JoinHandle<()>>,
    endpoint: Option<String>,
}

impl ForkHandle {
    /// Start the fork program against the request's endpoint and block
    pub fn spawn(
        program: &Path,
        extra_args: &[String],
        request: &TraceRequest,
    ) -> Result<Self, AcquisitionError> {
        let args = fork_args(request, extra_args);
        info!("Starting fork: {} {}", program.display(), args.join(" "));

        let mut command = Command::new(program);
        command
            .args(&args)
            .env("FOUNDRY_DISABLE_NIGHTLY_WARNING", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let mut child = own_group(&mut command)
            .spawn()
            .map_err(|source| AcquisitionError::ProcessSpawnFailed {
                program: program.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take().map(|out| BufReader::new(out).lines());
        let stderr = child.stderr.take().map(|err| tokio::spawn(read_all(err)));

        Ok(Self {
            child,
            stdout,
            stderr,
            drain: None,
            endpoint: None,
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// RPC endpoint of the fork, once ready
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Wait for the readiness line and return the fork endpoint
    ///
    /// If the fork closes its output or exits first, the failure carries
    /// the tail of its stderr.
    pub async fn wait_ready(&mut self) -> Result<String, AcquisitionError> {
        if let Some(endpoint) = &self.endpoint {
            return Ok(endpoint.clone());
        }
        let Some(mut lines) = self.stdout.take() else {
            return Err(AcquisitionError::ForkSetupFailed(
                "fork output is not available".to_string(),
            ));
        };

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(addr) = line.trim().strip_prefix(FORK_READY_MARKER) {
                        let endpoint = format!("http://{}", addr.trim());
                        self.endpoint = Some(endpoint.clone());
                        self.drain = Some(tokio::spawn(drain_lines(lines)));
                        return Ok(endpoint);
                    }
                    debug!("fork: {}", line);
                }
                Ok(None) => break,
                Err(e) => {
                    return Err(AcquisitionError::ForkSetupFailed(format!(
                        "failed to read fork output: {}",
                        e
                    )))
                }
            }
        }

        Err(self.setup_failure().await)
    }

    async fn setup_failure(&mut self) -> AcquisitionError {
        self.kill_tree();
        let status = self.child.wait().await.ok();
        let stderr = match self.stderr.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        let detail = if stderr.trim().is_empty() {
            match status {
                Some(status) => format!("fork exited before becoming ready ({})", status),
                None => "fork exited before becoming ready".to_string(),
            }
        } else {
            excerpt(&stderr)
        };
        AcquisitionError::ForkSetupFailed(detail)
    }

    /// Kill and reap the fork process
    pub async fn shutdown(&mut self) {
        self.kill_tree();
        match self.child.wait().await {
            Ok(status) => info!("Fork stopped ({})", status),
            Err(e) => warn!("Failed to reap fork process: {}", e),
        }
        self.abort_readers();
    }

    /// Kill the fork's process group, then the fork itself
    fn kill_tree(&mut self) {
        kill_group(self.child.id());
        if let Err(e) = self.child.start_kill() {
            debug!("Fork already stopped: {}", e);
        }
    }

    fn abort_readers(&mut self) {
        if let Some(task) = self.drain.take() {
            task.abort();
        }
        if let Some(task) = self.stderr.take() {
            task.abort();
        }
    }
}

impl Drop for ForkHandle {
    fn drop(&mut self) {
        self.kill_tree();
        self.abort_readers();
    }
}

/// `--fork-url <rpc> --fork-block-number <n> -p 0 [extra..]`
pub fn fork_args(request: &TraceRequest, extra_args: &[String]) -> Vec<String> {
    let mut args = vec![
        "--fork-url".to_string(),
        request.rpc_url().to_string(),
        "--fork-block-number".to_string(),
        request.block_number().to_string(),
        "-p".to_string(),
        "0".to_string(),
    ];
    args.extend(extra_args.iter().cloned());
    args
}

/// Read a pipe to the end, lossily decoded
pub(crate) async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        debug!("Stopped reading process output: {}", e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn drain_lines(mut lines: Lines<BufReader<ChildStdout>>) {
    while let Ok(Some(line)) = lines.next_line().await {
        debug!("fork: {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_args() {
        let request = TraceRequest::new(
            "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef",
            "https://rpc.example",
            42,
        )
        .unwrap();
        let args = fork_args(&request, &["--steps-tracing".to_string()]);
        assert_eq!(
            args,
            vec![
                "--fork-url",
                "https://rpc.example",
                "--fork-block-number",
                "42",
                "-p",
                "0",
                "--steps-tracing"
            ]
        );
    }
}
