//! Tracer child process.
//!
//! Runs `<tracer> run <txHash> --rpc-url <fork endpoint>` and collects its
//! stdout and stderr on separate tasks while waiting for it to exit.

use super::fork::read_all;
use super::process::{kill_group, own_group};
use super::request::TraceRequest;
use crate::utils::error::AcquisitionError;
use crate::utils::format::excerpt;
use log::{debug, info, warn};
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// Output of a tracer run that exited successfully
#[derive(Debug, Clone, Default)]
pub struct TracerOutput {
    pub stdout: String,
    pub stderr: String,
}

pub struct TracerProcess {
    child: Child,
    stdout: Option<JoinHandle<String>>,
    stderr: Option<JoinHandle<String>>,
}

impl TracerProcess {
    pub fn spawn(
        program: &Path,
        extra_args: &[String],
        request: &TraceRequest,
        endpoint: &str,
    ) -> Result<Self, AcquisitionError> {
        let args = tracer_args(request, endpoint, extra_args);
        info!("Running tracer: {} {}", program.display(), args.join(" "));

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

        let stdout = child.stdout.take().map(|out| tokio::spawn(read_all(out)));
        let stderr = child.stderr.take().map(|err| tokio::spawn(read_all(err)));

        Ok(Self {
            child,
            stdout,
            stderr,
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for exit and collect output
    ///
    /// A non-zero exit becomes `TracerExited` with the tail of stderr (or
    /// of stdout when stderr is empty).
    pub async fn wait(&mut self) -> Result<TracerOutput, AcquisitionError> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| AcquisitionError::TracerExited {
                code: None,
                excerpt: format!("failed to wait for tracer: {}", e),
            })?;

        let stdout = join_output(self.stdout.take()).await;
        let stderr = join_output(self.stderr.take()).await;
        info!("Tracer exited ({}), {} bytes of output", status, stdout.len());

        if !status.success() {
            let diagnostic = if stderr.trim().is_empty() { &stdout } else { &stderr };
            return Err(AcquisitionError::TracerExited {
                code: status.code(),
                excerpt: excerpt(diagnostic),
            });
        }

        Ok(TracerOutput { stdout, stderr })
    }

    /// Kill the tracer's process group and reap the tracer
    pub async fn kill(&mut self) {
        kill_group(self.child.id());
        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill tracer: {}", e);
        } else {
            debug!("Tracer killed");
        }
        for task in [self.stdout.take(), self.stderr.take()].into_iter().flatten() {
            task.abort();
        }
    }
}

async fn join_output(task: Option<JoinHandle<String>>) -> String {
    match task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    }
}

/// `run <txHash> --rpc-url <endpoint> [extra..]`
///
/// No block flag: the endpoint is the fork, pinned to the request's block
/// by `--fork-block-number`.
pub fn tracer_args(request: &TraceRequest, endpoint: &str, extra_args: &[String]) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        request.tx_hash().to_string(),
        "--rpc-url".to_string(),
        endpoint.to_string(),
    ];
    args.extend(extra_args.iter().cloned());
    args
}
