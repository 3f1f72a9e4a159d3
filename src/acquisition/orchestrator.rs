//! Fork + tracer orchestration under one deadline.
//!
//! Stages run in order: fork startup, metadata fetch, tracer run. Each
//! stage is raced against the shared deadline and the cancellation token.
//! Timeout and cancellation share one teardown path: the tracer is killed
//! and reaped, then the fork is shut down. The fork is shut down on every
//! other exit path as well.

use super::fork::ForkHandle;
use super::request::TraceRequest;
use super::tracer::TracerProcess;
use crate::parser::schema::SideChannel;
use crate::rpc::RpcClient;
use crate::utils::config::AcquisitionConfig;
use crate::utils::error::AcquisitionError;
use log::{info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Unparsed tracer output plus what was gathered next to it
#[derive(Debug, Clone, Default)]
pub struct RawTrace {
    /// Tracer stdout, verbatim
    pub text: String,

    /// Tracer stderr, kept for diagnostics
    pub stderr: String,

    /// Request identity, plus transaction/receipt data when it could be fetched
    pub side_channel: SideChannel,
}

#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    config: AcquisitionConfig,
}

impl Orchestrator {
    pub fn new(config: AcquisitionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Acquire the raw trace for one request
    pub async fn run(&self, request: &TraceRequest) -> Result<RawTrace, AcquisitionError> {
        self.run_with_cancel(request, CancellationToken::new()).await
    }

    /// Acquire the raw trace, aborting when `cancel` fires
    pub async fn run_with_cancel(
        &self,
        request: &TraceRequest,
        cancel: CancellationToken,
    ) -> Result<RawTrace, AcquisitionError> {
        let deadline = Instant::now() + self.config.timeout;
        info!(
            "Acquiring trace for {} (timeout {:?})",
            request, self.config.timeout
        );

        let mut fork = ForkHandle::spawn(&self.config.fork_program, &self.config.fork_args, request)?;
        let result = self.acquire(request, &mut fork, &cancel, deadline).await;
        fork.shutdown().await;

        match &result {
            Ok(raw) => info!("Acquired {} bytes of trace output", raw.text.len()),
            Err(e) => warn!("Trace acquisition failed: {}", e),
        }
        result
    }

    async fn acquire(
        &self,
        request: &TraceRequest,
        fork: &mut ForkHandle,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> Result<RawTrace, AcquisitionError> {
        let timeout = self.config.timeout;

        let endpoint = bounded(fork.wait_ready(), cancel, deadline, timeout).await?;
        info!("Fork ready at {}", endpoint);

        let fetched = if self.config.fetch_metadata {
            bounded(
                async { Ok::<_, AcquisitionError>(fetch_metadata(&endpoint, request).await) },
                cancel,
                deadline,
                timeout,
            )
            .await?
        } else {
            None
        };

        let mut tracer = TracerProcess::spawn(
            &self.config.tracer_program,
            &self.config.tracer_args,
            request,
            &endpoint,
        )?;
        let output = match bounded(tracer.wait(), cancel, deadline, timeout).await {
            Ok(output) => output,
            Err(e @ (AcquisitionError::Timeout(_) | AcquisitionError::Cancelled)) => {
                tracer.kill().await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let mut side_channel = fetched.unwrap_or_default();
        side_channel.tx_hash = Some(request.tx_hash().to_string());
        side_channel.block_number = side_channel.block_number.or(Some(request.block_number()));

        Ok(RawTrace {
            text: output.stdout,
            stderr: output.stderr,
            side_channel,
        })
    }
}

/// Race one stage against cancellation and the deadline
async fn bounded<T>(
    stage: impl Future<Output = Result<T, AcquisitionError>>,
    cancel: &CancellationToken,
    deadline: Instant,
    timeout: Duration,
) -> Result<T, AcquisitionError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AcquisitionError::Cancelled),
        _ = sleep_until(deadline) => Err(AcquisitionError::Timeout(timeout)),
        result = stage => result,
    }
}

/// Best-effort transaction + receipt lookup on the fork
async fn fetch_metadata(endpoint: &str, request: &TraceRequest) -> Option<SideChannel> {
    let client = match RpcClient::new(endpoint) {
        Ok(client) => client,
        Err(e) => {
            warn!("Skipping transaction metadata: {}", e);
            return None;
        }
    };

    match client.fetch_side_channel(request.tx_hash()).await {
        Ok(side_channel) => Some(side_channel),
        Err(e) => {
            warn!("Transaction metadata unavailable: {}", e);
            None
        }
    }
}
