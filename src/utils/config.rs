//! Configuration and constants for the CLI and the acquisition pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock budget for one trace acquisition
pub const DEFAULT_TRACE_TIMEOUT: Duration = Duration::from_secs(120);

/// Default timeout for side-channel RPC requests against the fork
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Program that provides the forked node
pub const DEFAULT_FORK_PROGRAM: &str = "anvil";

/// Program that replays the transaction and prints the call tree
pub const DEFAULT_TRACER_PROGRAM: &str = "cast";

/// Extra arguments always handed to the fork program
pub const DEFAULT_FORK_ARGS: &[&str] = &["--steps-tracing", "--code-size-limit", "41943040"];

/// Directory searched for bundled tool binaries
pub const BINARIES_DIR: &str = "binaries";

/// Maximum characters of tool output kept in error diagnostics
pub const DIAGNOSTIC_EXCERPT_LIMIT: usize = 2000;

/// Line printed by the fork program once its RPC server accepts requests
pub const FORK_READY_MARKER: &str = "Listening on";

/// Settings for one `Orchestrator`
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Hard wall-clock budget covering fork startup, metadata fetch and tracing
    pub timeout: Duration,

    /// Path or name of the fork program
    pub fork_program: PathBuf,

    /// Path or name of the tracer program
    pub tracer_program: PathBuf,

    /// Extra fork arguments appended after the fork url/block/port
    pub fork_args: Vec<String>,

    /// Extra tracer arguments appended after the rpc url
    pub tracer_args: Vec<String>,

    /// Fetch transaction + receipt from the fork as a side channel
    pub fetch_metadata: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TRACE_TIMEOUT,
            fork_program: resolve_program(DEFAULT_FORK_PROGRAM),
            tracer_program: resolve_program(DEFAULT_TRACER_PROGRAM),
            fork_args: DEFAULT_FORK_ARGS.iter().map(|s| s.to_string()).collect(),
            tracer_args: Vec::new(),
            fetch_metadata: true,
        }
    }
}

impl AcquisitionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fork_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.fork_program = program.into();
        self
    }

    pub fn with_tracer_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.tracer_program = program.into();
        self
    }

    pub fn with_fork_args(mut self, args: Vec<String>) -> Self {
        self.fork_args = args;
        self
    }

    pub fn with_tracer_args(mut self, args: Vec<String>) -> Self {
        self.tracer_args = args;
        self
    }

    pub fn with_metadata(mut self, fetch: bool) -> Self {
        self.fetch_metadata = fetch;
        self
    }
}

/// Locate a tool binary
///
/// Prefers `./binaries/<name>`, then `binaries/<name>` next to the running
/// executable, and falls back to the bare name for a PATH lookup.
pub fn resolve_program(name: &str) -> PathBuf {
    let file_name = if cfg!(target_os = "windows") {
        format!("{}.exe", name)
    } else {
        name.to_string()
    };

    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(BINARIES_DIR));
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(BINARIES_DIR));
    }

    candidates
        .into_iter()
        .map(|dir| dir.join(&file_name))
        .find(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(file_name))
}
