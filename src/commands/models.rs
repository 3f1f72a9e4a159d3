use crate::flamegraph::FlamegraphConfig;
use crate::utils::config::DEFAULT_TRACE_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

/// What to produce once a trace has been parsed
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Output path for the JSON trace report (None = no report file)
    pub output_json: Option<PathBuf>,

    /// Output path for the SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Number of hot calls listed in the summary
    pub top_paths: usize,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            output_json: Some(PathBuf::from("trace.json")),
            output_svg: None,
            flamegraph_config: None,
            top_paths: 10,
            print_summary: false,
        }
    }
}

/// Arguments for the debug command
#[derive(Debug, Clone)]
pub struct DebugArgs {
    /// Upstream RPC endpoint the fork is created from
    pub rpc_url: String,

    /// Transaction hash to replay
    pub transaction_hash: String,

    /// Block the fork is pinned to
    pub block_number: u64,

    /// Wall-clock budget for the whole acquisition
    pub timeout: Duration,

    /// Save the unmodified tracer output here
    pub raw_output: Option<PathBuf>,

    /// Fork program override (default: bundled or PATH `anvil`)
    pub fork_program: Option<PathBuf>,

    /// Tracer program override (default: bundled or PATH `cast`)
    pub tracer_program: Option<PathBuf>,

    /// Fetch transaction and receipt from the fork
    pub fetch_metadata: bool,

    pub output: OutputOptions,
}

impl Default for DebugArgs {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            transaction_hash: String::new(),
            block_number: 0,
            timeout: DEFAULT_TRACE_TIMEOUT,
            raw_output: None,
            fork_program: None,
            tracer_program: None,
            fetch_metadata: true,
            output: OutputOptions::default(),
        }
    }
}

/// Arguments for the offline parse command
#[derive(Debug, Clone, Default)]
pub struct ParseArgs {
    /// Captured tracer output
    pub input: PathBuf,

    pub output: OutputOptions,
}
