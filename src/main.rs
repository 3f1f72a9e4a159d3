//! Transaction Trace Studio CLI
//!
//! Replays a transaction on a forked chain, parses the tracer output and
//! writes a structured report, an optional flamegraph and a text summary.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::warn;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use tx_trace_studio::commands::{
    display_schema, display_version, execute_debug, execute_parse, validate_args,
    validate_report_file, DebugArgs, OutputOptions, ParseArgs,
};
use tx_trace_studio::flamegraph::FlamegraphConfig;

/// Transaction Trace Studio - replay and inspect a single transaction
#[derive(Parser, Debug)]
#[command(name = "tx-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a transaction on a fork and parse its trace
    Debug {
        /// Transaction hash to replay
        #[arg(short, long)]
        tx: String,

        /// Upstream RPC endpoint to fork from
        #[arg(short, long, env = "TX_TRACE_RPC_URL")]
        rpc: String,

        /// Block number to fork at
        #[arg(short, long)]
        block: u64,

        /// Acquisition timeout in seconds
        #[arg(long, default_value = "120")]
        timeout: u64,

        /// Output path for the JSON trace report
        #[arg(short, long, default_value = "trace.json")]
        output: PathBuf,

        /// Save the raw tracer output
        #[arg(long)]
        raw_out: Option<PathBuf>,

        /// Output path for SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Number of hot calls listed in the summary
        #[arg(long, default_value = "10")]
        top_paths: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Fork program (anvil) to use
        #[arg(long, env = "TX_TRACE_ANVIL")]
        anvil: Option<PathBuf>,

        /// Tracer program (cast) to use
        #[arg(long, env = "TX_TRACE_CAST")]
        cast: Option<PathBuf>,

        /// Skip fetching transaction and receipt from the fork
        #[arg(long)]
        no_metadata: bool,
    },

    /// Parse previously captured tracer output
    Parse {
        /// Path to the saved tracer text
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the JSON trace report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a trace report JSON file
    Validate {
        /// Path to trace report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Debug {
            tx,
            rpc,
            block,
            timeout,
            output,
            raw_out,
            flamegraph,
            title,
            width,
            top_paths,
            summary,
            anvil,
            cast,
            no_metadata,
        } => {
            let fg_config = flamegraph.as_ref().map(|_| {
                let mut config = FlamegraphConfig::new().with_width(width);
                if let Some(title) = title {
                    config = config.with_title(title);
                }
                config
            });

            let args = DebugArgs {
                rpc_url: rpc,
                transaction_hash: tx,
                block_number: block,
                timeout: Duration::from_secs(timeout),
                raw_output: raw_out,
                fork_program: anvil,
                tracer_program: cast,
                fetch_metadata: !no_metadata,
                output: OutputOptions {
                    output_json: Some(output),
                    output_svg: flamegraph,
                    flamegraph_config: fg_config,
                    top_paths,
                    print_summary: summary,
                },
            };

            validate_args(&args)?;

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, tearing down fork and tracer...");
                    on_interrupt.cancel();
                }
            });

            execute_debug(args, cancel).await?;
        }

        Commands::Parse {
            input,
            output,
            flamegraph,
            summary,
        } => {
            let args = ParseArgs {
                input,
                output: OutputOptions {
                    output_json: output,
                    output_svg: flamegraph,
                    print_summary: summary,
                    ..Default::default()
                },
            };
            execute_parse(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
