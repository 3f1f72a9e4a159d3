//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod debug;
pub mod models;
pub mod outputs;
pub mod parse;
pub mod utils;

// Re-export main command functions
pub use debug::{execute_debug, validate_args};
pub use models::{DebugArgs, OutputOptions, ParseArgs};
pub use outputs::emit_outputs;
pub use parse::execute_parse;
pub use utils::{display_schema, display_version, validate_report_file};
