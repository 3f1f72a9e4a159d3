//! Output writers for trace reports and flamegraphs.
//!
//! This module handles writing data to disk in various formats:
//! - JSON trace reports
//! - SVG flamegraphs
//! - Raw tracer text and plain-text summaries

pub mod json;
pub mod svg;
pub mod text;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report};
pub use svg::write_svg;
pub use text::{render_summary, write_raw_trace};

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

/// Reject unusable output paths and create missing parent directories
pub(crate) fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
