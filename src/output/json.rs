//! JSON trace report writer and reader.
//!
//! Writes `TraceReport` structs as pretty-printed JSON. Reading a report
//! back rebuilds the per-call `body` lines, which are not stored.

use super::prepare_output_path;
use crate::parser::schema::TraceReport;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write a trace report to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
pub fn write_report(report: &TraceReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing trace report to: {}", output_path.display());
    prepare_output_path(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;

    info!(
        "Trace report written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Serialize a report to a pretty JSON string
pub fn report_to_string(report: &TraceReport) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a trace report from a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_report(input_path: impl AsRef<Path>) -> Result<TraceReport, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading trace report from: {}", input_path.display());

    let file = File::open(input_path)?;
    let mut report: TraceReport = serde_json::from_reader(BufReader::new(file))?;
    report.result.restore_bodies();

    debug!(
        "Trace report loaded: version {}, tx {}",
        report.version, report.result.overview.transaction_hash
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use tempfile::NamedTempFile;

    const TRACE: &str = "\
  [30000] Vault::deposit{value: 1000}()
    ├─ [5000] Token::transferFrom(0x01, 0x02, 7)
    │   └─ ← [Return] true
    └─ ← [Stop]";

    #[test]
    fn test_write_and_read_report() {
        let report = TraceReport::new(parse(TRACE).unwrap());
        let temp_file = NamedTempFile::new().unwrap();

        write_report(&report, temp_file.path()).unwrap();
        let loaded = read_report(temp_file.path()).unwrap();

        assert_eq!(loaded.version, report.version);
        assert_eq!(loaded.result, report.result);
        assert_eq!(loaded.result.calls()[1].body, vec!["    │   └─ ← [Return] true"]);
    }

    #[test]
    fn test_report_json_keys() {
        let report = TraceReport::new(parse(TRACE).unwrap());
        let json: serde_json::Value = serde_json::from_str(&report_to_string(&report).unwrap()).unwrap();

        assert!(json.get("generatedAt").is_some());
        assert!(json.get("transactionInfo").is_some());
        assert_eq!(json["callTrace"]["calls"][0]["signature"], "Vault::deposit");
        assert_eq!(json["callTrace"]["raw"], TRACE);
        assert!(json["gasDetails"]["gasUsed"].is_null());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/trace.json");

        let report = TraceReport::new(parse(TRACE).unwrap());
        write_report(&report, &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_write_to_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let report = TraceReport::new(parse(TRACE).unwrap());
        assert!(matches!(
            write_report(&report, temp_dir.path()),
            Err(OutputError::InvalidPath(_))
        ));
    }
}
