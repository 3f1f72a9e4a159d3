//! Orchestrator tests against stand-in fork and tracer scripts.

#![cfg(unix)]

use pretty_assertions::assert_eq;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tx_trace_studio::acquisition::{Orchestrator, TraceRequest};
use tx_trace_studio::commands::{execute_debug, DebugArgs, OutputOptions};
use tx_trace_studio::output::read_report;
use tx_trace_studio::parser::{parse_with_side_channel, Status};
use tx_trace_studio::utils::config::AcquisitionConfig;
use tx_trace_studio::utils::AcquisitionError;

const SWAP_REVERT: &str = include_str!("fixtures/swap_revert.txt");
const TX_HASH: &str = "0x5e1fd2a3b7c4e0f9a8d6c5b4a3928170e6f5d4c3b2a1908f7e6d5c4b3a291807";

/// Tests in this file spawn freshly written scripts one at a time
static SERIAL: Mutex<()> = Mutex::new(());

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Fork stand-in that records its pid, reports readiness and stays up
fn ready_fork(dir: &Path) -> PathBuf {
    let pid_file = dir.join("fork.pid");
    write_script(
        dir,
        "fork.sh",
        &format!(
            "echo $$ > '{}'\necho 'Listening on 127.0.0.1:1'\nexec sleep 30",
            pid_file.display()
        ),
    )
}

fn request() -> TraceRequest {
    TraceRequest::new(TX_HASH, "http://upstream.invalid", 19_000_000).unwrap()
}

fn config(fork: &Path, tracer: &Path, timeout: Duration) -> AcquisitionConfig {
    AcquisitionConfig::new()
        .with_fork_program(fork)
        .with_tracer_program(tracer)
        .with_fork_args(Vec::new())
        .with_timeout(timeout)
        .with_metadata(false)
}

fn read_pid(path: &Path) -> u32 {
    std::fs::read_to_string(path)
        .unwrap()
        .trim()
        .parse()
        .unwrap()
}

fn assert_process_gone(pid_file: &Path) {
    let pid = read_pid(pid_file);
    assert!(
        !Path::new(&format!("/proc/{}", pid)).exists(),
        "process {} is still alive",
        pid
    );
}

/// Wait for a process that is not our child to die
///
/// Orphaned grandchildren are reaped by init, so a killed one may still
/// show up briefly as a zombie.
fn assert_process_dies(pid_file: &Path) {
    let pid = read_pid(pid_file);
    let stat = format!("/proc/{}/stat", pid);
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let state = std::fs::read_to_string(&stat)
            .ok()
            .and_then(|s| s.rsplit(')').next().and_then(|rest| rest.trim().chars().next()));
        match state {
            None | Some('Z') | Some('X') => return,
            Some(_) if Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(50));
            }
            Some(state) => panic!("process {} is still alive (state {})", pid, state),
        }
    }
}

#[tokio::test]
async fn test_successful_acquisition() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let trace_file = dir.path().join("trace.txt");
    std::fs::write(&trace_file, SWAP_REVERT).unwrap();
    let args_file = dir.path().join("args.txt");

    let fork = ready_fork(dir.path());
    let tracer = write_script(
        dir.path(),
        "tracer.sh",
        &format!(
            "printf '%s\\n' \"$@\" > '{}'\ncat '{}'\necho 'warning: replaying' >&2",
            args_file.display(),
            trace_file.display()
        ),
    );

    let orchestrator = Orchestrator::new(config(&fork, &tracer, Duration::from_secs(20)));
    let raw = orchestrator.run(&request()).await.unwrap();

    assert_eq!(raw.text, SWAP_REVERT);
    assert!(raw.stderr.contains("warning: replaying"));
    assert_eq!(raw.side_channel.tx_hash.as_deref(), Some(TX_HASH));
    assert_eq!(raw.side_channel.block_number, Some(19_000_000));

    let args = std::fs::read_to_string(&args_file).unwrap();
    assert_eq!(
        args.lines().collect::<Vec<_>>(),
        vec!["run", TX_HASH, "--rpc-url", "http://127.0.0.1:1"]
    );

    assert_process_gone(&dir.path().join("fork.pid"));

    let result = parse_with_side_channel(&raw.text, Some(&raw.side_channel)).unwrap();
    assert_eq!(result.overview.status, Status::Failed);
    assert_eq!(result.overview.transaction_hash, TX_HASH);
    assert_eq!(result.overview.block, Some(19_000_000));
}

#[tokio::test]
async fn test_tracer_failure_carries_exit_code_and_stderr() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let fork = ready_fork(dir.path());
    let tracer = write_script(
        dir.path(),
        "tracer.sh",
        "echo 'partial output'\necho 'Error: transaction not found' >&2\nexit 3",
    );

    let orchestrator = Orchestrator::new(config(&fork, &tracer, Duration::from_secs(20)));
    let err = orchestrator.run(&request()).await.unwrap_err();

    match err {
        AcquisitionError::TracerExited { code, excerpt } => {
            assert_eq!(code, Some(3));
            assert!(excerpt.contains("transaction not found"));
            assert!(!excerpt.contains("partial output"));
        }
        other => panic!("expected TracerExited, got {:?}", other),
    }
    assert_process_gone(&dir.path().join("fork.pid"));
}

#[tokio::test]
async fn test_tracer_failure_without_stderr_uses_stdout() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let fork = ready_fork(dir.path());
    let tracer = write_script(dir.path(), "tracer.sh", "echo 'execution reverted'\nexit 1");

    let orchestrator = Orchestrator::new(config(&fork, &tracer, Duration::from_secs(20)));
    let err = orchestrator.run(&request()).await.unwrap_err();

    assert!(
        matches!(&err, AcquisitionError::TracerExited { code: Some(1), excerpt } if excerpt == "execution reverted"),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_fork_failure_reports_stderr() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let fork = write_script(
        dir.path(),
        "fork.sh",
        "echo 'Error: failed to get fork block number' >&2\nexit 1",
    );
    let tracer = write_script(dir.path(), "tracer.sh", "exit 0");

    let orchestrator = Orchestrator::new(config(&fork, &tracer, Duration::from_secs(20)));
    let err = orchestrator.run(&request()).await.unwrap_err();

    match err {
        AcquisitionError::ForkSetupFailed(detail) => {
            assert!(detail.contains("failed to get fork block number"));
        }
        other => panic!("expected ForkSetupFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_program_is_spawn_failure() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-anvil");
    let tracer = write_script(dir.path(), "tracer.sh", "exit 0");

    let orchestrator = Orchestrator::new(config(&missing, &tracer, Duration::from_secs(5)));
    let err = orchestrator.run(&request()).await.unwrap_err();

    match err {
        AcquisitionError::ProcessSpawnFailed { program, .. } => {
            assert!(program.ends_with("no-such-anvil"));
        }
        other => panic!("expected ProcessSpawnFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_tracer_is_spawn_failure_and_fork_stops() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let fork = ready_fork(dir.path());
    let missing = dir.path().join("no-such-cast");

    let orchestrator = Orchestrator::new(config(&fork, &missing, Duration::from_secs(20)));
    let err = orchestrator.run(&request()).await.unwrap_err();

    assert!(matches!(err, AcquisitionError::ProcessSpawnFailed { .. }));
    assert_process_gone(&dir.path().join("fork.pid"));
}

#[tokio::test]
async fn test_hung_tracer_times_out_and_both_processes_stop() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let fork = ready_fork(dir.path());
    let tracer_pid = dir.path().join("tracer.pid");
    let tracer = write_script(
        dir.path(),
        "tracer.sh",
        &format!("echo $$ > '{}'\nexec sleep 30", tracer_pid.display()),
    );

    let timeout = Duration::from_secs(2);
    let orchestrator = Orchestrator::new(config(&fork, &tracer, timeout));
    let started = Instant::now();
    let err = orchestrator.run(&request()).await.unwrap_err();

    assert!(matches!(err, AcquisitionError::Timeout(t) if t == timeout));
    assert!(started.elapsed() < Duration::from_secs(15));
    assert_process_gone(&tracer_pid);
    assert_process_gone(&dir.path().join("fork.pid"));
}

#[tokio::test]
async fn test_timeout_stops_background_helpers() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let fork_helper = dir.path().join("fork_helper.pid");
    let fork = write_script(
        dir.path(),
        "fork.sh",
        &format!(
            "sleep 30 &\necho $! > '{}'\necho 'Listening on 127.0.0.1:1'\nwait",
            fork_helper.display()
        ),
    );
    let tracer_helper = dir.path().join("tracer_helper.pid");
    let tracer = write_script(
        dir.path(),
        "tracer.sh",
        &format!("sleep 30 &\necho $! > '{}'\nwait", tracer_helper.display()),
    );

    let orchestrator = Orchestrator::new(config(&fork, &tracer, Duration::from_secs(2)));
    let err = orchestrator.run(&request()).await.unwrap_err();

    assert!(matches!(err, AcquisitionError::Timeout(_)));
    assert_process_dies(&tracer_helper);
    assert_process_dies(&fork_helper);
}

#[tokio::test]
async fn test_fork_that_never_becomes_ready_times_out() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("fork.pid");
    let fork = write_script(
        dir.path(),
        "fork.sh",
        &format!("echo $$ > '{}'\nexec sleep 30", pid_file.display()),
    );
    let tracer = write_script(dir.path(), "tracer.sh", "exit 0");

    let orchestrator = Orchestrator::new(config(&fork, &tracer, Duration::from_secs(1)));
    let err = orchestrator.run(&request()).await.unwrap_err();

    assert!(matches!(err, AcquisitionError::Timeout(_)));
    assert_process_gone(&pid_file);
}

#[tokio::test]
async fn test_cancellation_tears_down() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let fork = ready_fork(dir.path());
    let tracer_pid = dir.path().join("tracer.pid");
    let tracer = write_script(
        dir.path(),
        "tracer.sh",
        &format!("echo $$ > '{}'\nexec sleep 30", tracer_pid.display()),
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.cancel();
    });

    let orchestrator = Orchestrator::new(config(&fork, &tracer, Duration::from_secs(60)));
    let started = Instant::now();
    let err = orchestrator
        .run_with_cancel(&request(), cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, AcquisitionError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(15));
    assert_process_gone(&tracer_pid);
    assert_process_gone(&dir.path().join("fork.pid"));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let fork = ready_fork(dir.path());
    let tracer = write_script(dir.path(), "tracer.sh", "exit 0");

    let cancel = CancellationToken::new();
    cancel.cancel();

    let orchestrator = Orchestrator::new(config(&fork, &tracer, Duration::from_secs(20)));
    let err = orchestrator
        .run_with_cancel(&request(), cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, AcquisitionError::Cancelled));
}

#[tokio::test]
async fn test_debug_command_end_to_end() {
    let _serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let trace_file = dir.path().join("trace.txt");
    std::fs::write(&trace_file, SWAP_REVERT).unwrap();

    let fork = ready_fork(dir.path());
    let tracer = write_script(
        dir.path(),
        "tracer.sh",
        &format!("cat '{}'", trace_file.display()),
    );
    let report_path = dir.path().join("out").join("report.json");
    let raw_path = dir.path().join("raw.txt");

    let args = DebugArgs {
        rpc_url: "http://upstream.invalid".to_string(),
        // Bare hashes are accepted and normalized
        transaction_hash: TX_HASH.trim_start_matches("0x").to_string(),
        block_number: 19_000_000,
        timeout: Duration::from_secs(20),
        raw_output: Some(raw_path.clone()),
        fork_program: Some(fork),
        tracer_program: Some(tracer),
        fetch_metadata: false,
        output: OutputOptions {
            output_json: Some(report_path.clone()),
            ..Default::default()
        },
    };

    execute_debug(args, CancellationToken::new()).await.unwrap();

    assert_eq!(std::fs::read_to_string(&raw_path).unwrap(), SWAP_REVERT);
    let report = read_report(&report_path).unwrap();
    assert_eq!(report.result.overview.transaction_hash, TX_HASH);
    assert_eq!(report.result.calls().len(), 5);
    assert_eq!(report.result.raw(), SWAP_REVERT);
}
