//! Process groups for the fork and tracer children.
//!
//! Each child leads its own group, so a kill reaches anything it spawned
//! (wrapper scripts, `sh -c` chains) and not just the direct child.

use log::debug;
use tokio::process::Command;

/// Make the spawned child the leader of a fresh process group
#[cfg(unix)]
pub(crate) fn own_group(command: &mut Command) -> &mut Command {
    command.process_group(0)
}

#[cfg(not(unix))]
pub(crate) fn own_group(command: &mut Command) -> &mut Command {
    command
}

/// SIGKILL every process in the group led by `pid`
///
/// Must be called before the leader is reaped, while `pid` still names it.
#[cfg(unix)]
pub(crate) fn kill_group(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
        debug!(
            "killpg({}) failed: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
pub(crate) fn kill_group(pid: Option<u32>) {
    debug!("No process group to kill for {:?}", pid);
}
