//! Chaining stages through pipes.
//!
//! Stage `i` writes into a pipe that stage `i + 1` reads from. The parent only ever
//! holds the read end waiting for the next stage plus, briefly, a fresh pair. Every
//! descriptor is closed in each process that does not use it; a write end left open
//! anywhere keeps the reader from ever seeing end-of-stream.

use crate::command::{ExitCode, Stage};
use crate::error::LaunchError;
use crate::external::ExternalCommand;
use crate::io_adapters::StdioRemap;
use crate::reaper::Reaper;
use crate::subshell;
use nix::fcntl::OFlag;
use nix::unistd;
use std::os::fd::{AsRawFd, OwnedFd};

/// Fork every stage of a pipeline and hand the children to `reaper`.
///
/// `run_subshell` interprets the body of a parenthesized stage inside its child.
/// If a pipe or fork fails, stages already started keep running and stay tracked
/// by `reaper`; every descriptor opened so far is closed.
pub fn spawn_pipeline(
    stages: &[Stage],
    reaper: &mut Reaper,
    run_subshell: &mut dyn FnMut(&str) -> ExitCode,
) -> Result<(), LaunchError> {
    let last = stages.len().saturating_sub(1);
    let mut pending_read: Option<OwnedFd> = None;

    for (i, stage) in stages.iter().enumerate() {
        let (next_read, write) = if i < last {
            let (read, write) = unistd::pipe2(OFlag::O_CLOEXEC).map_err(LaunchError::Pipe)?;
            (Some(read), Some(write))
        } else {
            (None, None)
        };

        let remap = StdioRemap {
            stdin: pending_read.take(),
            stdout: write,
            close: next_read.iter().map(|fd| fd.as_raw_fd()).collect(),
        };

        let pid = match stage {
            Stage::Command(command, redirect) => {
                ExternalCommand::new(command)?.spawn(redirect.as_ref(), remap)?
            }
            Stage::Subshell(sub) => subshell::spawn(sub, remap, run_subshell)?,
        };
        reaper.track(pid);
        pending_read = next_read;
    }

    Ok(())
}
