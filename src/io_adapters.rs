//! Descriptor plumbing shared by everything that forks.

use crate::command::ExitCode;
use crate::error::ExecError;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd;
use std::io::Write;
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};

/// Standard input/output replacements for one child process.
///
/// Built in the parent right before a fork. The parent drops its copy as soon as
/// the fork returns, which closes the descriptors that now belong to the child.
/// The child calls [`StdioRemap::install`].
#[derive(Debug, Default)]
pub struct StdioRemap {
    /// Read end to install as standard input.
    pub stdin: Option<OwnedFd>,
    /// Write end to install as standard output.
    pub stdout: Option<OwnedFd>,
    /// Descriptors the parent keeps but the child must not hold.
    pub close: Vec<RawFd>,
}

impl StdioRemap {
    /// Install the replacements in the calling process and close the originals.
    ///
    /// Only meant to run in a forked child.
    pub fn install(self) -> Result<(), ExecError> {
        for fd in self.close {
            let _ = unistd::close(fd);
        }
        if let Some(fd) = self.stdin {
            unistd::dup2_stdin(&fd).map_err(ExecError::Dup)?;
            release(fd, libc::STDIN_FILENO);
        }
        if let Some(fd) = self.stdout {
            unistd::dup2_stdout(&fd).map_err(ExecError::Dup)?;
            release(fd, libc::STDOUT_FILENO);
        }
        Ok(())
    }
}

/// Close `fd` unless it already is the standard descriptor it was installed on.
fn release(fd: OwnedFd, installed_on: RawFd) {
    if fd.as_raw_fd() == installed_on {
        let _ = fd.into_raw_fd();
    }
}

/// Flush buffered output so it is not duplicated into a forked child.
pub fn flush_standard_streams() {
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();
}

/// Give a child the default `SIGPIPE` action back before it runs a program.
///
/// The Rust runtime ignores `SIGPIPE`, and ignored signals survive exec.
pub fn restore_sigpipe() {
    // SAFETY: installing the default action does not run any handler code.
    let _ = unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) };
}

/// Terminate a forked child without running the parent's exit handlers.
pub fn terminate(status: ExitCode) -> ! {
    flush_standard_streams();
    // SAFETY: `_exit` only ends the calling process.
    unsafe { libc::_exit(status) }
}

/// Report a child-side failure and terminate with status 1.
pub fn fail_child(err: ExecError) -> ! {
    eprintln!("s3: {err}");
    terminate(1)
}
