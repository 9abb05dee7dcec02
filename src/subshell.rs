use crate::command::{ExitCode, Subshell};
use crate::error::LaunchError;
use crate::io_adapters::{self, StdioRemap};
use nix::unistd::{self, ForkResult, Pid};

/// Fork a child that runs `sub.body` through the interpreter.
///
/// The child wires its standard streams like any other stage, applies the
/// subshell's own redirection, then calls `run` on the body and exits with the
/// status it returns. The parent's directory state is never touched: every
/// change happens in the child's copy.
pub fn spawn(
    sub: &Subshell,
    remap: StdioRemap,
    run: &mut dyn FnMut(&str) -> ExitCode,
) -> Result<Pid, LaunchError> {
    io_adapters::flush_standard_streams();
    // SAFETY: the shell is single-threaded, so the child starts from a
    // consistent copy of the interpreter.
    match unsafe { unistd::fork() }.map_err(LaunchError::Fork)? {
        ForkResult::Parent { child } => {
            log::debug!("forked {child} for subshell `{}`", sub.body);
            Ok(child)
        }
        ForkResult::Child => {
            if let Err(err) = remap.install() {
                io_adapters::fail_child(err);
            }
            if let Some(redirect) = &sub.redirect {
                if let Err(err) = redirect.install() {
                    io_adapters::fail_child(err);
                }
            }
            let status = run(&sub.body);
            io_adapters::terminate(status)
        }
    }
}
