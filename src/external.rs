use crate::command::{Command, RedirectSpec};
use crate::error::{ExecError, LaunchError};
use crate::io_adapters::{self, StdioRemap};
use nix::unistd::{self, ForkResult, Pid};
use std::convert::Infallible;
use std::ffi::CString;

/// Command that is not a builtin: a program found through `PATH` and run in a
/// child process.
pub struct ExternalCommand {
    argv: Vec<CString>,
    program: String,
}

impl ExternalCommand {
    /// Prepare the argument vector. Argument 0 is the program name.
    pub fn new(command: &Command) -> Result<Self, LaunchError> {
        let program = command.program().to_owned();
        let argv = command
            .argv()
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| LaunchError::InvalidArgument {
                program: program.clone(),
                source,
            })?;
        Ok(Self { argv, program })
    }

    /// Fork a child that installs `remap` and `redirect`, then runs the program.
    ///
    /// Returns the child's pid without waiting for it. Anything that goes wrong
    /// after the fork is reported by the child, which exits with status 1.
    pub fn spawn(
        &self,
        redirect: Option<&RedirectSpec>,
        remap: StdioRemap,
    ) -> Result<Pid, LaunchError> {
        io_adapters::flush_standard_streams();
        // SAFETY: the shell is single-threaded; the child only sets up
        // descriptors before exec or exit.
        match unsafe { unistd::fork() }.map_err(LaunchError::Fork)? {
            ForkResult::Parent { child } => {
                log::debug!("forked {child} for {}", self.program);
                Ok(child)
            }
            ForkResult::Child => match self.exec(redirect, remap) {
                Ok(never) => match never {},
                Err(err) => io_adapters::fail_child(err),
            },
        }
    }

    fn exec(&self, redirect: Option<&RedirectSpec>, remap: StdioRemap) -> Result<Infallible, ExecError> {
        remap.install()?;
        if let Some(redirect) = redirect {
            redirect.install()?;
        }
        io_adapters::restore_sigpipe();
        unistd::execvp(&self.argv[0], &self.argv).map_err(|source| ExecError::Exec {
            program: self.program.clone(),
            source,
        })
    }
}

/// Launch a single command with an optional redirection and no pipe wiring.
pub fn launch(command: &Command, redirect: Option<&RedirectSpec>) -> Result<Pid, LaunchError> {
    ExternalCommand::new(command)?.spawn(redirect, StdioRemap::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argv_matches_command_tokens() {
        let command = Command::new(vec!["printf".into(), "%s\\n".into(), "a b".into()]).unwrap();
        let external = ExternalCommand::new(&command).unwrap();
        let argv: Vec<&str> = external.argv.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(argv, ["printf", "%s\\n", "a b"]);
        assert_eq!(external.program, "printf");
    }

    #[test]
    fn nul_in_argument_is_rejected_before_fork() {
        let command = Command::new(vec!["echo".into(), "a\0b".into()]).unwrap();
        assert!(matches!(
            ExternalCommand::new(&command),
            Err(LaunchError::InvalidArgument { .. })
        ));
    }
}
