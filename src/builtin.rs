use crate::command::ExitCode;
use crate::env::WorkingDirectoryState;
use crate::error::BuiltinError;
use std::ffi::OsString;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins run synchronously inside the shell process, because their effect must
/// be visible to the shell itself. They never fork and never go through the reaper.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Build the command from the words following its name.
    fn from_args(args: &[String]) -> Self;

    /// Run the command. 0 means success.
    fn execute(self, wd: &mut WorkingDirectoryState) -> Result<ExitCode, BuiltinError>;
}

/// A recognized builtin invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Builtin {
    /// `cd` with the words that followed it.
    Cd(Vec<String>),
    /// `exit`; any arguments are ignored.
    Exit,
}

impl Builtin {
    /// Recognize a builtin by the first word of a segment.
    pub fn recognize(tokens: &[String]) -> Option<Self> {
        let (name, args) = tokens.split_first()?;
        if name == Cd::name() {
            Some(Builtin::Cd(args.to_vec()))
        } else if name == Exit::name() {
            Some(Builtin::Exit)
        } else {
            None
        }
    }

    /// Run the builtin against the shell's directory state.
    pub fn run(&self, wd: &mut WorkingDirectoryState) -> Result<ExitCode, BuiltinError> {
        match self {
            Builtin::Cd(args) => Cd::from_args(args).execute(wd),
            Builtin::Exit => Exit::from_args(&[]).execute(wd),
        }
    }
}

/// Change the current working directory.
///
/// `cd` alone goes to `$HOME`, `cd -` goes back to the previous directory.
pub struct Cd {
    args: Vec<String>,
}

impl Cd {
    /// Work out where to go, given the value of `$HOME`.
    fn resolve_target(
        &self,
        wd: &WorkingDirectoryState,
        home: Option<OsString>,
    ) -> Result<PathBuf, BuiltinError> {
        match self.args.as_slice() {
            [] => match home {
                Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
                _ => Err(BuiltinError::PathNotSet),
            },
            [dash] if dash == "-" => wd
                .previous()
                .map(|p| p.to_owned())
                .ok_or(BuiltinError::NoPreviousDirectory),
            [path] => Ok(PathBuf::from(path)),
            _ => Err(BuiltinError::TooManyArguments),
        }
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[String]) -> Self {
        Self {
            args: args.to_vec(),
        }
    }

    fn execute(self, wd: &mut WorkingDirectoryState) -> Result<ExitCode, BuiltinError> {
        let target = self.resolve_target(wd, std::env::var_os("HOME"))?;
        wd.change_dir(&target)?;
        Ok(0)
    }
}

/// Exit the shell process with success status.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(_args: &[String]) -> Self {
        Exit
    }

    fn execute(self, _wd: &mut WorkingDirectoryState) -> Result<ExitCode, BuiltinError> {
        crate::io_adapters::flush_standard_streams();
        std::process::exit(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::tests::lock_current_dir;
    use std::env as stdenv;
    use std::path::Path;

    fn cd(args: &[&str]) -> Cd {
        Cd::from_args(&args.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn recognizes_builtins_by_first_word() {
        assert_eq!(
            Builtin::recognize(&words("cd /tmp")),
            Some(Builtin::Cd(vec!["/tmp".into()]))
        );
        assert_eq!(Builtin::recognize(&words("exit 3")), Some(Builtin::Exit));
        assert_eq!(Builtin::recognize(&words("ls cd")), None);
        assert_eq!(Builtin::recognize(&[]), None);
    }

    #[test]
    fn too_many_arguments() {
        let wd = WorkingDirectoryState::new(4096);
        assert!(matches!(
            cd(&["a", "b"]).resolve_target(&wd, None),
            Err(BuiltinError::TooManyArguments)
        ));
    }

    #[test]
    fn dash_without_previous() {
        let wd = WorkingDirectoryState::new(4096);
        assert!(matches!(
            cd(&["-"]).resolve_target(&wd, None),
            Err(BuiltinError::NoPreviousDirectory)
        ));
    }

    #[test]
    fn no_argument_uses_home() {
        let wd = WorkingDirectoryState::new(4096);
        assert_eq!(
            cd(&[]).resolve_target(&wd, Some("/home/me".into())).unwrap(),
            PathBuf::from("/home/me")
        );
        assert!(matches!(
            cd(&[]).resolve_target(&wd, None),
            Err(BuiltinError::PathNotSet)
        ));
        assert!(matches!(
            cd(&[]).resolve_target(&wd, Some("".into())),
            Err(BuiltinError::PathNotSet)
        ));
    }

    #[test]
    fn literal_path_is_used_as_is() {
        let wd = WorkingDirectoryState::new(4096);
        assert_eq!(
            cd(&["../x"]).resolve_target(&wd, None).unwrap(),
            PathBuf::from("../x")
        );
    }

    #[test]
    fn cd_then_dash_returns() {
        let _lock = lock_current_dir();
        let start = stdenv::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().canonicalize().unwrap();
        let mut wd = WorkingDirectoryState::new(4096);

        let run = |args: &[&str], wd: &mut WorkingDirectoryState| {
            Builtin::Cd(args.iter().map(|s| s.to_string()).collect()).run(wd)
        };

        assert_eq!(run(&[target.to_str().unwrap()], &mut wd).unwrap(), 0);
        assert_eq!(stdenv::current_dir().unwrap(), target);
        assert_eq!(run(&["-"], &mut wd).unwrap(), 0);
        assert_eq!(stdenv::current_dir().unwrap(), start);
        assert_eq!(wd.previous(), Some(target.as_path()));

        stdenv::set_current_dir(&start).unwrap();
    }

    #[test]
    fn failed_cd_leaves_directory_alone() {
        let _lock = lock_current_dir();
        let start = stdenv::current_dir().unwrap();
        let mut wd = WorkingDirectoryState::new(4096);

        let err = Builtin::Cd(vec!["/definitely/not/here".into()])
            .run(&mut wd)
            .unwrap_err();
        assert!(matches!(err, BuiltinError::ChangeDirectory { .. }));
        assert_eq!(stdenv::current_dir().unwrap(), start);
        assert_eq!(wd.previous(), None::<&Path>);
    }
}
