use crate::error::StructuralError;
use std::path::PathBuf;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// A process killed by a signal is reported as `128 + signal`, as POSIX shells do.
pub type ExitCode = i32;

/// A program name followed by its arguments, exactly as the program will see them.
///
/// A `Command` is never empty: the first element is always the program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    argv: Vec<String>,
}

impl Command {
    /// Build a command from tokens that no longer contain redirection operators.
    pub fn new(argv: Vec<String>) -> Result<Self, StructuralError> {
        if argv.is_empty() {
            return Err(StructuralError::EmptyCommand);
        }
        Ok(Self { argv })
    }

    /// Name used to look up the program (argument 0).
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// The full argument vector, argument 0 included.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

/// Which standard stream a redirection replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `<`: standard input reads from the file.
    Input,
    /// `>` or `>>`: standard output writes to the file.
    Output,
}

/// How an output file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `>`: the file is emptied first.
    Truncate,
    /// `>>`: writes go to the end of the file.
    Append,
}

/// A single I/O redirection attached to a command or a subshell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectSpec {
    pub filename: PathBuf,
    pub direction: Direction,
    pub mode: Mode,
}

/// Parenthesized text run by a forked copy of the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subshell {
    /// Text between the parentheses, trimmed.
    pub body: String,
    /// Redirection written after the closing parenthesis, if any.
    pub redirect: Option<RedirectSpec>,
}

/// One element of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Command(Command, Option<RedirectSpec>),
    Subshell(Subshell),
}

/// The shape of one segment once builtins have been ruled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandGroup {
    /// A plain program invocation.
    Simple(Command),
    /// A program invocation with one redirection.
    Redirected(Command, RedirectSpec),
    /// Two or more stages connected by `|`.
    Pipeline(Vec<Stage>),
    /// A parenthesized group.
    Subshell(Subshell),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        assert_eq!(Command::new(vec![]), Err(StructuralError::EmptyCommand));
    }

    #[test]
    fn program_is_first_argument() {
        let cmd = Command::new(vec!["ls".into(), "-l".into()]).unwrap();
        assert_eq!(cmd.program(), "ls");
        assert_eq!(cmd.argv(), ["ls", "-l"]);
    }
}
