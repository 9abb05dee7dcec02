//! Error taxonomy of the shell.
//!
//! Parent-side failures ([`StructuralError`], [`RedirectError`], [`LaunchError`],
//! [`BuiltinError`]) abort only the unit of work they occur in and are reported
//! on stderr. [`ExecError`] only ever exists inside a forked child, which reports
//! it and terminates with status 1.

use std::ffi::NulError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The line or segment does not have a valid shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("syntax error: unbalanced parentheses")]
    UnbalancedParens,
    #[error("syntax error: unexpected `(`")]
    UnexpectedParen,
    #[error("syntax error: empty pipeline stage")]
    EmptyStage,
    #[error("syntax error: empty command")]
    EmptyCommand,
    #[error("syntax error: more than {limit} segments")]
    TooManySegments { limit: usize },
    #[error("syntax error: unexpected `{0}` after subshell")]
    TrailingText(String),
}

/// A redirection operator is not followed by a usable filename.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RedirectError {
    #[error("syntax error: missing filename after `{0}`")]
    MissingTarget(String),
}

/// Failure to set up a process from the parent side.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),
    #[error("pipe failed: {0}")]
    Pipe(#[source] nix::Error),
    #[error("{program}: argument contains a NUL byte")]
    InvalidArgument {
        program: String,
        #[source]
        source: NulError,
    },
}

/// Failure inside a forked child before or while replacing its image.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot duplicate descriptor: {0}")]
    Dup(#[source] nix::Error),
    #[error("{path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: nix::Error,
    },
}

/// Failure of a builtin running inside the shell process.
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("cd: too many arguments")]
    TooManyArguments,
    #[error("cd: no previous directory")]
    NoPreviousDirectory,
    #[error("cd: path not set")]
    PathNotSet,
    #[error("cd: cannot be used in a pipeline")]
    InPipeline,
    #[error("cd: {target}: change directory failed: {source}")]
    ChangeDirectory {
        target: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Any error the interpreter reports for one segment.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Redirect(#[from] RedirectError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Builtin(#[from] BuiltinError),
}
