//! s3: a small POSIX-like command shell.
//!
//! A line of input is split into `;`-separated segments, each segment is
//! classified (builtin, subshell, pipeline, redirection, plain command) and run
//! in the foreground. External programs run in forked children connected by
//! pipes; subshells run in a forked copy of the interpreter itself.
//!
//! The main entry point is [`Interpreter`]. The public modules [`lexer`],
//! [`parser`], [`redirect`], [`command`] and [`error`] expose the parsing layers,
//! the command tree and the error taxonomy.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
mod interpreter;
mod io_adapters;
pub mod lexer;
pub mod logging;
pub mod parser;
mod pipeline;
mod reaper;
pub mod redirect;
mod subshell;

pub use builtin::Builtin;
pub use config::Config;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
