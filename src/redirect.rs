//! Finding `<`, `>` and `>>` among a command's tokens, and installing the
//! resulting redirection inside a forked child.

use crate::command::{Direction, Mode, RedirectSpec};
use crate::error::{ExecError, RedirectError};
use nix::unistd;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;

/// A redirection operator located in a token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    /// Index of the operator token; the filename is at `index + 1`.
    pub index: usize,
    pub filename: String,
    pub is_input: bool,
    pub is_append: bool,
}

fn operator(token: &str) -> Option<(Direction, Mode)> {
    match token {
        "<" => Some((Direction::Input, Mode::Truncate)),
        ">" => Some((Direction::Output, Mode::Truncate)),
        ">>" => Some((Direction::Output, Mode::Append)),
        _ => None,
    }
}

/// Locates the first redirection operator in `tokens`.
///
/// Returns `Ok(None)` when there is none; redirection is optional.
pub fn find_redirection(tokens: &[String]) -> Result<Option<Found>, RedirectError> {
    let Some(index) = tokens.iter().position(|t| operator(t).is_some()) else {
        return Ok(None);
    };
    let op = &tokens[index];
    let filename = match tokens.get(index + 1) {
        Some(name) if operator(name).is_none() => name.clone(),
        _ => return Err(RedirectError::MissingTarget(op.clone())),
    };
    Ok(Some(Found {
        index,
        filename,
        is_input: op == "<",
        is_append: op == ">>",
    }))
}

/// Removes every redirection from `tokens` and returns the first one.
///
/// Only the first operator is honored. Later operators and their filenames are
/// removed too, so the program never sees them, but they have no effect.
pub fn take_redirection(tokens: &mut Vec<String>) -> Result<Option<RedirectSpec>, RedirectError> {
    let Some(found) = find_redirection(tokens)? else {
        return Ok(None);
    };
    tokens.drain(found.index..=found.index + 1);

    while let Some(index) = tokens.iter().position(|t| operator(t).is_some()) {
        let end = (index + 1).min(tokens.len() - 1);
        let ignored: Vec<String> = tokens.drain(index..=end).collect();
        log::debug!("ignoring extra redirection {ignored:?}");
    }

    Ok(Some(RedirectSpec {
        filename: PathBuf::from(found.filename),
        direction: if found.is_input { Direction::Input } else { Direction::Output },
        mode: if found.is_append { Mode::Append } else { Mode::Truncate },
    }))
}

impl RedirectSpec {
    /// Opens the target file the way the operator asks for.
    pub fn open(&self) -> Result<File, ExecError> {
        let mut options = OpenOptions::new();
        match (self.direction, self.mode) {
            (Direction::Input, _) => options.read(true),
            (Direction::Output, Mode::Truncate) => options.write(true).create(true).truncate(true),
            (Direction::Output, Mode::Append) => options.append(true).create(true),
        };
        options.open(&self.filename).map_err(|source| ExecError::Open {
            path: self.filename.clone(),
            source,
        })
    }

    /// Replaces stdin or stdout of the calling process with the target file.
    ///
    /// Only meant to run in a forked child.
    pub fn install(&self) -> Result<(), ExecError> {
        let file = self.open()?;
        match self.direction {
            Direction::Input => unistd::dup2_stdin(&file),
            Direction::Output => unistd::dup2_stdout(&file),
        }
        .map_err(ExecError::Dup)
    }
}
