use crate::error::BuiltinError;
use std::env as stdenv;
use std::path::{Path, PathBuf};

/// Directory history needed by `cd -`.
///
/// The current directory is never stored here: it is always the process's actual
/// working directory. `previous` is only updated by a successful change and then
/// holds the directory that was current right before it.
///
/// One value is owned by the top-level interpreter and passed by reference into
/// builtins. A forked subshell works on its own copy, so nothing it does is seen
/// by the parent.
#[derive(Debug, Clone)]
pub struct WorkingDirectoryState {
    previous: Option<PathBuf>,
    capacity: usize,
}

impl WorkingDirectoryState {
    /// Create an empty history that remembers paths of at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            previous: None,
            capacity,
        }
    }

    /// The directory that was current before the last successful change.
    pub fn previous(&self) -> Option<&Path> {
        self.previous.as_deref()
    }

    /// Change the process working directory to `target`.
    ///
    /// On failure nothing changes. On success the old directory becomes the
    /// previous one, unless it could not be read or does not fit in `capacity`,
    /// in which case no previous directory is known.
    pub fn change_dir(&mut self, target: &Path) -> Result<(), BuiltinError> {
        let candidate = stdenv::current_dir().ok();

        stdenv::set_current_dir(target).map_err(|source| BuiltinError::ChangeDirectory {
            target: target.to_owned(),
            source,
        })?;

        self.previous = candidate.filter(|dir| dir.as_os_str().len() <= self.capacity);
        log::debug!("cd {} (previous: {:?})", target.display(), self.previous);
        Ok(())
    }
}
