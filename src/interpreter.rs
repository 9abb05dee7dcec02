use crate::command::{CommandGroup, ExitCode};
use crate::config::Config;
use crate::env::WorkingDirectoryState;
use crate::error::{LaunchError, ShellError};
use crate::external;
use crate::io_adapters::StdioRemap;
use crate::parser::{self, Dispatch};
use crate::pipeline;
use crate::reaper::Reaper;
use crate::subshell;
use anyhow::{Context, anyhow};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// A small shell interpreter: sequencing, subshells, pipelines and redirection
/// over external programs, plus the `cd` and `exit` builtins.
///
/// The interpreter owns the directory history used by `cd -`. Subshells run in a
/// forked copy of the interpreter, so their changes never reach this one.
///
/// Example
/// ```no_run
/// use s3::{Config, Interpreter};
/// let mut sh = Interpreter::new(Config::default());
/// let code = sh.run_line("echo hello; echo world | tr a-z A-Z");
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    config: Config,
    wd: WorkingDirectoryState,
}

impl Interpreter {
    pub fn new(config: Config) -> Self {
        let wd = WorkingDirectoryState::new(config.limits.max_dir_len);
        Self { config, wd }
    }

    pub fn working_directory(&self) -> &WorkingDirectoryState {
        &self.wd
    }

    /// Run one line of input as a batch of `;`-separated segments.
    ///
    /// Every segment runs to completion before the next starts, and a failing
    /// segment never stops the ones after it. Errors are reported on stderr.
    /// Segments past the limit are not run and count as one failed segment.
    /// Returns the status of the last segment.
    pub fn run_line(&mut self, line: &str) -> ExitCode {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return 0;
        }

        let batch = match parser::split_batch(line, &self.config.limits) {
            Ok(batch) => batch,
            Err(e) => {
                eprintln!("s3: {e}");
                return 1;
            }
        };

        let mut status = 0;
        for segment in &batch.segments {
            status = match self.run_segment(segment) {
                Ok(status) => status,
                Err(e) => {
                    eprintln!("s3: {e}");
                    1
                }
            };
        }
        if let Some(e) = batch.overflow {
            eprintln!("s3: {e}");
            status = 1;
        }
        status
    }

    /// Classify one segment and run it in the foreground.
    fn run_segment(&mut self, segment: &str) -> Result<ExitCode, ShellError> {
        match parser::classify(segment, &self.config.limits)? {
            Dispatch::Builtin(builtin) => Ok(builtin.run(&mut self.wd)?),
            Dispatch::Group(group) => {
                let mut reaper = Reaper::new();
                let spawned = self.spawn_group(&group, &mut reaper);
                let status = reaper.wait_all();
                spawned?;
                Ok(status.unwrap_or(1))
            }
        }
    }

    /// Fork the processes for `group`, tracking each one in `reaper`.
    fn spawn_group(&mut self, group: &CommandGroup, reaper: &mut Reaper) -> Result<(), LaunchError> {
        match group {
            CommandGroup::Simple(command) => reaper.track(external::launch(command, None)?),
            CommandGroup::Redirected(command, redirect) => {
                reaper.track(external::launch(command, Some(redirect))?)
            }
            CommandGroup::Pipeline(stages) => {
                pipeline::spawn_pipeline(stages, reaper, &mut |body: &str| self.run_line(body))?
            }
            CommandGroup::Subshell(sub) => reaper.track(subshell::spawn(
                sub,
                StdioRemap::default(),
                &mut |body: &str| self.run_line(body),
            )?),
        }
        Ok(())
    }

    /// Prompt showing the current directory, e.g. `[/home/me s3]$ `.
    pub fn construct_prompt(&self) -> String {
        match std::env::current_dir() {
            Ok(dir) => format!("[{} s3]$ ", dir.display()),
            Err(_) => self.config.prompt.fallback.clone(),
        }
    }

    /// Read-Eval-Print Loop.
    ///
    /// Returns only on failure to read input, end of input included.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new().context("cannot initialize line editor")?;

        loop {
            match rl.readline(&self.construct_prompt()) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    let status = self.run_line(&line);
                    log::debug!("`{line}` finished with {status}");
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Err(anyhow!("end of input")),
                Err(err) => return Err(err).context("cannot read input"),
            }
        }
    }
}

impl Default for Interpreter {
    /// Interpreter using the embedded default configuration.
    fn default() -> Self {
        Self::new(Config::default_config())
    }
}
