use crate::command::ExitCode;
use nix::errno::Errno;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;

/// Collects every child forked for one unit of work.
///
/// Each tracked process is waited on exactly once, either by
/// [`Reaper::wait_all`] or, as a last resort, when the reaper is dropped.
#[derive(Debug, Default)]
pub struct Reaper {
    pending: Vec<Pid>,
}

impl Reaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take responsibility for waiting on `pid`.
    pub fn track(&mut self, pid: Pid) {
        self.pending.push(pid);
    }

    /// Block until every tracked process has terminated.
    ///
    /// Returns the status of the most recently tracked process, which for a
    /// pipeline is its last stage, or `None` if nothing was tracked.
    pub fn wait_all(&mut self) -> Option<ExitCode> {
        let mut last = None;
        for pid in self.pending.drain(..) {
            last = Some(wait_for(pid));
        }
        last
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.wait_all();
    }
}

/// Wait for `pid` to terminate and translate its status.
fn wait_for(pid: Pid) -> ExitCode {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                log::debug!("process {pid} exited with {code}");
                return code;
            }
            Ok(WaitStatus::Signaled(_, sig, _)) => {
                log::debug!("process {pid} killed by {sig:?}");
                return 128 + sig as i32;
            }
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(e) => {
                log::warn!("waitpid({pid}) failed: {e}");
                return 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_sh(script: &str) -> Pid {
        let child = std::process::Command::new("sh")
            .args(["-c", script])
            .spawn()
            .unwrap();
        Pid::from_raw(child.id() as i32)
    }

    #[test]
    fn empty_reaper_has_no_status() {
        assert_eq!(Reaper::new().wait_all(), None);
    }

    #[test]
    fn reports_last_tracked_status() {
        let mut reaper = Reaper::new();
        reaper.track(spawn_sh("exit 3"));
        reaper.track(spawn_sh("exit 5"));
        assert_eq!(reaper.wait_all(), Some(5));
        assert_eq!(reaper.wait_all(), None);
    }

    #[test]
    fn signal_death_is_128_plus_signal() {
        let mut reaper = Reaper::new();
        reaper.track(spawn_sh("kill -9 $$"));
        assert_eq!(reaper.wait_all(), Some(128 + 9));
    }
}
