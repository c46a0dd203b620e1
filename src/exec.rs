use std::io;
use std::io::Read;
use std::path::Path;
use std::process;
use std::process::Stdio;
use std::thread;
use std::time::{Duration, Instant};

/// Default wall-clock limit on one notebook execution.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The result of asking the collaborator to execute a notebook.
///
/// Execution is best-effort: every variant other than `Executed` still means
/// the conversion succeeded and the unexecuted notebook is intact on disk.
#[derive(Debug)]
pub enum ExecOutcome {
    /// All code cells ran and results were written back in place.
    Executed,
    /// The collaborator ran but reported failure; its stderr is kept for the
    /// report.
    Failed(String),
    /// The collaborator exceeded the wall-clock limit and was killed.
    TimedOut(Duration),
    /// The collaborator could not be launched at all.
    Unavailable(io::Error),
}

/// Capability interface to the external execution collaborator.
///
/// The conversion pipeline only ever sees this trait, so tests can inject a
/// collaborator without a live jupyter installation.
pub trait Executor {
    /// Execute all code cells of the notebook at `notebook` in order against
    /// a live kernel, writing results back in place.
    fn execute(&self, notebook: &Path, timeout: Duration) -> ExecOutcome;
}

/// Executes notebooks through `jupyter nbconvert --to notebook --execute
/// --inplace`, run as an isolated subprocess bounded by a wall-clock
/// deadline.
#[derive(Debug, Default)]
pub struct Nbconvert;

impl Executor for Nbconvert {
    fn execute(&self, notebook: &Path, timeout: Duration) -> ExecOutcome {
        info!(
            "Executing notebook {} (timeout {}s).",
            notebook.display(),
            timeout.as_secs()
        );

        let child = match process::Command::new("jupyter")
            .args(&["nbconvert", "--to", "notebook", "--execute", "--inplace"])
            .arg(notebook)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(error) => return ExecOutcome::Unavailable(error),
        };

        supervise(child, timeout)
    }
}

/// Watch a running collaborator until it exits or the deadline passes, in
/// which case it is killed and reaped.
fn supervise(mut child: process::Child, timeout: Duration) -> ExecOutcome {
    let deadline = Instant::now() + timeout;

    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return ExecOutcome::Executed,
            Ok(Some(status)) => {
                debug!("Execution collaborator exited with {:?}.", status.code());
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = pipe.read_to_string(&mut stderr);
                }
                return ExecOutcome::Failed(stderr);
            }
            Ok(None) if Instant::now() >= deadline => {
                debug!("Execution deadline passed; killing the collaborator.");
                let _ = child.kill();
                let _ = child.wait();
                return ExecOutcome::TimedOut(timeout);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(error) => return ExecOutcome::Unavailable(error),
        }
    }
}
