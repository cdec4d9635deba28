//! Bounded subprocess execution for route and ping utilities.
//!
//! `std::process::Command` has no timeout of its own.  The child is polled
//! with `try_wait` until it exits or the deadline passes; an overrunning
//! child is killed and reaped.  Stdout is drained on a helper thread so a
//! chatty child cannot block on a full pipe.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Default bound for one utility invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(3);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs `program args...` and returns its stdout decoded lossily as UTF-8.
///
/// Returns `None` if the program cannot be started, exceeds `timeout`, or
/// its output cannot be collected.  The exit status is not checked: callers
/// parse whatever was printed, and failing utilities print nothing useful.
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            debug!("could not start {program}: {e}");
            return None;
        }
    };

    let mut stdout = child.stdout.take()?;
    let reader = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stdout.read_to_end(&mut buf);
        buf
    });

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(_status)) => break,
            Ok(None) if Instant::now() >= deadline => {
                debug!("{program} exceeded {timeout:?}; killing");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                debug!("waiting on {program} failed: {e}");
                let _ = child.kill();
                return None;
            }
        }
    }

    let bytes = reader.join().ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
