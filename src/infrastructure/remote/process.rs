//! Child process execution with an optional deadline
//!
//! stdout and stderr are drained on their own threads so a chatty child
//! cannot block on a full pipe while we wait for it.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::domain::ports::{CommandOutput, RemoteError, RemoteResult};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `cmd` to completion, killing it once `timeout` elapses.
///
/// `label` names the command in errors.
pub fn run_bounded(cmd: &mut Command, label: &str, timeout: Option<Duration>) -> RemoteResult<CommandOutput> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match wait_for(&mut child, timeout)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RemoteError::Timeout {
                command: label.to_string(),
                after: timeout.unwrap_or_default(),
            });
        }
    };

    Ok(CommandOutput {
        stdout: collect(stdout),
        stderr: collect(stderr),
        // killed by a signal
        exit_code: status.code().unwrap_or(-1),
    })
}

/// Wait for `child`; `None` means the deadline passed first and the child
/// is still running.
pub fn wait_for(child: &mut Child, timeout: Option<Duration>) -> RemoteResult<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return Ok(Some(child.wait()?));
    };
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
