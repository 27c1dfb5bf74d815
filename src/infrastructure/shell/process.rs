//! Child process runner with a deadline
//!
//! Output is drained on helper threads so a chatty command cannot block on a
//! full pipe while we poll for exit.
//!
//! On unix the child gets its own process group. A Ctrl+C at the terminal
//! then reaches only stagehand, which finishes the running step and stops at
//! the next boundary.

use std::io::{ErrorKind, Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::domain::ports::{CommandOutput, ShellError, ShellResult};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long output pipes may stay open after the child exits. Anything still
/// holding them then is a detached descendant (a daemon started by the step).
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Run `command` to completion, killing it once `timeout` has elapsed.
///
/// `command_line` is the command text reported in errors.
pub fn run_with_timeout(
    mut command: Command,
    command_line: &str,
    stdin: Option<&[u8]>,
    timeout: Option<Duration>,
    warn_only: bool,
) -> ShellResult<CommandOutput> {
    command
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    detach_from_terminal_signals(&mut command);

    let mut child = command.spawn().map_err(|source| ShellError::Spawn {
        command: command_line.to_string(),
        source,
    })?;

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        let input = input.to_vec();
        thread::spawn(move || {
            // A command that exits without reading stdin closes the pipe early.
            let _ = pipe.write_all(&input);
        });
    }
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match wait_until(&mut child, timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            // Grandchildren may still hold the pipes; the drain threads are
            // left to finish on their own.
            return Err(ShellError::Timeout {
                command: command_line.to_string(),
                after: timeout.unwrap_or_default(),
            });
        }
        Err(source) => {
            let _ = child.kill();
            return Err(ShellError::Spawn {
                command: command_line.to_string(),
                source,
            });
        }
    };

    let drained_by = Instant::now() + DRAIN_GRACE;
    let output = CommandOutput {
        status: status.code().unwrap_or(-1),
        stdout: collect(stdout, drained_by, command_line),
        stderr: collect(stderr, drained_by, command_line),
    };

    if !output.success() && !warn_only {
        return Err(ShellError::Failed {
            command: command_line.to_string(),
            status: output.status,
            stderr: output.stderr.trim_end().to_string(),
        });
    }
    Ok(output)
}

/// `Ok(None)` means the deadline passed first.
fn wait_until(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
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

#[cfg(unix)]
fn detach_from_terminal_signals(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn detach_from_terminal_signals(_command: &mut Command) {}

/// Output read so far, shared with the thread reading the pipe
struct Drain {
    reader: JoinHandle<()>,
    bytes: Arc<Mutex<Vec<u8>>>,
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Drain> {
    pipe.map(|mut pipe| {
        let bytes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&bytes);
        let reader = thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => match sink.lock() {
                        Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                        Err(_) => break,
                    },
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });
        Drain { reader, bytes }
    })
}

/// Wait for the pipe to close, but no later than `until`.
fn collect(drain: Option<Drain>, until: Instant, command_line: &str) -> String {
    let Some(drain) = drain else {
        return String::new();
    };
    while !drain.reader.is_finished() && Instant::now() < until {
        thread::sleep(POLL_INTERVAL);
    }
    if drain.reader.is_finished() {
        let _ = drain.reader.join();
    } else {
        tracing::debug!(command = %command_line, "output pipe still open after exit; keeping what was read");
    }
    let bytes = drain.bytes.lock().map(|buf| buf.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn captures_stdout_and_stderr() {
        let out = run_with_timeout(sh("echo out; echo err >&2"), "t", None, None, false).unwrap();
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[test]
    fn non_zero_exit_is_failed() {
        let err = run_with_timeout(sh("echo nope >&2; exit 3"), "t", None, None, false).unwrap_err();
        match err {
            ShellError::Failed { status, stderr, .. } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn warn_only_returns_output() {
        let out = run_with_timeout(sh("exit 4"), "t", None, None, true).unwrap();
        assert_eq!(out.status, 4);
    }

    #[test]
    fn stdin_is_fed() {
        let out = run_with_timeout(sh("cat"), "t", Some(b"hello"), None, false).unwrap();
        assert_eq!(out.stdout, "hello");
    }

    #[test]
    fn overrun_is_killed() {
        let started = Instant::now();
        let err = run_with_timeout(
            sh("exec sleep 5"),
            "sleep 5",
            None,
            Some(Duration::from_millis(200)),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ShellError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn descendant_holding_stdout_does_not_block() {
        let started = Instant::now();
        let out = run_with_timeout(
            sh("sleep 5 & echo started"),
            "daemon",
            None,
            Some(Duration::from_secs(30)),
            false,
        )
        .unwrap();
        assert_eq!(out.stdout, "started\n");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn child_leads_its_own_process_group() {
        // field 5 of /proc/<pid>/stat is the process group id
        let out = run_with_timeout(
            sh("echo $$ $(cut -d' ' -f5 /proc/$$/stat)"),
            "pgid",
            None,
            None,
            false,
        )
        .unwrap();
        let ids: Vec<&str> = out.stdout.split_whitespace().collect();
        assert_eq!(ids.len(), 2, "stdout: {}", out.stdout);
        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = run_with_timeout(
            Command::new("/nonexistent/stagehand-test-binary"),
            "x",
            None,
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ShellError::Spawn { .. }));
    }
}
