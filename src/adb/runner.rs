use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tracing::info;

use crate::error::{AdbError, AdbResult};

/// How long `ProcessHandle::terminate` waits for a graceful exit before
/// falling back to a hard kill.
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Run `argv` to completion and return its merged stdout/stderr decoded as
/// (lossy) UTF-8. Non-zero exit is an error carrying the same merged output.
pub fn run(argv: &[String]) -> AdbResult<String> {
    let (status, output) = run_capture(argv)?;
    let text = String::from_utf8_lossy(&output).to_string();
    if status.success() {
        Ok(text)
    } else {
        Err(AdbError::CommandFailed {
            status: status.to_string(),
            output: text,
        })
    }
}

/// Like [`run`] but returns the raw bytes, for output that is not text
/// (e.g. `exec-out screencap -p`).
pub fn run_raw(argv: &[String]) -> AdbResult<Vec<u8>> {
    let (status, output) = run_capture(argv)?;
    if status.success() {
        Ok(output)
    } else {
        Err(AdbError::CommandFailed {
            status: status.to_string(),
            output: String::from_utf8_lossy(&output).to_string(),
        })
    }
}

fn run_capture(argv: &[String]) -> AdbResult<(ExitStatus, Vec<u8>)> {
    let (program, args) = split_argv(argv)?;
    info!(command = %argv.join(" "), "running adb command");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| AdbError::Spawn {
            program: program.to_string(),
            source,
        })?;

    // Drain stdout/stderr in parallel; otherwise, a chatty child process can
    // block once the pipe buffer fills and never exit.
    let stdout = child.stdout.take().map(drain_pipe);
    let stderr = child.stderr.take().map(drain_pipe);

    let status = child.wait().map_err(|source| AdbError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let mut output = stdout
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    if let Some(bytes) = stderr.and_then(|handle| handle.join().ok()) {
        output.extend_from_slice(&bytes);
    }

    Ok((status, output))
}

fn drain_pipe<R: Read + Send + 'static>(mut reader: R) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::<u8>::new();
        let mut temp = [0u8; 4096];
        loop {
            match reader.read(&mut temp) {
                Ok(0) => break,
                Ok(count) => buffer.extend_from_slice(&temp[..count]),
                Err(_) => break,
            }
        }
        buffer
    })
}

fn split_argv(argv: &[String]) -> AdbResult<(&String, &[String])> {
    match argv.split_first() {
        Some(pair) => Ok(pair),
        None => Err(AdbError::InvalidArgument("empty argument vector".to_string())),
    }
}

/// Spawn `argv` without waiting. Output is not captured; the handle is for
/// lifecycle control only.
pub fn spawn(argv: &[String]) -> AdbResult<ProcessHandle> {
    let (program, args) = split_argv(argv)?;
    info!(command = %argv.join(" "), "spawning adb command");

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| AdbError::Spawn {
            program: program.to_string(),
            source,
        })?;

    Ok(ProcessHandle { child })
}

/// A live handle to a spawned adb subprocess.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
}

impl ProcessHandle {
    /// Non-blocking liveness check.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Ask the process to exit, escalating to a hard kill if it does not
    /// comply within the grace window.
    pub fn terminate(&mut self) {
        if !self.is_running() {
            return;
        }

        #[cfg(unix)]
        {
            // SAFETY: plain kill(2) on a pid we own; failure is handled by
            // the hard-kill fallback below.
            unsafe {
                libc::kill(self.child.id() as libc::pid_t, libc::SIGTERM);
            }
            let start = Instant::now();
            while start.elapsed() < TERMINATE_GRACE {
                match self.child.try_wait() {
                    Ok(Some(_)) => return,
                    Ok(None) => std::thread::sleep(Duration::from_millis(100)),
                    Err(_) => break,
                }
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    /// Block until the process exits.
    pub fn wait(&mut self) -> AdbResult<ExitStatus> {
        self.child.wait().map_err(|source| AdbError::Spawn {
            program: "adb".to_string(),
            source,
        })
    }
}
