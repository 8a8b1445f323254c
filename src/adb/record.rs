use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::adb::device::AdbDevice;
use crate::adb::runner::{self, ProcessHandle};
use crate::error::{AdbError, AdbResult};
use crate::models::RecordOptions;

/// How long to let screenrecord run before checking that it survived
/// startup. Lets an unsupported device fail fast; not a retry point.
const START_GRACE: Duration = Duration::from_millis(300);

const RECORD_PROCESS_NAME: &str = "screenrecord";

/// SIGINT makes screenrecord finalize the mp4 container before exiting.
const STOP_SIGNAL: i32 = 2;

/// An in-progress screen recording: the device-side capture path, the local
/// process handle, and the start timestamp. Start and stop are its only
/// operations; starting two recordings against the same device is caller
/// responsibility.
#[derive(Debug)]
pub struct ScreenRecording {
    device: AdbDevice,
    remote_path: String,
    handle: ProcessHandle,
    started_at: DateTime<Utc>,
}

impl ScreenRecording {
    pub(crate) fn start(device: AdbDevice, options: &RecordOptions) -> AdbResult<Self> {
        let remote_path = format!(
            "/data/local/tmp/screenrecord_{}.mp4",
            Utc::now().format("%Y%m%d_%H%M%S")
        );

        let mut tokens = vec![RECORD_PROCESS_NAME.to_string()];
        tokens.extend(options.to_args());
        tokens.push(remote_path.clone());

        let mut handle = runner::spawn(&device.builder().shell(&tokens))?;
        std::thread::sleep(START_GRACE);
        if !handle.is_running() {
            return Err(AdbError::RecordingStart {
                serial: device.serial().unwrap_or("default").to_string(),
            });
        }

        info!(remote_path = %remote_path, "screen recording started");
        Ok(Self {
            device,
            remote_path,
            handle,
            started_at: Utc::now(),
        })
    }

    /// Device-side path of the in-progress capture file.
    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Non-blocking liveness check of the local capture process.
    pub fn is_running(&mut self) -> bool {
        self.handle.is_running()
    }

    /// Stop the recording and pull the artifact to `local_path` (or the
    /// remote file name in the working directory). Returns the transfer
    /// output.
    ///
    /// Idempotent on the local handle: stopping an already-stopped
    /// recording logs a warning, skips termination, and still pulls.
    pub fn stop(&mut self, local_path: Option<&Path>) -> AdbResult<String> {
        if self.handle.is_running() {
            self.handle.terminate();
        } else {
            warn!(remote_path = %self.remote_path, "recording already stopped");
        }

        // The device-side screenrecord regularly detaches from the local adb
        // child, so a name-based kill runs on every stop regardless of the
        // handle's own state. Every matching process is signalled; a detach
        // can leave more than one behind.
        match self.device.list_processes() {
            Ok(records) => {
                for record in records
                    .into_iter()
                    .filter(|record| record.name.contains(RECORD_PROCESS_NAME))
                {
                    let pid = record.pid.to_string();
                    match self
                        .device
                        .shell(&["kill", &format!("-{STOP_SIGNAL}"), &pid])
                    {
                        Ok(_) => info!(pid = record.pid, "killed device-side screenrecord"),
                        Err(err) => {
                            warn!(pid = record.pid, error = %err, "device-side screenrecord kill failed")
                        }
                    }
                }
            }
            Err(err) => warn!(error = %err, "could not list processes for fallback kill"),
        }

        let local = match local_path {
            Some(path) => path.to_string_lossy().to_string(),
            None => self
                .remote_path
                .rsplit('/')
                .next()
                .unwrap_or(RECORD_PROCESS_NAME)
                .to_string(),
        };
        self.device.pull(&self.remote_path, &local)
    }
}
