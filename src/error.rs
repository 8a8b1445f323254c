use thiserror::Error;

/// A specialized `Result` type for adb wrapper operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for everything the wrapper does.
///
/// Hard failures only; soft failures (unparseable property lines, a missed
/// kill-by-name, stopping an already-stopped recording) are logged and never
/// surface here.
#[derive(Debug, Error)]
pub enum AdbError {
    /// The adb process exited non-zero. Carries the merged stdout/stderr so
    /// the caller sees whatever adb itself reported.
    #[error("adb exited with {status}: {output}")]
    CommandFailed { status: String, output: String },

    /// The adb binary could not be launched at all.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Expected output shape was not found (e.g. no `NxM` token in
    /// `wm size` output).
    #[error("could not parse adb output: {0}")]
    Parse(String),

    /// The screenrecord process exited within the startup grace window.
    #[error("screen recording failed to start on {serial}")]
    RecordingStart { serial: String },

    /// The queried device state does not exist right now (e.g. no window
    /// holds focus). A legitimate terminal state, not a bug.
    #[error("device state unavailable: {0}")]
    StateUnavailable(String),

    /// The caller passed an out-of-range or otherwise unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
