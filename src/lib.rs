//! Minimal typed wrapper around the `adb` binary.
//!
//! Every operation builds an argument vector, spawns adb as a subprocess,
//! parses its plain-text output, and returns a typed result. The adb
//! protocol itself is never reimplemented; exit code != 0 is the sole
//! failure signal from that boundary.

pub mod adb;
pub mod error;
pub mod logging;
pub mod models;

pub use adb::client::AdbClient;
pub use adb::command::CommandBuilder;
pub use adb::device::{AdbDevice, Compass};
pub use adb::record::ScreenRecording;
pub use adb::runner::ProcessHandle;
pub use error::{AdbError, AdbResult};
pub use models::{DeviceEntry, ProcessRecord, RecordOptions};
