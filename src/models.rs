use serde::{Deserialize, Serialize};

/// One row of `adb devices` output. Produced fresh on every listing call,
/// never cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceEntry {
    pub serial: String,
    /// State as reported by adb: `device`, `offline`, `unauthorized`, ...
    pub state: String,
}

impl DeviceEntry {
    /// The state adb reports for a device that is ready for commands.
    pub const STATE_READY: &'static str = "device";

    pub fn is_available(&self) -> bool {
        self.state == Self::STATE_READY
    }
}

/// One row of `adb shell ps` output, mapped positionally onto the toybox
/// column layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessRecord {
    pub user: String,
    pub pid: u32,
    pub ppid: u32,
    pub vsize: String,
    pub rss: String,
    pub wchan: String,
    pub addr: String,
    pub state: String,
    /// All trailing tokens re-joined with spaces. The column is ragged on
    /// some builds, so treat this as best-effort.
    pub name: String,
}

/// Options forwarded to `screenrecord` when starting a capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordOptions {
    /// e.g. "4M"; empty means device default.
    pub bit_rate: String,
    /// 0 means device default (180 s cap on most builds).
    pub time_limit_sec: u32,
    /// e.g. "1280x720"; empty means native resolution.
    pub size: String,
}

impl RecordOptions {
    pub(crate) fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.bit_rate.trim().is_empty() {
            args.push("--bit-rate".to_string());
            args.push(self.bit_rate.trim().to_string());
        }
        if self.time_limit_sec > 0 {
            args.push("--time-limit".to_string());
            args.push(self.time_limit_sec.to_string());
        }
        if !self.size.trim().is_empty() {
            args.push("--size".to_string());
            args.push(self.size.trim().to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_options_add_no_args() {
        assert!(RecordOptions::default().to_args().is_empty());
    }

    #[test]
    fn record_options_emit_flag_value_pairs() {
        let options = RecordOptions {
            bit_rate: "4M".to_string(),
            time_limit_sec: 30,
            size: "1280x720".to_string(),
        };
        assert_eq!(
            options.to_args(),
            vec!["--bit-rate", "4M", "--time-limit", "30", "--size", "1280x720"]
        );
    }

    #[test]
    fn ready_state_matches_device_literal() {
        let entry = DeviceEntry {
            serial: "123456E".to_string(),
            state: "device".to_string(),
        };
        assert!(entry.is_available());
        let offline = DeviceEntry {
            serial: "123456F".to_string(),
            state: "offline".to_string(),
        };
        assert!(!offline.is_available());
    }
}
