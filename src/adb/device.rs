use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use crate::adb::command::CommandBuilder;
use crate::adb::parse::{
    parse_focused_app, parse_getprop_map, parse_package_list, parse_ps, parse_screen_size,
    parse_token_rows,
};
use crate::adb::record::ScreenRecording;
use crate::adb::runner;
use crate::error::{AdbError, AdbResult};
use crate::models::{ProcessRecord, RecordOptions};

/// Named offsets from the screen center, used by the ratio tap/swipe
/// helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compass {
    Center,
    North,
    South,
    East,
    West,
}

impl Compass {
    /// Resolve the preset into a normalized point: the center offset by
    /// `ratio` along one axis. `ratio` must be in `(0, 0.5]` so the point
    /// stays on screen.
    pub fn point(self, ratio: f64) -> AdbResult<(f64, f64)> {
        if !(ratio > 0.0 && ratio <= 0.5) {
            return Err(AdbError::InvalidArgument(format!(
                "compass ratio must be in (0, 0.5], got {ratio}"
            )));
        }
        Ok(match self {
            Compass::Center => (0.5, 0.5),
            Compass::North => (0.5, 0.5 - ratio),
            Compass::South => (0.5, 0.5 + ratio),
            Compass::East => (0.5 + ratio, 0.5),
            Compass::West => (0.5 - ratio, 0.5),
        })
    }
}

/// One session per device serial (or per "any device" context), exposing
/// the wrapped adb operations.
#[derive(Debug, Clone)]
pub struct AdbDevice {
    builder: CommandBuilder,
}

impl AdbDevice {
    pub(crate) fn from_builder(builder: CommandBuilder) -> Self {
        Self { builder }
    }

    pub fn serial(&self) -> Option<&str> {
        self.builder.serial()
    }

    pub(crate) fn builder(&self) -> &CommandBuilder {
        &self.builder
    }

    /// Run a command inside the device's shell and return its output.
    pub fn shell<S: AsRef<str>>(&self, tokens: &[S]) -> AdbResult<String> {
        runner::run(&self.builder.shell(tokens))
    }

    /// [`shell`](Self::shell) with one command line split on whitespace.
    pub fn shell_line(&self, line: &str) -> AdbResult<String> {
        runner::run(&self.builder.shell_line(line))
    }

    /// Run a command against adb itself (transfer, forwarding, install...).
    pub fn direct<S: AsRef<str>>(&self, tokens: &[S]) -> AdbResult<String> {
        runner::run(&self.builder.direct(tokens))
    }

    /// Alias for [`direct`](Self::direct), kept for parity with the
    /// historical `no_shell` name. No behavioral difference.
    pub fn no_shell<S: AsRef<str>>(&self, tokens: &[S]) -> AdbResult<String> {
        self.direct(tokens)
    }

    // ---- file transfer ----

    pub fn push(&self, local: &str, remote: &str) -> AdbResult<String> {
        self.direct(&["push", local, remote])
    }

    pub fn pull(&self, remote: &str, local: &str) -> AdbResult<String> {
        self.direct(&["pull", remote, local])
    }

    // ---- processes ----

    pub fn list_processes(&self) -> AdbResult<Vec<ProcessRecord>> {
        let output = self.shell(&["ps"])?;
        Ok(parse_ps(&output))
    }

    /// Kill the first listed process whose name contains `name` as a
    /// substring. A miss is reported as `Ok(None)`, not an error.
    /// First-match semantics are deliberate; there is no best-match logic.
    pub fn kill_process_by_name(&self, name: &str, signal: Option<i32>) -> AdbResult<Option<u32>> {
        let target = self
            .list_processes()?
            .into_iter()
            .find(|record| record.name.contains(name));
        let Some(record) = target else {
            info!(name, "no matching process found to kill");
            return Ok(None);
        };
        let pid = record.pid.to_string();
        match signal {
            Some(signal) => self.shell(&["kill", &format!("-{signal}"), &pid])?,
            None => self.shell(&["kill", &pid])?,
        };
        Ok(Some(record.pid))
    }

    // ---- display ----

    pub fn screen_size(&self) -> AdbResult<(u32, u32)> {
        let output = self.shell(&["wm", "size"])?;
        parse_screen_size(&output)
    }

    /// Single property value, trimmed.
    pub fn getprop(&self, name: &str) -> AdbResult<String> {
        Ok(self.shell(&["getprop", name])?.trim().to_string())
    }

    /// The whole property dump as a map; unparseable lines are logged and
    /// skipped.
    pub fn getprop_all(&self) -> AdbResult<HashMap<String, String>> {
        let output = self.shell(&["getprop"])?;
        Ok(parse_getprop_map(&output))
    }

    // ---- port forwarding ----

    pub fn list_forwards(&self) -> AdbResult<Vec<Vec<String>>> {
        let output = self.direct(&["forward", "--list"])?;
        Ok(parse_token_rows(&output))
    }

    pub fn list_reverses(&self) -> AdbResult<Vec<Vec<String>>> {
        let output = self.direct(&["reverse", "--list"])?;
        Ok(parse_token_rows(&output))
    }

    pub fn forward(&self, local: &str, remote: &str, rebind: bool) -> AdbResult<String> {
        if rebind {
            self.direct(&["forward", local, remote])
        } else {
            self.direct(&["forward", "--no-rebind", local, remote])
        }
    }

    pub fn remove_forward(&self, local: &str) -> AdbResult<String> {
        self.direct(&["forward", "--remove", local])
    }

    pub fn reverse(&self, remote: &str, local: &str) -> AdbResult<String> {
        self.direct(&["reverse", remote, local])
    }

    pub fn remove_reverse(&self, remote: &str) -> AdbResult<String> {
        self.direct(&["reverse", "--remove", remote])
    }

    // ---- packages ----

    pub fn list_packages(&self) -> AdbResult<Vec<String>> {
        let output = self.shell(&["pm", "list", "packages"])?;
        Ok(parse_package_list(&output))
    }

    /// Exact-name membership test against a fresh package listing.
    pub fn is_package_installed(&self, name: &str) -> AdbResult<bool> {
        Ok(self.list_packages()?.iter().any(|package| package == name))
    }

    pub fn install(&self, apk_path: &str) -> AdbResult<String> {
        self.direct(&["install", "-r", apk_path])
    }

    pub fn uninstall(&self, package: &str) -> AdbResult<String> {
        self.direct(&["uninstall", package])
    }

    pub fn force_stop(&self, package: &str) -> AdbResult<String> {
        self.shell(&["am", "force-stop", package])
    }

    /// The currently focused `(package, activity)` pair. A device with no
    /// focused window yields [`AdbError::StateUnavailable`].
    pub fn current_app(&self) -> AdbResult<(String, String)> {
        let output = self.shell(&["dumpsys", "window", "windows"])?;
        parse_focused_app(&output)
    }

    // ---- input ----

    pub fn tap(&self, x: u32, y: u32) -> AdbResult<String> {
        self.shell(&["input", "tap", &x.to_string(), &y.to_string()])
    }

    pub fn swipe(
        &self,
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        duration_ms: Option<u32>,
    ) -> AdbResult<String> {
        let mut tokens = vec![
            "input".to_string(),
            "swipe".to_string(),
            x1.to_string(),
            y1.to_string(),
            x2.to_string(),
            y2.to_string(),
        ];
        if let Some(duration) = duration_ms {
            tokens.push(duration.to_string());
        }
        self.shell(&tokens)
    }

    /// Tap a normalized (0–1) coordinate pair scaled by the current screen
    /// size.
    pub fn tap_ratio(&self, rx: f64, ry: f64) -> AdbResult<String> {
        let size = self.screen_size()?;
        let (x, y) = ratio_to_pixels(rx, ry, size)?;
        self.tap(x, y)
    }

    pub fn swipe_ratio(
        &self,
        from: (f64, f64),
        to: (f64, f64),
        duration_ms: Option<u32>,
    ) -> AdbResult<String> {
        let size = self.screen_size()?;
        let (x1, y1) = ratio_to_pixels(from.0, from.1, size)?;
        let (x2, y2) = ratio_to_pixels(to.0, to.1, size)?;
        self.swipe(x1, y1, x2, y2, duration_ms)
    }

    pub fn tap_compass(&self, direction: Compass, ratio: f64) -> AdbResult<String> {
        let (rx, ry) = direction.point(ratio)?;
        self.tap_ratio(rx, ry)
    }

    pub fn swipe_compass(
        &self,
        from: Compass,
        to: Compass,
        ratio: f64,
        duration_ms: Option<u32>,
    ) -> AdbResult<String> {
        let from = from.point(ratio)?;
        let to = to.point(ratio)?;
        self.swipe_ratio(from, to, duration_ms)
    }

    pub fn input_text(&self, text: &str) -> AdbResult<String> {
        self.shell(&["input", "text", text])
    }

    pub fn keyevent(&self, key: &str) -> AdbResult<String> {
        self.shell(&["input", "keyevent", key])
    }

    // ---- capture ----

    /// Raw PNG bytes straight from `exec-out screencap -p`.
    pub fn screencap_png(&self) -> AdbResult<Vec<u8>> {
        runner::run_raw(&self.builder.direct(&["exec-out", "screencap", "-p"]))
    }

    /// Capture a screenshot on the device and pull it to `local_path`.
    /// The temporary device-side file is removed best-effort.
    pub fn screencap(&self, local_path: &str) -> AdbResult<String> {
        let remote = format!(
            "/data/local/tmp/screencap_{}.png",
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        self.shell(&["screencap", "-p", &remote])?;
        let result = self.pull(&remote, local_path);
        let _ = self.shell(&["rm", "-f", &remote]);
        result
    }

    /// Start a background screen recording; see [`ScreenRecording`].
    pub fn start_recording(&self, options: &RecordOptions) -> AdbResult<ScreenRecording> {
        ScreenRecording::start(self.clone(), options)
    }

    pub fn reboot(&self) -> AdbResult<String> {
        self.direct(&["reboot"])
    }
}

/// Scale a normalized (0–1) coordinate pair onto a pixel grid.
pub fn ratio_to_pixels(rx: f64, ry: f64, (width, height): (u32, u32)) -> AdbResult<(u32, u32)> {
    for ratio in [rx, ry] {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(AdbError::InvalidArgument(format!(
                "coordinate ratio must be in [0, 1], got {ratio}"
            )));
        }
    }
    let x = (rx * f64::from(width)).round() as u32;
    let y = (ry * f64::from(height)).round() as u32;
    Ok((x.min(width.saturating_sub(1)), y.min(height.saturating_sub(1))))
}
