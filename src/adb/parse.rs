use std::collections::HashMap;

use regex::Regex;
use tracing::warn;

use crate::error::{AdbError, AdbResult};
use crate::models::{DeviceEntry, ProcessRecord};

pub fn parse_devices(output: &str) -> Vec<DeviceEntry> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim_start().starts_with('*'))
        .filter(|line| !line.to_lowercase().contains("list of devices"))
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 2 {
                return None;
            }
            Some(DeviceEntry {
                serial: tokens[0].to_string(),
                state: tokens[1].to_string(),
            })
        })
        .collect()
}

/// Parse `adb shell ps` output.
///
/// The first line is the column header and is dropped. Rows that do not
/// carry at least the nine toybox columns, or whose pid/ppid are not
/// numeric, are skipped with a warning rather than failing the listing;
/// the trailing NAME column is ragged on some builds and is re-joined from
/// every remaining token.
pub fn parse_ps(output: &str) -> Vec<ProcessRecord> {
    output
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 9 {
                warn!(line, "skipping short ps row");
                return None;
            }
            let (Ok(pid), Ok(ppid)) = (tokens[1].parse::<u32>(), tokens[2].parse::<u32>())
            else {
                warn!(line, "skipping ps row with non-numeric pid");
                return None;
            };
            Some(ProcessRecord {
                user: tokens[0].to_string(),
                pid,
                ppid,
                vsize: tokens[3].to_string(),
                rss: tokens[4].to_string(),
                wchan: tokens[5].to_string(),
                addr: tokens[6].to_string(),
                state: tokens[7].to_string(),
                name: tokens[8..].join(" "),
            })
        })
        .collect()
}

/// Extract `(width, height)` from `wm size` output: the last whitespace
/// token must have the `NxM` shape.
pub fn parse_screen_size(output: &str) -> AdbResult<(u32, u32)> {
    let token = output
        .split_whitespace()
        .last()
        .ok_or_else(|| AdbError::Parse("empty wm size output".to_string()))?;
    let (width, height) = token
        .split_once('x')
        .ok_or_else(|| AdbError::Parse(format!("no NxM size token in {token:?}")))?;
    let width = width
        .parse::<u32>()
        .map_err(|_| AdbError::Parse(format!("bad width in {token:?}")))?;
    let height = height
        .parse::<u32>()
        .map_err(|_| AdbError::Parse(format!("bad height in {token:?}")))?;
    Ok((width, height))
}

/// Parse full `getprop` output into a key/value map. Lines that do not
/// split into a `[key]: [value]` pair warn and are skipped.
pub fn parse_getprop_map(output: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some((key_part, value_part)) = trimmed.split_once("]: [") else {
            warn!(line = trimmed, "skipping unparseable getprop line");
            continue;
        };
        let key = key_part.trim_start_matches('[').trim();
        let value = value_part.trim_end_matches(']').trim();
        if key.is_empty() {
            warn!(line = trimmed, "skipping getprop line with empty key");
            continue;
        }
        map.insert(key.to_string(), value.to_string());
    }
    map
}

/// Split forward/reverse listing output into ordered token rows. Empty
/// lines are dropped; no further validation happens here.
pub fn parse_token_rows(output: &str) -> Vec<Vec<String>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect()
}

/// Find the focused `package/activity` pair in `dumpsys window windows`
/// output. A device with no focused window is a legitimate state and maps
/// to [`AdbError::StateUnavailable`].
pub fn parse_focused_app(output: &str) -> AdbResult<(String, String)> {
    let marker = Regex::new(
        r"m(?:CurrentFocus|FocusedApp).*?([A-Za-z][A-Za-z0-9_.]*)/([A-Za-z0-9_.$]+)",
    )
    .unwrap();
    for line in output.lines() {
        if let Some(caps) = marker.captures(line) {
            return Ok((caps[1].to_string(), caps[2].to_string()));
        }
    }
    Err(AdbError::StateUnavailable(
        "no focused window reported by dumpsys".to_string(),
    ))
}

/// Parse `pm list packages` output into bare package names.
pub fn parse_package_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }
            let name = trimmed.strip_prefix("package:").unwrap_or(trimmed);
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        })
        .collect()
}
