//! End-to-end tests against a fake `adb` shell script: the wrapper sees a
//! real subprocess with realistic output, without needing a device.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use minadb::{AdbClient, AdbError, RecordOptions};
use tempfile::TempDir;

const FAKE_ADB: &str = r#"#!/bin/sh
log="$(dirname "$0")/calls.log"
if [ "$1" = "-s" ]; then
  shift 2
fi
echo "$@" >> "$log"
case "$1" in
  devices)
    printf 'List of devices attached\n123456E\tdevice\n123456F\toffline\n'
    ;;
  shell)
    shift
    case "$1" in
      wm)
        echo "Physical size: 1080x1920"
        ;;
      ps)
        printf 'USER PID PPID VSZ RSS WCHAN ADDR S NAME\n'
        printf 'shell 4242 1 100 200 0 0 S screenrecord /data/local/tmp/clip.mp4\n'
        ;;
      getprop)
        printf '[ro.build.version]: [11]\n[bad line]\n'
        ;;
      screenrecord)
        sleep 30
        ;;
      *)
        :
        ;;
    esac
    ;;
  pull)
    : > "$3"
    echo "1 file pulled. 0.3 MB/s"
    ;;
  *)
    :
    ;;
esac
exit 0
"#;

fn install_fake_adb(script: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("adb");
    fs::write(&path, script).expect("write fake adb");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake adb");
    (dir, path)
}

fn logged_calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn lists_and_filters_devices() {
    let (_dir, adb) = install_fake_adb(FAKE_ADB);
    let client = AdbClient::with_program(adb.to_string_lossy());

    let devices = client.devices().expect("devices");
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].serial, "123456E");
    assert_eq!(devices[0].state, "device");
    assert_eq!(devices[1].state, "offline");

    let available = client.available_devices().expect("available devices");
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].serial, "123456E");

    assert!(client.is_device_available("123456E").unwrap());
    assert!(!client.is_device_available("123456F").unwrap());
}

#[test]
fn reads_screen_size_through_the_stack() {
    let (_dir, adb) = install_fake_adb(FAKE_ADB);
    let device = AdbClient::with_program(adb.to_string_lossy()).device(Some("123456E"));
    assert_eq!(device.screen_size().unwrap(), (1080, 1920));
}

#[test]
fn getprop_dump_skips_bad_lines_without_failing() {
    let (_dir, adb) = install_fake_adb(FAKE_ADB);
    let device = AdbClient::with_program(adb.to_string_lossy()).device(None);
    let map = device.getprop_all().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("ro.build.version").map(String::as_str), Some("11"));
}

#[test]
fn kill_by_name_misses_without_error() {
    let (_dir, adb) = install_fake_adb(FAKE_ADB);
    let device = AdbClient::with_program(adb.to_string_lossy()).device(None);
    assert_eq!(
        device.kill_process_by_name("definitely_absent", None).unwrap(),
        None
    );
}

#[test]
fn kill_by_name_finds_first_substring_match() {
    let (dir, adb) = install_fake_adb(FAKE_ADB);
    let device = AdbClient::with_program(adb.to_string_lossy()).device(None);
    assert_eq!(device.kill_process_by_name("screenrecord", Some(2)).unwrap(), Some(4242));
    let calls = logged_calls(dir.path());
    assert!(calls.iter().any(|call| call == "shell kill -2 4242"));
}

#[test]
fn recording_stop_is_idempotent_and_always_pulls() {
    let (dir, adb) = install_fake_adb(FAKE_ADB);
    let device = AdbClient::with_program(adb.to_string_lossy()).device(Some("123456E"));

    let mut recording = device
        .start_recording(&RecordOptions::default())
        .expect("recording should survive the grace window");
    assert!(recording.is_running());
    assert!(recording.remote_path().starts_with("/data/local/tmp/"));

    let output_path = dir.path().join("clip.mp4");
    let first = recording.stop(Some(&output_path)).expect("first stop");
    assert!(first.contains("1 file pulled"));
    assert!(output_path.exists());
    assert!(!recording.is_running());

    // Second stop on the same handle: no error, and the pull runs again.
    let second = recording.stop(Some(&output_path)).expect("second stop");
    assert!(second.contains("1 file pulled"));

    let calls = logged_calls(dir.path());
    let pulls = calls.iter().filter(|call| call.starts_with("pull ")).count();
    assert_eq!(pulls, 2);
    // The device-side name-based kill runs on every stop, not just the first.
    let kills = calls
        .iter()
        .filter(|call| call.starts_with("shell kill "))
        .count();
    assert_eq!(kills, 2);
}

#[test]
fn recording_stop_kills_every_detached_screenrecord() {
    // A detach can leave more than one screenrecord process behind; the
    // fallback kill must signal all of them, not just the first match.
    let script = FAKE_ADB.replace(
        "printf 'shell 4242 1 100 200 0 0 S screenrecord /data/local/tmp/clip.mp4\\n'",
        "printf 'shell 4242 1 100 200 0 0 S screenrecord /data/local/tmp/clip.mp4\\n'\n        printf 'shell 4243 1 100 200 0 0 S screenrecord /data/local/tmp/clip.mp4\\n'",
    );
    let (dir, adb) = install_fake_adb(&script);
    let device = AdbClient::with_program(adb.to_string_lossy()).device(Some("123456E"));

    let mut recording = device
        .start_recording(&RecordOptions::default())
        .expect("recording should survive the grace window");
    let output_path = dir.path().join("clip.mp4");
    recording.stop(Some(&output_path)).expect("stop");

    let calls = logged_calls(dir.path());
    assert!(calls.iter().any(|call| call == "shell kill -2 4242"));
    assert!(calls.iter().any(|call| call == "shell kill -2 4243"));
}

#[test]
fn recording_start_fails_fast_when_capture_exits() {
    let script = FAKE_ADB.replace("sleep 30", "exit 1");
    let (_dir, adb) = install_fake_adb(&script);
    let device = AdbClient::with_program(adb.to_string_lossy()).device(Some("123456E"));
    let err = device.start_recording(&RecordOptions::default()).unwrap_err();
    assert!(matches!(err, AdbError::RecordingStart { .. }));
}

#[test]
fn nonzero_exit_carries_adb_output() {
    let script = "#!/bin/sh\necho 'error: device offline' 1>&2\nexit 1\n";
    let (_dir, adb) = install_fake_adb(script);
    let client = AdbClient::with_program(adb.to_string_lossy());
    let err = client.devices().unwrap_err();
    match err {
        AdbError::CommandFailed { output, .. } => assert!(output.contains("device offline")),
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}
