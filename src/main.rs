use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use minadb::adb::locator::{resolve_adb_program, validate_adb_program};
use minadb::logging::init_logging;
use minadb::{AdbClient, AdbError, AdbResult, Compass, RecordOptions};

#[derive(Parser)]
#[command(name = "minadb", version, about = "Minimal typed wrapper around the adb binary")]
struct Cli {
    /// Target device serial; omit when only one device is attached.
    #[arg(short = 's', long, global = true)]
    serial: Option<String>,

    /// Path to the adb binary (defaults to MINADB_ADB, then PATH).
    #[arg(long, global = true)]
    adb: Option<String>,

    /// Print structured results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// One variant per exposed operation; dispatch is this closed mapping, no
/// name-based lookup.
#[derive(Subcommand)]
enum Command {
    /// List attached devices and their states.
    Devices,
    /// List only devices in the ready state.
    AvailableDevices,
    /// Run a command inside the device shell.
    Shell {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// Run a command against adb itself.
    #[command(visible_alias = "no-shell")]
    Direct {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// Copy a local file to the device.
    Push { local: String, remote: String },
    /// Copy a device file to the host.
    Pull { remote: String, local: String },
    /// List device processes.
    Ps,
    /// Kill the first process whose name contains the given substring.
    KillByName {
        name: String,
        #[arg(long)]
        signal: Option<i32>,
    },
    /// Report the physical screen size.
    ScreenSize,
    /// Read one property, or dump all properties when no name is given.
    Getprop { name: Option<String> },
    /// List forward rules.
    Forwards,
    /// List reverse rules.
    Reverses,
    /// Create a forward rule.
    Forward {
        local: String,
        remote: String,
        /// Fail instead of rebinding an existing rule.
        #[arg(long)]
        no_rebind: bool,
    },
    /// Remove a forward rule.
    RemoveForward { local: String },
    /// Create a reverse rule.
    Reverse { remote: String, local: String },
    /// Remove a reverse rule.
    RemoveReverse { remote: String },
    /// List installed packages.
    Packages,
    /// Check whether a package is installed.
    IsInstalled { name: String },
    /// Report the focused package/activity pair.
    CurrentApp,
    /// Tap a pixel coordinate.
    Tap { x: u32, y: u32 },
    /// Swipe between pixel coordinates.
    Swipe {
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        #[arg(long)]
        duration_ms: Option<u32>,
    },
    /// Tap a normalized (0-1) coordinate.
    TapRatio { rx: f64, ry: f64 },
    /// Swipe between normalized (0-1) coordinates.
    SwipeRatio {
        rx1: f64,
        ry1: f64,
        rx2: f64,
        ry2: f64,
        #[arg(long)]
        duration_ms: Option<u32>,
    },
    /// Swipe between compass presets offset from the screen center.
    SwipeCompass {
        #[arg(value_parser = parse_compass)]
        from: Compass,
        #[arg(value_parser = parse_compass)]
        to: Compass,
        /// Offset from center, in (0, 0.5].
        #[arg(long, default_value_t = 0.25)]
        ratio: f64,
        #[arg(long)]
        duration_ms: Option<u32>,
    },
    /// Type text on the device.
    Text { text: String },
    /// Send a keyevent (name or code).
    Keyevent { key: String },
    /// Capture a screenshot and pull it to a local path.
    Screencap { local: String },
    /// Install an APK.
    Install { apk: String },
    /// Uninstall a package.
    Uninstall { package: String },
    /// Force-stop a package.
    ForceStop { package: String },
    /// Reboot the device.
    Reboot,
    /// Record the screen for a fixed duration, then pull the video.
    Record {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "")]
        bit_rate: String,
        /// Device-side recording cap in seconds; 0 keeps the device default.
        #[arg(long, default_value_t = 0)]
        time_limit: u32,
        #[arg(long, default_value = "")]
        size: String,
    },
    /// Stop the adb daemon.
    KillServer,
    /// Start the adb daemon.
    StartServer,
    /// Stop then start the adb daemon.
    RestartServer,
}

fn parse_compass(value: &str) -> Result<Compass, String> {
    match value.to_lowercase().as_str() {
        "center" => Ok(Compass::Center),
        "north" => Ok(Compass::North),
        "south" => Ok(Compass::South),
        "east" => Ok(Compass::East),
        "west" => Ok(Compass::West),
        other => Err(format!(
            "unknown direction '{other}'; expected center/north/south/east/west"
        )),
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let program = resolve_adb_program(cli.adb.as_deref());
    if let Err(message) = validate_adb_program(&program) {
        eprintln!("error: {message}");
        std::process::exit(2);
    }

    if let Err(err) = dispatch(&cli, &program) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn dispatch(cli: &Cli, program: &str) -> AdbResult<()> {
    let client = AdbClient::with_program(program);
    let device = client.device(cli.serial.as_deref());

    match &cli.command {
        Command::Devices => emit(cli.json, &client.devices()?, |entries| {
            entries
                .iter()
                .map(|entry| format!("{}\t{}", entry.serial, entry.state))
                .collect::<Vec<_>>()
                .join("\n")
        }),
        Command::AvailableDevices => emit(cli.json, &client.available_devices()?, |entries| {
            entries
                .iter()
                .map(|entry| entry.serial.clone())
                .collect::<Vec<_>>()
                .join("\n")
        }),
        Command::Shell { args } => print_raw(&device.shell(args)?),
        Command::Direct { args } => print_raw(&device.direct(args)?),
        Command::Push { local, remote } => print_raw(&device.push(local, remote)?),
        Command::Pull { remote, local } => print_raw(&device.pull(remote, local)?),
        Command::Ps => emit(cli.json, &device.list_processes()?, |records| {
            records
                .iter()
                .map(|record| format!("{}\t{}\t{}", record.pid, record.user, record.name))
                .collect::<Vec<_>>()
                .join("\n")
        }),
        Command::KillByName { name, signal } => {
            match device.kill_process_by_name(name, *signal)? {
                Some(pid) => println!("killed {pid}"),
                None => println!("not found"),
            }
            Ok(())
        }
        Command::ScreenSize => {
            let size = device.screen_size()?;
            emit(cli.json, &size, |(width, height)| format!("{width}x{height}"))
        }
        Command::Getprop { name } => match name {
            Some(name) => print_raw(&device.getprop(name)?),
            None => {
                let map = device.getprop_all()?;
                emit(cli.json, &map, |map| {
                    let mut keys: Vec<_> = map.keys().collect();
                    keys.sort();
                    keys.iter()
                        .map(|key| format!("{key}={}", map[*key]))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
            }
        },
        Command::Forwards => emit(cli.json, &device.list_forwards()?, format_rows),
        Command::Reverses => emit(cli.json, &device.list_reverses()?, format_rows),
        Command::Forward {
            local,
            remote,
            no_rebind,
        } => print_raw(&device.forward(local, remote, !no_rebind)?),
        Command::RemoveForward { local } => print_raw(&device.remove_forward(local)?),
        Command::Reverse { remote, local } => print_raw(&device.reverse(remote, local)?),
        Command::RemoveReverse { remote } => print_raw(&device.remove_reverse(remote)?),
        Command::Packages => emit(cli.json, &device.list_packages()?, |packages| {
            packages.join("\n")
        }),
        Command::IsInstalled { name } => {
            let installed = device.is_package_installed(name)?;
            emit(cli.json, &installed, |value| value.to_string())
        }
        Command::CurrentApp => {
            let (package, activity) = device.current_app()?;
            emit(cli.json, &(package.clone(), activity.clone()), |_| {
                format!("{package}/{activity}")
            })
        }
        Command::Tap { x, y } => print_raw(&device.tap(*x, *y)?),
        Command::Swipe {
            x1,
            y1,
            x2,
            y2,
            duration_ms,
        } => print_raw(&device.swipe(*x1, *y1, *x2, *y2, *duration_ms)?),
        Command::TapRatio { rx, ry } => print_raw(&device.tap_ratio(*rx, *ry)?),
        Command::SwipeRatio {
            rx1,
            ry1,
            rx2,
            ry2,
            duration_ms,
        } => print_raw(&device.swipe_ratio((*rx1, *ry1), (*rx2, *ry2), *duration_ms)?),
        Command::SwipeCompass {
            from,
            to,
            ratio,
            duration_ms,
        } => print_raw(&device.swipe_compass(*from, *to, *ratio, *duration_ms)?),
        Command::Text { text } => print_raw(&device.input_text(text)?),
        Command::Keyevent { key } => print_raw(&device.keyevent(key)?),
        Command::Screencap { local } => print_raw(&device.screencap(local)?),
        Command::Install { apk } => print_raw(&device.install(apk)?),
        Command::Uninstall { package } => print_raw(&device.uninstall(package)?),
        Command::ForceStop { package } => print_raw(&device.force_stop(package)?),
        Command::Reboot => print_raw(&device.reboot()?),
        Command::Record {
            seconds,
            output,
            bit_rate,
            time_limit,
            size,
        } => {
            let options = RecordOptions {
                bit_rate: bit_rate.clone(),
                time_limit_sec: *time_limit,
                size: size.clone(),
            };
            let mut recording = device.start_recording(&options)?;
            std::thread::sleep(Duration::from_secs(*seconds));
            print_raw(&recording.stop(output.as_deref())?)
        }
        Command::KillServer => print_raw(&client.kill_server()?),
        Command::StartServer => print_raw(&client.start_server()?),
        Command::RestartServer => print_raw(&client.restart_server()?),
    }
}

fn format_rows(rows: &Vec<Vec<String>>) -> String {
    rows.iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_raw(output: &str) -> AdbResult<()> {
    let trimmed = output.trim_end();
    if !trimmed.is_empty() {
        println!("{trimmed}");
    }
    Ok(())
}

fn emit<T: serde::Serialize>(json: bool, value: &T, plain: impl Fn(&T) -> String) -> AdbResult<()> {
    if json {
        let rendered = serde_json::to_string_pretty(value)
            .map_err(|err| AdbError::Parse(format!("failed to encode JSON output: {err}")))?;
        println!("{rendered}");
    } else {
        let rendered = plain(value);
        if !rendered.is_empty() {
            println!("{rendered}");
        }
    }
    Ok(())
}
