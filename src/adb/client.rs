use crate::adb::command::CommandBuilder;
use crate::adb::device::AdbDevice;
use crate::adb::locator::resolve_adb_program;
use crate::adb::parse::parse_devices;
use crate::adb::runner;
use crate::error::AdbResult;
use crate::models::DeviceEntry;

/// Non-device-scoped adb client: device discovery plus server lifecycle.
#[derive(Debug, Clone)]
pub struct AdbClient {
    program: String,
}

impl Default for AdbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AdbClient {
    /// Resolve the adb binary from `MINADB_ADB` or PATH.
    pub fn new() -> Self {
        Self {
            program: resolve_adb_program(None),
        }
    }

    /// Use an explicit adb binary instead of the resolved default.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Bind a device session. `None` targets adb's default device.
    pub fn device(&self, serial: Option<&str>) -> AdbDevice {
        AdbDevice::from_builder(CommandBuilder::new(self.program.clone(), serial))
    }

    /// List every attached device, fresh from `adb devices`.
    pub fn devices(&self) -> AdbResult<Vec<DeviceEntry>> {
        let output = runner::run(&[self.program.clone(), "devices".to_string()])?;
        Ok(parse_devices(&output))
    }

    /// Devices whose state is the ready literal (`device`).
    pub fn available_devices(&self) -> AdbResult<Vec<DeviceEntry>> {
        Ok(self
            .devices()?
            .into_iter()
            .filter(DeviceEntry::is_available)
            .collect())
    }

    pub fn is_device_available(&self, serial: &str) -> AdbResult<bool> {
        Ok(self
            .available_devices()?
            .iter()
            .any(|entry| entry.serial == serial))
    }

    pub fn kill_server(&self) -> AdbResult<String> {
        runner::run(&[self.program.clone(), "kill-server".to_string()])
    }

    pub fn start_server(&self) -> AdbResult<String> {
        runner::run(&[self.program.clone(), "start-server".to_string()])
    }

    /// Stop then start the adb daemon. No atomicity: if the stop succeeds
    /// and the start fails, no daemon is left running and the start error
    /// propagates.
    pub fn restart_server(&self) -> AdbResult<String> {
        self.kill_server()?;
        self.start_server()
    }
}
