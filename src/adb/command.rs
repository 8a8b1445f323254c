/// Builds full adb argument vectors for one target device.
///
/// Distinguishes "shell" commands (run inside the device) from "direct"
/// commands (run against adb itself, e.g. `push`/`pull`/`forward`).
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
    serial: Option<String>,
}

impl CommandBuilder {
    /// An empty serial means "the bridge's default target" and is treated
    /// the same as `None`.
    pub fn new(program: impl Into<String>, serial: Option<&str>) -> Self {
        let serial = serial
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Self {
            program: program.into(),
            serial,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// `[program, (-s serial)?, "shell", tokens...]`
    pub fn shell<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        let mut argv = self.base();
        argv.push("shell".to_string());
        argv.extend(tokens.iter().map(|token| token.as_ref().to_string()));
        argv
    }

    /// `[program, (-s serial)?, tokens...]`
    pub fn direct<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        let mut argv = self.base();
        argv.extend(tokens.iter().map(|token| token.as_ref().to_string()));
        argv
    }

    /// [`shell`](Self::shell) with a single command line split on whitespace.
    pub fn shell_line(&self, line: &str) -> Vec<String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        self.shell(&tokens)
    }

    /// [`direct`](Self::direct) with a single command line split on whitespace.
    pub fn direct_line(&self, line: &str) -> Vec<String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        self.direct(&tokens)
    }

    fn base(&self) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        if let Some(serial) = &self.serial {
            argv.push("-s".to_string());
            argv.push(serial.clone());
        }
        argv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_s_flags(argv: &[String]) -> usize {
        argv.iter().filter(|token| token.as_str() == "-s").count()
    }

    #[test]
    fn shell_with_serial_inserts_flag_exactly_once() {
        let builder = CommandBuilder::new("adb", Some("123456E"));
        let argv = builder.shell(&["wm", "size"]);
        assert_eq!(argv, vec!["adb", "-s", "123456E", "shell", "wm", "size"]);
        assert_eq!(count_s_flags(&argv), 1);
        let position = argv.iter().position(|token| token == "-s").unwrap();
        assert_eq!(argv[position + 1], "123456E");
    }

    #[test]
    fn direct_with_serial_inserts_flag_exactly_once() {
        let builder = CommandBuilder::new("adb", Some("123456E"));
        let argv = builder.direct(&["pull", "/sdcard/a.mp4", "a.mp4"]);
        assert_eq!(
            argv,
            vec!["adb", "-s", "123456E", "pull", "/sdcard/a.mp4", "a.mp4"]
        );
        assert_eq!(count_s_flags(&argv), 1);
    }

    #[test]
    fn missing_serial_leaves_no_dangling_flag() {
        let builder = CommandBuilder::new("adb", None);
        assert_eq!(builder.shell(&["ps"]), vec!["adb", "shell", "ps"]);
        assert_eq!(count_s_flags(&builder.direct(&["devices"])), 0);
    }

    #[test]
    fn empty_serial_is_treated_as_absent() {
        let builder = CommandBuilder::new("adb", Some("   "));
        assert_eq!(builder.serial(), None);
        assert_eq!(count_s_flags(&builder.shell(&["ps"])), 0);
    }

    #[test]
    fn shell_line_splits_on_whitespace() {
        let builder = CommandBuilder::new("adb", Some("X"));
        assert_eq!(
            builder.shell_line("input tap  100 200"),
            vec!["adb", "-s", "X", "shell", "input", "tap", "100", "200"]
        );
    }
}
