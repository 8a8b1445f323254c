use std::path::Path;

/// Environment variable consulted when no explicit adb path is given.
pub const ADB_ENV_VAR: &str = "MINADB_ADB";

pub fn normalize_program_path(value: &str) -> String {
    let trimmed = value.trim();
    if let Some(inner) = trimmed
        .strip_prefix('"')
        .and_then(|candidate| candidate.strip_suffix('"'))
    {
        return inner.trim().to_string();
    }
    if let Some(inner) = trimmed
        .strip_prefix('\'')
        .and_then(|candidate| candidate.strip_suffix('\''))
    {
        return inner.trim().to_string();
    }
    trimmed.to_string()
}

/// Resolve the adb program to invoke: explicit path, then `MINADB_ADB`,
/// then plain `adb` from PATH.
pub fn resolve_adb_program(explicit: Option<&str>) -> String {
    if let Some(value) = explicit {
        let normalized = normalize_program_path(value);
        if !normalized.is_empty() {
            return normalized;
        }
    }
    if let Ok(value) = std::env::var(ADB_ENV_VAR) {
        let normalized = normalize_program_path(&value);
        if !normalized.is_empty() {
            return normalized;
        }
    }
    "adb".to_string()
}

pub fn validate_adb_program(program: &str) -> Result<(), String> {
    if program.trim().is_empty() {
        return Err("adb command is empty".to_string());
    }
    if !program.contains('/') && !program.contains('\\') {
        // Bare command name; PATH lookup happens at spawn time.
        return Ok(());
    }
    let path = Path::new(program);
    if path.is_dir() {
        return Err("adb path must point to an executable file".to_string());
    }
    if !path.exists() {
        return Err("adb executable not found at the configured path".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_unwraps_quoted_paths() {
        assert_eq!(
            normalize_program_path(" \"/sdk/platform-tools/adb\" "),
            "/sdk/platform-tools/adb"
        );
        assert_eq!(
            normalize_program_path("'/sdk/platform-tools/adb'"),
            "/sdk/platform-tools/adb"
        );
        assert_eq!(normalize_program_path("\tadb  "), "adb");
    }

    #[test]
    fn resolution_order_is_explicit_then_env_then_path_default() {
        // The environment is process-global, so every env-sensitive case
        // lives in this one test.
        std::env::set_var(ADB_ENV_VAR, "/from/env/adb");
        assert_eq!(resolve_adb_program(None), "/from/env/adb");
        // An explicit path beats the variable.
        assert_eq!(resolve_adb_program(Some("/explicit/adb")), "/explicit/adb");
        // A blank explicit value falls through to the variable.
        assert_eq!(resolve_adb_program(Some("   ")), "/from/env/adb");
        // Quote wrapping is normalized on the env tier too.
        std::env::set_var(ADB_ENV_VAR, "\"/quoted env/adb\"");
        assert_eq!(resolve_adb_program(None), "/quoted env/adb");
        // A blank variable falls through to the PATH default.
        std::env::set_var(ADB_ENV_VAR, "   ");
        assert_eq!(resolve_adb_program(None), "adb");
        std::env::remove_var(ADB_ENV_VAR);
        assert_eq!(resolve_adb_program(None), "adb");
        assert_eq!(resolve_adb_program(Some("")), "adb");
    }

    #[test]
    fn validation_requires_an_existing_executable_file() {
        assert!(validate_adb_program("").is_err());
        let err = validate_adb_program("/no/such/dir/adb").unwrap_err();
        assert!(err.contains("not found"));
        let err = validate_adb_program("/").unwrap_err();
        assert!(err.contains("executable file"));
    }

    #[test]
    fn bare_command_names_skip_filesystem_checks() {
        // PATH lookup happens at spawn time, so a bare name passes even
        // though no file named "adb" exists in the working directory.
        assert!(validate_adb_program("adb").is_ok());
        assert!(validate_adb_program("adb-custom").is_ok());
    }
}
