use crate::config::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_STATE_DIR: &str = ".eoexec";
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";
pub const SETTINGS_ENV_VAR: &str = "EOEXEC_SETTINGS";

/// `$EOEXEC_SETTINGS` when set, else `$HOME/.eoexec/settings.yaml`.
pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    if let Some(explicit) = std::env::var_os(SETTINGS_ENV_VAR) {
        if !explicit.is_empty() {
            return Ok(PathBuf::from(explicit));
        }
    }
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home)
        .join(DEFAULT_STATE_DIR)
        .join(SETTINGS_FILE_NAME))
}
