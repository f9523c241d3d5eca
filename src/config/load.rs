use super::{default_settings_path, BackendSettings, ConfigError};
use std::path::Path;
use tracing::info;

/// Loads and validates backend settings from `path`, or from the default
/// location when no path is given.
pub fn load_settings(path: Option<&Path>) -> Result<BackendSettings, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_settings_path()?,
    };
    let settings = BackendSettings::from_path(&path)?;
    settings.validate()?;
    info!(
        settings = %path.display(),
        work_dir = %settings.work_dir.display(),
        tool_config_dir = %settings.tool_config_dir.display(),
        epsg = %settings.epsg,
        "loaded backend settings"
    );
    Ok(settings)
}
