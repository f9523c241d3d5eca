use super::ConfigError;
use crate::preprocessing::crs::EpsgCode;
use crate::shared::serde_ext::scalar_string;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_download_timeout_secs() -> u64 {
    600
}

fn default_poll_interval_ms() -> u64 {
    50
}

/// Host-side settings shared by every algorithm execution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendSettings {
    /// Host directory mounted into tool containers; all intermediate files
    /// and results live here.
    pub work_dir: PathBuf,
    pub tool_config_dir: PathBuf,
    /// Reference CRS every vector and raster input is brought into.
    #[serde(deserialize_with = "scalar_string")]
    pub epsg: String,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    /// Basic-auth credentials for product downloads; set both or neither.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl BackendSettings {
    pub fn new(work_dir: impl Into<PathBuf>, tool_config_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            tool_config_dir: tool_config_dir.into(),
            epsg: "EPSG:4326".to_string(),
            download_timeout_secs: default_download_timeout_secs(),
            username: None,
            password: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    pub fn with_epsg(mut self, epsg: impl Into<String>) -> Self {
        self.epsg = epsg.into();
        self
    }

    /// Download credentials when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.work_dir.is_absolute() {
            return Err(ConfigError::Settings(
                "`work_dir` must be an absolute path".to_string(),
            ));
        }
        if self.tool_config_dir.as_os_str().is_empty() {
            return Err(ConfigError::Settings(
                "`tool_config_dir` must be non-empty".to_string(),
            ));
        }
        EpsgCode::parse(&self.epsg)
            .map_err(|err| ConfigError::Settings(format!("`epsg` is invalid: {err}")))?;
        if self.username.is_some() != self.password.is_some() {
            return Err(ConfigError::Settings(
                "`username` and `password` must be set together".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Settings(
                "`poll_interval_ms` must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_parse_with_defaults() {
        let settings: BackendSettings = serde_yaml::from_str(
            r#"
work_dir: /srv/eo/work
tool_config_dir: /srv/eo/tools
epsg: 32632
"#,
        )
        .expect("parse settings");

        assert_eq!(settings.epsg, "32632");
        assert_eq!(settings.download_timeout_secs, 600);
        assert!(settings.credentials().is_none());
        settings.validate().expect("valid");
    }

    #[test]
    fn relative_work_dir_is_rejected() {
        let settings = BackendSettings::new("work", "/srv/eo/tools");
        let err = settings.validate().expect_err("relative work dir");
        assert!(err.to_string().contains("work_dir"));
    }

    #[test]
    fn download_credentials_come_in_pairs() {
        let mut settings = BackendSettings::new("/srv/eo/work", "/srv/eo/tools");
        settings.username = Some("hub-user".to_string());
        let err = settings.validate().expect_err("password missing");
        assert!(err.to_string().contains("password"));

        settings.password = Some("s3cret".to_string());
        settings.validate().expect("valid pair");
        assert_eq!(settings.credentials(), Some(("hub-user", "s3cret")));
    }

    #[test]
    fn unparseable_epsg_is_rejected() {
        let settings = BackendSettings::new("/srv/eo/work", "/srv/eo/tools").with_epsg("wgs84");
        let err = settings.validate().expect_err("bad epsg");
        assert!(err.to_string().contains("epsg"));
    }
}
