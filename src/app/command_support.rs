use crate::command::{CommandValue, HostPlatform};
use crate::config::{default_settings_path, load_settings, BackendSettings, ConfigError};
use crate::orchestration::algorithms::DescriptorAlgorithm;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

/// Parsed form of `<tool.yml> [options] [KEY=VALUE ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolArgs {
    pub tool_path: PathBuf,
    pub settings_path: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub platform: Option<HostPlatform>,
    pub bindings: BTreeMap<String, CommandValue>,
}

impl ToolArgs {
    pub fn parse(args: &[String], usage: &str) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut tool_path = None;
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut option_value = |name: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("`{name}` requires a value. usage: {usage}"))
            };
            match arg.as_str() {
                "--settings" => parsed.settings_path = Some(option_value("--settings")?.into()),
                "--work-dir" => parsed.work_dir = Some(option_value("--work-dir")?.into()),
                "--platform" => {
                    parsed.platform = Some(match option_value("--platform")?.as_str() {
                        "posix" => HostPlatform::Posix,
                        "windows" => HostPlatform::Windows,
                        other => {
                            return Err(format!(
                                "unknown platform `{other}`, expected posix or windows"
                            ))
                        }
                    })
                }
                other if other.starts_with("--") => {
                    return Err(format!("unknown option `{other}`. usage: {usage}"))
                }
                other if other.contains('=') => {
                    let (key, value) = DescriptorAlgorithm::parse_binding(other)?;
                    parsed.bindings.insert(key, value);
                }
                other => {
                    if tool_path.is_some() {
                        return Err(format!("unexpected argument `{other}`. usage: {usage}"));
                    }
                    tool_path = Some(PathBuf::from(other));
                }
            }
        }
        parsed.tool_path = tool_path.ok_or_else(|| format!("usage: {usage}"))?;
        Ok(parsed)
    }

    /// File name of the descriptor inside its directory.
    pub fn tool_file_name(&self) -> Result<String, String> {
        self.tool_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| format!("`{}` is not a file path", self.tool_path.display()))
    }

    fn tool_dir(&self) -> Result<PathBuf, String> {
        let parent = match self.tool_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        absolute(&parent)
    }

    /// Settings from `--settings`, else the default settings file when it
    /// exists, else defaults rooted at the current directory. `--work-dir`
    /// overrides the work directory of whichever source won, and the tool
    /// config directory always becomes the descriptor's own directory.
    pub fn resolve_settings(&self) -> Result<BackendSettings, String> {
        let mut settings = match &self.settings_path {
            Some(path) => load_settings(Some(path)).map_err(map_config_err)?,
            None => match default_settings_path() {
                Ok(path) if path.is_file() => load_settings(Some(&path)).map_err(map_config_err)?,
                _ => {
                    let cwd = std::env::current_dir()
                        .map_err(|e| format!("failed to read current directory: {e}"))?;
                    BackendSettings::new(cwd, PathBuf::new())
                }
            },
        };
        if let Some(dir) = &self.work_dir {
            settings.work_dir = absolute(dir)?;
        }
        settings.tool_config_dir = self.tool_dir()?;
        settings.validate().map_err(map_config_err)?;
        Ok(settings)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| format!("failed to read current directory: {e}"))
}
