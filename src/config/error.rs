#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("settings validation failed: {0}")]
    Settings(String),
    #[error("tool descriptor `{tool}` is invalid: {reason}")]
    Descriptor { tool: String, reason: String },
    #[error("tool descriptor `{name}` not found in {dir}")]
    UnknownTool { name: String, dir: String },
    #[error("failed to resolve home directory for settings path")]
    HomeDirectoryUnavailable,
}
