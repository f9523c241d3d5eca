pub mod error;
pub mod load;
pub mod paths;
pub mod settings;
pub mod tool_descriptor;
pub mod tool_registry;

pub use error::ConfigError;
pub use load::load_settings;
pub use paths::{
    default_settings_path, DEFAULT_STATE_DIR, SETTINGS_ENV_VAR, SETTINGS_FILE_NAME,
};
pub use settings::BackendSettings;
pub use tool_descriptor::{
    ArgumentDescriptor, ArgumentKind, CommandSection, DockerSection, ExecutionKind, Quantity,
    ToolDescriptor, ToolParameters,
};
pub use tool_registry::ToolRegistry;
