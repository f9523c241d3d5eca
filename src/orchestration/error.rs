use crate::command::MaterializeError;
use crate::config::ConfigError;
use crate::execution::ExecutionError;
use crate::preprocessing::PreprocessingError;

/// The single error an algorithm execution hands back to its caller.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
    #[error("failed to generate run id: {0}")]
    RunId(String),
    #[error("algorithm `{process_id}` input `{input}` is invalid: {reason}")]
    InvalidInput {
        process_id: String,
        input: String,
        reason: String,
    },
}

impl OrchestratorError {
    pub fn invalid_input(
        process_id: impl Into<String>,
        input: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            process_id: process_id.into(),
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Exit code of the failed tool, when the failure was a non-zero exit.
    pub fn tool_exit_code(&self) -> Option<i32> {
        match self {
            Self::Execution(ExecutionError::NonZeroExit { exit_code, .. }) => Some(*exit_code),
            _ => None,
        }
    }
}
