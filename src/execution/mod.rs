use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod container;
pub mod docker_engine;
pub mod process;

pub use container::{ContainerBackend, ContainerEngine, ContainerRunConfig, ContainerSpec};
pub use docker_engine::DockerEngine;
pub use process::ProcessBackend;

/// Exit code reported when a process ends without one (killed by a signal).
pub const NO_EXIT_CODE: i32 = -1;

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error while running `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("container engine failed to {operation} `{target}`: {reason}")]
    Engine {
        operation: &'static str,
        target: String,
        reason: String,
    },
    #[error("command for `{0}` is empty")]
    EmptyCommand(String),
    #[error(
        "tool `{tool}` (container: {container}) exited with non-zero result code ({exit_code}): {output}"
    )]
    NonZeroExit {
        tool: String,
        container: String,
        exit_code: i32,
        output: String,
    },
    #[error("execution of `{0}` was interrupted")]
    Interrupted(String),
}

/// Exit code plus everything the command wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    result_code: i32,
    output_message: String,
}

impl ProcessResult {
    pub fn new(result_code: i32, output_message: impl Into<String>) -> Self {
        Self {
            result_code,
            output_message: output_message.into(),
        }
    }

    pub fn result_code(&self) -> i32 {
        self.result_code
    }

    pub fn output_message(&self) -> &str {
        &self.output_message
    }

    pub fn is_success(&self) -> bool {
        self.result_code == 0
    }

    pub fn into_output(self) -> String {
        self.output_message
    }
}

/// Shared flag observed by blocking waits; raising it makes the wait
/// return [`ExecutionError::Interrupted`].
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs one materialized command to completion.
pub trait ExecutionBackend: Send {
    /// Short human-readable form of what will run, for logs.
    fn describe(&self) -> String;

    fn execute(&self, cancel: &CancelFlag) -> Result<ProcessResult, ExecutionError>;
}

impl<B: ExecutionBackend + ?Sized> ExecutionBackend for Box<B> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn execute(&self, cancel: &CancelFlag) -> Result<ProcessResult, ExecutionError> {
        (**self).execute(cancel)
    }
}
