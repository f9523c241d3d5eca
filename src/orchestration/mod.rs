pub mod algorithms;
pub mod error;
pub mod metadata;
pub mod orchestrator;
pub mod run_id;
pub mod tool_executor;

pub use error::OrchestratorError;
pub use metadata::ProductMetadata;
pub use orchestrator::{
    Algorithm, AlgorithmOutput, Orchestrator, PreprocessingContext, RESULT_PATH_KEY,
};
pub use run_id::{RandomRunIds, RunIdGenerator, SequentialRunIds};
pub use tool_executor::{BackendFactory, SystemBackends, ToolExecutor, ToolInvocation};
