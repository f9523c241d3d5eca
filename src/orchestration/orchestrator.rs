use super::tool_executor::{BackendFactory, SystemBackends, ToolExecutor};
use super::{OrchestratorError, ProductMetadata, RandomRunIds, RunIdGenerator};
use crate::command::{CommandValue, HostPlatform};
use crate::config::{BackendSettings, ToolDescriptor};
use crate::execution::CancelFlag;
use crate::preprocessing::file_data::GEOTIFF_MIME_TYPE;
use crate::preprocessing::FileData;
use crate::shared::paths::file_name_of;
use crate::source::{HttpSourceFetcher, LocalSourceFetcher, RoutingSourceFetcher, SourceFetcher};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const RESULT_PATH_KEY: &str = "RESULT_PATH";
const RESULT_EXTENSION: &str = ".tif";

/// One algorithm: which tool it runs and how its inputs are prepared.
pub trait Algorithm {
    fn process_id(&self) -> &str;

    /// File name of the tool descriptor inside the tool config directory.
    fn tool_config_name(&self) -> &str;

    fn result_name_prefix(&self) -> &str;

    /// References of the source products, recorded in the metadata.
    fn source_references(&self) -> Vec<String> {
        Vec::new()
    }

    /// Preprocesses the inputs and binds them to the descriptor's input keys.
    /// `RESULT_PATH` is added by the orchestrator afterwards.
    fn create_input_values(
        &mut self,
        context: &PreprocessingContext<'_>,
    ) -> Result<BTreeMap<String, CommandValue>, OrchestratorError>;
}

/// What an algorithm may use while preparing its inputs.
pub struct PreprocessingContext<'a> {
    tools: &'a ToolExecutor,
    fetcher: &'a dyn SourceFetcher,
    cancel: &'a CancelFlag,
    descriptor: &'a ToolDescriptor,
    run_suffix: &'a str,
}

impl<'a> PreprocessingContext<'a> {
    pub fn settings(&self) -> &'a BackendSettings {
        self.tools.settings()
    }

    pub fn work_dir(&self) -> &'a Path {
        &self.tools.settings().work_dir
    }

    pub fn tools(&self) -> &'a ToolExecutor {
        self.tools
    }

    pub fn fetcher(&self) -> &'a dyn SourceFetcher {
        self.fetcher
    }

    pub fn cancel(&self) -> &'a CancelFlag {
        self.cancel
    }

    pub fn descriptor(&self) -> &'a ToolDescriptor {
        self.descriptor
    }

    pub fn run_suffix(&self) -> &'a str {
        self.run_suffix
    }

    /// Path under which the main tool sees `file` (only its name is used;
    /// the file must live in the work directory).
    pub fn tool_path(&self, file: &Path) -> String {
        let name = file_name_of(file).unwrap_or_default();
        self.tools.tool_path(self.descriptor, &name)
    }

    pub fn tool_paths(&self, files: &[PathBuf]) -> CommandValue {
        CommandValue::Multiple(files.iter().map(|file| self.tool_path(file)).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmOutput {
    pub output_file: FileData,
    pub metadata: ProductMetadata,
}

/// Runs algorithms: load descriptor, preprocess, materialize, execute,
/// interpret. Safe to share between threads.
#[derive(Clone)]
pub struct Orchestrator {
    tools: ToolExecutor,
    fetcher: Arc<dyn SourceFetcher>,
}

impl Orchestrator {
    pub fn new(settings: BackendSettings) -> Self {
        let settings = Arc::new(settings);
        let mut http = HttpSourceFetcher::new(Duration::from_secs(settings.download_timeout_secs));
        if let Some((username, password)) = settings.credentials() {
            http = http.with_basic_auth(username, password);
        }
        let fetcher = RoutingSourceFetcher::new(http, LocalSourceFetcher::new());
        let backends = Arc::new(SystemBackends::new(Arc::clone(&settings)));
        Self {
            tools: ToolExecutor::new(settings, Arc::new(RandomRunIds), backends),
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn with_run_ids(mut self, run_ids: Arc<dyn RunIdGenerator>) -> Self {
        self.tools.set_run_ids(run_ids);
        self
    }

    pub fn with_backends(mut self, backends: Arc<dyn BackendFactory>) -> Self {
        self.tools.set_backends(backends);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.tools.set_platform(platform);
        self
    }

    pub fn settings(&self) -> &BackendSettings {
        self.tools.settings()
    }

    pub fn tools(&self) -> &ToolExecutor {
        &self.tools
    }

    pub fn execute(
        &self,
        algorithm: &mut dyn Algorithm,
        cancel: &CancelFlag,
    ) -> Result<AlgorithmOutput, OrchestratorError> {
        let process_id = algorithm.process_id().to_string();
        let (descriptor, run_suffix) = self.tools.resolve(algorithm.tool_config_name())?;
        info!(
            process = %process_id,
            tool = %descriptor.id,
            container = %descriptor.docker.container,
            "starting algorithm execution"
        );

        let context = PreprocessingContext {
            tools: &self.tools,
            fetcher: self.fetcher.as_ref(),
            cancel,
            descriptor: &descriptor,
            run_suffix: &run_suffix,
        };
        let mut values = algorithm.create_input_values(&context)?;

        let product_id = self
            .tools
            .run_ids()
            .next_product_id()
            .map_err(OrchestratorError::RunId)?;
        let product_name = format!(
            "{}_{product_id}{run_suffix}{RESULT_EXTENSION}",
            algorithm.result_name_prefix()
        );
        values.insert(
            RESULT_PATH_KEY.to_string(),
            CommandValue::single(self.tools.tool_path(&descriptor, &product_name)),
        );

        self.tools.run(&descriptor, &values, cancel)?;

        let output_file = self.settings().work_dir.join(&product_name);
        if !output_file.is_file() {
            warn!(
                process = %process_id,
                output = %output_file.display(),
                "tool succeeded but the result file is not in the work directory"
            );
        }
        let metadata = ProductMetadata::new(
            &process_id,
            &descriptor.id,
            &output_file,
            GEOTIFF_MIME_TYPE,
            algorithm.source_references(),
            &run_suffix,
        );
        info!(process = %process_id, output = %output_file.display(), "algorithm execution finished");
        Ok(AlgorithmOutput {
            output_file: FileData::geotiff(output_file),
            metadata,
        })
    }
}
