use super::{OrchestratorError, RunIdGenerator};
use crate::command::{
    container_command_parameters, materialize_process_command, CommandValue, HostPlatform,
    MaterializeError,
};
use crate::config::{BackendSettings, ExecutionKind, ToolDescriptor, ToolRegistry};
use crate::execution::{
    CancelFlag, ContainerBackend, ContainerRunConfig, ContainerSpec, DockerEngine, ExecutionBackend,
    ExecutionError, ProcessBackend, ProcessResult,
};
use crate::shared::paths::posix_join;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Everything needed to build a backend for one tool run.
#[derive(Debug, Clone)]
pub struct ToolInvocation<'a> {
    pub descriptor: &'a ToolDescriptor,
    pub values: &'a BTreeMap<String, CommandValue>,
    pub platform: HostPlatform,
}

impl ToolInvocation<'_> {
    pub fn process_tokens(&self) -> Result<Vec<String>, MaterializeError> {
        materialize_process_command(self.descriptor, self.values, self.platform)
    }

    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec {
            host: self.descriptor.docker.host.trim().to_string(),
            image: self.descriptor.docker.image.trim().to_string(),
            name: self.descriptor.docker.container.clone(),
        }
    }

    /// Mounts the host work directory at the tool's working directory.
    pub fn container_run_config(
        &self,
        host_work_dir: &Path,
    ) -> Result<ContainerRunConfig, MaterializeError> {
        let mut config = ContainerRunConfig::new();
        config.add_volume_binding(format!(
            "{}:{}",
            host_work_dir.display(),
            self.descriptor.docker.work_dir.trim()
        ));
        for port in &self.descriptor.docker.ports {
            config.add_port_binding(port.trim());
        }
        config.extend_command_parameters(container_command_parameters(
            self.descriptor,
            self.values,
        )?);
        Ok(config)
    }
}

/// Builds the execution backend for an invocation.
pub trait BackendFactory: Send + Sync {
    fn backend_for(
        &self,
        invocation: &ToolInvocation<'_>,
    ) -> Result<Box<dyn ExecutionBackend>, OrchestratorError>;
}

/// Host processes and the Docker Engine API, as configured in the settings.
#[derive(Debug, Clone)]
pub struct SystemBackends {
    settings: Arc<BackendSettings>,
}

impl SystemBackends {
    pub fn new(settings: Arc<BackendSettings>) -> Self {
        Self { settings }
    }
}

impl BackendFactory for SystemBackends {
    fn backend_for(
        &self,
        invocation: &ToolInvocation<'_>,
    ) -> Result<Box<dyn ExecutionBackend>, OrchestratorError> {
        let poll_interval = Duration::from_millis(self.settings.poll_interval_ms);
        match invocation.descriptor.execution {
            ExecutionKind::Process => Ok(Box::new(
                ProcessBackend::new(invocation.process_tokens()?)
                    .with_working_dir(&self.settings.work_dir)
                    .with_poll_interval(poll_interval),
            )),
            ExecutionKind::Docker => {
                let spec = invocation.container_spec();
                let config = invocation.container_run_config(&self.settings.work_dir)?;
                let engine = DockerEngine::connect(&spec.host)?.with_poll_interval(poll_interval);
                Ok(Box::new(ContainerBackend::new(engine, spec, config)))
            }
        }
    }
}

/// Resolves descriptors and runs tools to a checked result.
#[derive(Clone)]
pub struct ToolExecutor {
    settings: Arc<BackendSettings>,
    registry: ToolRegistry,
    run_ids: Arc<dyn RunIdGenerator>,
    backends: Arc<dyn BackendFactory>,
    platform: HostPlatform,
}

impl ToolExecutor {
    pub fn new(
        settings: Arc<BackendSettings>,
        run_ids: Arc<dyn RunIdGenerator>,
        backends: Arc<dyn BackendFactory>,
    ) -> Self {
        Self {
            registry: ToolRegistry::new(&settings.tool_config_dir),
            settings,
            run_ids,
            backends,
            platform: HostPlatform::detect(),
        }
    }

    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    pub(crate) fn set_run_ids(&mut self, run_ids: Arc<dyn RunIdGenerator>) {
        self.run_ids = run_ids;
    }

    pub(crate) fn set_backends(&mut self, backends: Arc<dyn BackendFactory>) {
        self.backends = backends;
    }

    pub(crate) fn set_platform(&mut self, platform: HostPlatform) {
        self.platform = platform;
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    pub fn run_ids(&self) -> &dyn RunIdGenerator {
        self.run_ids.as_ref()
    }

    /// Loads a fresh descriptor and gives its container a run-unique name.
    /// Returns the resolved descriptor and the suffix used.
    pub fn resolve(&self, tool_config_name: &str) -> Result<(ToolDescriptor, String), OrchestratorError> {
        let descriptor = self.registry.load(tool_config_name)?;
        let suffix = self.run_ids.next_suffix().map_err(OrchestratorError::RunId)?;
        let resolved = descriptor.with_run_suffix(&suffix);
        debug!(
            tool = %resolved.id,
            container = %resolved.docker.container,
            execution = %resolved.execution,
            "resolved tool descriptor"
        );
        Ok((resolved, suffix))
    }

    /// Path under which the tool sees a file placed in the host work directory.
    pub fn tool_path(&self, descriptor: &ToolDescriptor, file_name: &str) -> String {
        match descriptor.execution {
            ExecutionKind::Docker => posix_join(&descriptor.docker.work_dir, file_name),
            ExecutionKind::Process => self.settings.work_dir.join(file_name).display().to_string(),
        }
    }

    /// Runs the tool and turns a non-zero exit into an error.
    pub fn run(
        &self,
        descriptor: &ToolDescriptor,
        values: &BTreeMap<String, CommandValue>,
        cancel: &CancelFlag,
    ) -> Result<ProcessResult, OrchestratorError> {
        let invocation = ToolInvocation {
            descriptor,
            values,
            platform: self.platform,
        };
        let backend = self.backends.backend_for(&invocation)?;
        info!(tool = %descriptor.id, command = %backend.describe(), "executing tool");

        let result = backend.execute(cancel)?;
        if !result.is_success() {
            error!(
                tool = %descriptor.id,
                container = %descriptor.docker.container,
                exit_code = result.result_code(),
                "tool exited with non-zero result code"
            );
            return Err(ExecutionError::NonZeroExit {
                tool: descriptor.id.clone(),
                container: descriptor.docker.container.clone(),
                exit_code: result.result_code(),
                output: result.into_output(),
            }
            .into());
        }
        info!(tool = %descriptor.id, exit_code = result.result_code(), "tool finished");
        debug!(tool = %descriptor.id, output = %result.output_message(), "tool output");
        Ok(result)
    }
}
