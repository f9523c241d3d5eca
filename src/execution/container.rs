use super::{CancelFlag, ExecutionBackend, ExecutionError, ProcessResult};
use crate::command::{render_tokens, CommandParameter};
use tracing::{info, warn};

/// Identity of the container to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Engine endpoint, e.g. `unix:///var/run/docker.sock`; empty means the
    /// engine default.
    pub host: String,
    pub image: String,
    /// Already run-unique.
    pub name: String,
}

/// Bindings and command for one container run. Built per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerRunConfig {
    volume_bindings: Vec<String>,
    port_bindings: Vec<String>,
    command_parameters: Vec<CommandParameter>,
}

impl ContainerRunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_volume_binding(&mut self, binding: impl Into<String>) {
        self.volume_bindings.push(binding.into());
    }

    pub fn add_port_binding(&mut self, binding: impl Into<String>) {
        self.port_bindings.push(binding.into());
    }

    pub fn add_command_parameter(&mut self, parameter: CommandParameter) {
        self.command_parameters.push(parameter);
    }

    pub fn extend_command_parameters<I>(&mut self, parameters: I)
    where
        I: IntoIterator<Item = CommandParameter>,
    {
        self.command_parameters.extend(parameters);
    }

    pub fn volume_bindings(&self) -> &[String] {
        &self.volume_bindings
    }

    pub fn port_bindings(&self) -> &[String] {
        &self.port_bindings
    }

    pub fn command_parameters(&self) -> &[CommandParameter] {
        &self.command_parameters
    }

    pub fn command_tokens(&self) -> Vec<String> {
        render_tokens(&self.command_parameters)
    }
}

/// The container lifecycle operations the backend relies on.
pub trait ContainerEngine: Send {
    /// Creates the container and returns its id.
    fn create(
        &self,
        spec: &ContainerSpec,
        config: &ContainerRunConfig,
    ) -> Result<String, ExecutionError>;

    /// Starts the container and blocks until it exits, returning its exit code.
    fn run_to_completion(
        &self,
        container_id: &str,
        cancel: &CancelFlag,
    ) -> Result<i32, ExecutionError>;

    fn logs(&self, container_id: &str) -> Result<String, ExecutionError>;

    fn remove(&self, container_id: &str) -> Result<(), ExecutionError>;
}

/// Runs one tool inside a fresh container and always removes it afterwards.
pub struct ContainerBackend<E> {
    engine: E,
    spec: ContainerSpec,
    config: ContainerRunConfig,
}

impl<E: ContainerEngine> ContainerBackend<E> {
    pub fn new(engine: E, spec: ContainerSpec, config: ContainerRunConfig) -> Self {
        Self {
            engine,
            spec,
            config,
        }
    }

    pub fn spec(&self) -> &ContainerSpec {
        &self.spec
    }

    pub fn config(&self) -> &ContainerRunConfig {
        &self.config
    }

    fn run_created(
        &self,
        container_id: &str,
        cancel: &CancelFlag,
    ) -> Result<ProcessResult, ExecutionError> {
        let exit_code = self.engine.run_to_completion(container_id, cancel)?;
        let log = self.engine.logs(container_id)?;
        Ok(ProcessResult::new(exit_code, log))
    }
}

impl<E: ContainerEngine> ExecutionBackend for ContainerBackend<E> {
    fn describe(&self) -> String {
        format!(
            "{} ({}) {}",
            self.spec.name,
            self.spec.image,
            self.config.command_tokens().join(" ")
        )
    }

    fn execute(&self, cancel: &CancelFlag) -> Result<ProcessResult, ExecutionError> {
        let container_id = self.engine.create(&self.spec, &self.config)?;
        info!(
            container = %self.spec.name,
            id = %container_id,
            image = %self.spec.image,
            "created tool container"
        );

        let outcome = self.run_created(&container_id, cancel);

        // Removal runs on every path, before any error leaves this function.
        match self.engine.remove(&container_id) {
            Ok(()) => info!(container = %self.spec.name, "removed tool container"),
            Err(err) => warn!(
                container = %self.spec.name,
                error = %err,
                "failed to remove tool container"
            ),
        }

        outcome
    }
}
