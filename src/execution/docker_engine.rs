use super::container::{ContainerEngine, ContainerRunConfig, ContainerSpec};
use super::{CancelFlag, ExecutionError};
use bollard::container::{
    CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    StartContainerOptions, WaitContainerOptions,
};
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::Docker;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

const CONNECT_TIMEOUT_SECS: u64 = 120;

/// [`ContainerEngine`] talking to the Docker Engine API.
///
/// The API client is async; each lifecycle call blocks on a private
/// current-thread runtime so the backend stays synchronous.
pub struct DockerEngine {
    docker: Docker,
    runtime: Runtime,
    poll_interval: Duration,
}

impl DockerEngine {
    /// Connects to `host` (`unix://`, `tcp://` or `http://`); blank uses the
    /// local defaults.
    pub fn connect(host: &str) -> Result<Self, ExecutionError> {
        let host = host.trim();
        let engine_err = |reason: String| ExecutionError::Engine {
            operation: "connect",
            target: if host.is_empty() {
                "local engine".to_string()
            } else {
                host.to_string()
            },
            reason,
        };
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| engine_err(err.to_string()))?;
        let _guard = runtime.enter();

        let docker = if host.is_empty() {
            Docker::connect_with_local_defaults()
        } else if host.starts_with("unix://") {
            connect_unix(host)
        } else {
            Docker::connect_with_http(host, CONNECT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
        }
        .map_err(|err| engine_err(err.to_string()))?;

        Ok(Self {
            docker,
            runtime,
            poll_interval: Duration::from_millis(50),
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[cfg(unix)]
fn connect_unix(host: &str) -> Result<Docker, bollard::errors::Error> {
    Docker::connect_with_unix(host, CONNECT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
}

#[cfg(not(unix))]
fn connect_unix(_host: &str) -> Result<Docker, bollard::errors::Error> {
    Docker::connect_with_local_defaults()
}

fn api_err(operation: &'static str, target: &str, err: bollard::errors::Error) -> ExecutionError {
    ExecutionError::Engine {
        operation,
        target: target.to_string(),
        reason: err.to_string(),
    }
}

/// `[ip:]host:container[/proto]` as the engine's port map entry.
fn port_binding(raw: &str) -> (String, PortBinding) {
    let mut parts: Vec<&str> = raw.trim().rsplitn(3, ':').collect();
    parts.reverse();
    let (host_ip, host_port, container) = match parts.as_slice() {
        [ip, host, container] => (Some(ip.to_string()), Some(host.to_string()), *container),
        [host, container] => (None, Some(host.to_string()), *container),
        [container] => (None, None, *container),
        _ => (None, None, raw),
    };
    let key = if container.contains('/') {
        container.to_string()
    } else {
        format!("{container}/tcp")
    };
    (key, PortBinding { host_ip, host_port })
}

fn create_body(spec: &ContainerSpec, config: &ContainerRunConfig) -> ContainerCreateBody {
    let mut exposed_ports = HashMap::new();
    let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
    for raw in config.port_bindings() {
        let (key, binding) = port_binding(raw);
        exposed_ports.insert(key.clone(), HashMap::new());
        port_bindings.entry(key).or_default().get_or_insert_with(Vec::new).push(binding);
    }

    ContainerCreateBody {
        image: Some(spec.image.clone()),
        cmd: Some(config.command_tokens()),
        attach_stdout: Some(true),
        attach_stderr: Some(true),
        exposed_ports: (!exposed_ports.is_empty()).then_some(exposed_ports),
        host_config: Some(HostConfig {
            binds: Some(config.volume_bindings().to_vec()),
            port_bindings: (!port_bindings.is_empty()).then_some(port_bindings),
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl ContainerEngine for DockerEngine {
    fn create(
        &self,
        spec: &ContainerSpec,
        config: &ContainerRunConfig,
    ) -> Result<String, ExecutionError> {
        let response = self
            .runtime
            .block_on(self.docker.create_container(
                Some(CreateContainerOptions {
                    name: spec.name.clone(),
                    ..Default::default()
                }),
                create_body(spec, config),
            ))
            .map_err(|err| api_err("create", &spec.name, err))?;
        for warning in &response.warnings {
            debug!(container = %spec.name, warning = %warning, "engine warning on create");
        }
        if response.id.trim().is_empty() {
            return Err(ExecutionError::Engine {
                operation: "create",
                target: spec.name.clone(),
                reason: "engine returned no container id".to_string(),
            });
        }
        Ok(response.id)
    }

    fn run_to_completion(
        &self,
        container_id: &str,
        cancel: &CancelFlag,
    ) -> Result<i32, ExecutionError> {
        self.runtime.block_on(async {
            self.docker
                .start_container(container_id, None::<StartContainerOptions<String>>)
                .await
                .map_err(|err| api_err("start", container_id, err))?;
            debug!(id = %container_id, "started tool container");

            let mut wait = Box::pin(
                self.docker
                    .wait_container(container_id, None::<WaitContainerOptions<String>>),
            );
            let mut ticker = tokio::time::interval(self.poll_interval);
            loop {
                tokio::select! {
                    next = wait.next() => {
                        return match next {
                            Some(Ok(response)) => Ok(response.status_code as i32),
                            // Non-zero exits surface as a wait error carrying the code.
                            Some(Err(bollard::errors::Error::DockerContainerWaitError {
                                code, ..
                            })) => Ok(code as i32),
                            Some(Err(err)) => Err(api_err("wait", container_id, err)),
                            None => Err(ExecutionError::Engine {
                                operation: "wait",
                                target: container_id.to_string(),
                                reason: "engine closed the wait stream".to_string(),
                            }),
                        };
                    }
                    _ = ticker.tick() => {
                        if cancel.is_cancelled() {
                            return Err(ExecutionError::Interrupted(container_id.to_string()));
                        }
                    }
                }
            }
        })
    }

    fn logs(&self, container_id: &str) -> Result<String, ExecutionError> {
        self.runtime.block_on(async {
            let mut frames = Box::pin(self.docker.logs(
                container_id,
                Some(LogsOptions::<String> {
                    stdout: true,
                    stderr: true,
                    tail: "all".to_string(),
                    ..Default::default()
                }),
            ));
            let mut bytes = Vec::new();
            while let Some(frame) = frames.next().await {
                match frame.map_err(|err| api_err("logs", container_id, err))? {
                    LogOutput::StdOut { message }
                    | LogOutput::StdErr { message }
                    | LogOutput::Console { message } => bytes.extend_from_slice(&message),
                    LogOutput::StdIn { .. } => {}
                }
            }
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        })
    }

    fn remove(&self, container_id: &str) -> Result<(), ExecutionError> {
        self.runtime
            .block_on(self.docker.remove_container(
                container_id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            ))
            .map_err(|err| api_err("remove", container_id, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandParameter;

    #[test]
    fn port_bindings_default_to_tcp() {
        let (key, binding) = port_binding("8080:80");
        assert_eq!(key, "80/tcp");
        assert_eq!(binding.host_port.as_deref(), Some("8080"));
        assert!(binding.host_ip.is_none());

        let (key, binding) = port_binding("127.0.0.1:5353:53/udp");
        assert_eq!(key, "53/udp");
        assert_eq!(binding.host_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(binding.host_port.as_deref(), Some("5353"));
    }

    #[test]
    fn create_body_carries_binds_ports_and_command() {
        let mut config = ContainerRunConfig::new();
        config.add_volume_binding("/srv/eo/work:/public");
        config.add_port_binding("8080:80");
        config.add_command_parameter(CommandParameter::positional("/eo.sh"));
        config.add_command_parameter(CommandParameter::new("-input", "/public/a.tif"));
        let spec = ContainerSpec {
            host: String::new(),
            image: "dlm_docker:latest".to_string(),
            name: "eo_run1".to_string(),
        };

        let body = create_body(&spec, &config);
        assert_eq!(body.image.as_deref(), Some("dlm_docker:latest"));
        assert_eq!(
            body.cmd,
            Some(vec![
                "/eo.sh".to_string(),
                "-input".to_string(),
                "/public/a.tif".to_string()
            ])
        );
        let host_config = body.host_config.expect("host config");
        assert_eq!(host_config.binds, Some(vec!["/srv/eo/work:/public".to_string()]));
        let ports = host_config.port_bindings.expect("port bindings");
        assert_eq!(
            ports["80/tcp"].as_ref().map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn unreachable_http_host_is_reported_on_first_call() {
        let engine = DockerEngine::connect("tcp://127.0.0.1:1").expect("client builds lazily");
        let err = engine.remove("c0ffee").expect_err("nothing listening");
        assert!(matches!(err, ExecutionError::Engine { operation: "remove", .. }));
    }
}
