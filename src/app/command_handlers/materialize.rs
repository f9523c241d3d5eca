use crate::app::command_support::{map_config_err, ToolArgs};
use crate::command::HostPlatform;
use crate::config::{ExecutionKind, ToolDescriptor};
use crate::orchestration::ToolInvocation;

/// Prints the command a run would execute, without executing it.
pub fn cmd_materialize(args: &[String]) -> Result<String, String> {
    let parsed = ToolArgs::parse(args, "materialize <tool.yml> [KEY=VALUE ...]")?;
    let descriptor = ToolDescriptor::from_path(&parsed.tool_path).map_err(map_config_err)?;
    descriptor.validate().map_err(map_config_err)?;

    let invocation = ToolInvocation {
        descriptor: &descriptor,
        values: &parsed.bindings,
        platform: parsed.platform.unwrap_or_else(HostPlatform::detect),
    };
    let mut lines = vec![format!("execution={}", descriptor.execution)];
    match descriptor.execution {
        ExecutionKind::Process => {
            let tokens = invocation.process_tokens().map_err(|e| e.to_string())?;
            lines.extend(tokens.into_iter().map(|token| format!("token={token}")));
        }
        ExecutionKind::Docker => {
            let settings = parsed.resolve_settings()?;
            let spec = invocation.container_spec();
            let config = invocation
                .container_run_config(&settings.work_dir)
                .map_err(|e| e.to_string())?;
            lines.push(format!("image={}", spec.image));
            lines.push(format!("container={}", spec.name));
            if !spec.host.is_empty() {
                lines.push(format!("host={}", spec.host));
            }
            lines.extend(
                config
                    .volume_bindings()
                    .iter()
                    .map(|binding| format!("volume={binding}")),
            );
            lines.extend(
                config
                    .port_bindings()
                    .iter()
                    .map(|binding| format!("port={binding}")),
            );
            lines.extend(
                config
                    .command_tokens()
                    .into_iter()
                    .map(|token| format!("token={token}")),
            );
        }
    }
    Ok(lines.join("\n"))
}
