use crate::app::command_support::{map_config_err, ToolArgs};
use crate::config::{ArgumentKind, ToolDescriptor};

pub fn cmd_describe(args: &[String]) -> Result<String, String> {
    let parsed = ToolArgs::parse(args, "describe <tool.yml>")?;
    if !parsed.bindings.is_empty() {
        return Err("describe takes no bindings".to_string());
    }
    let descriptor = ToolDescriptor::from_path(&parsed.tool_path).map_err(map_config_err)?;
    descriptor.validate().map_err(map_config_err)?;
    Ok(describe_lines(&descriptor).join("\n"))
}

fn describe_lines(descriptor: &ToolDescriptor) -> Vec<String> {
    let mut lines = vec![
        format!("id={}", descriptor.id),
        format!("execution={}", descriptor.execution),
        format!("image={}", descriptor.docker.image),
        format!("container={}", descriptor.docker.container),
        format!("work_dir={}", descriptor.docker.work_dir),
        format!("command={}", descriptor.command.name),
    ];
    if !descriptor.docker.host.trim().is_empty() {
        lines.push(format!("host={}", descriptor.docker.host));
    }
    if !descriptor.command.folder.trim().is_empty() {
        lines.push(format!("folder={}", descriptor.command.folder));
    }
    lines.push(format!(
        "inputs={}",
        descriptor.referenced_inputs().join(",")
    ));
    for argument in &descriptor.command.arguments {
        let kind = match argument.kind {
            ArgumentKind::ProcessReference => "reference",
            ArgumentKind::StaticOption => "static",
        };
        lines.push(format!(
            "argument={} {kind} {}",
            argument.name, argument.value
        ));
    }
    lines
}
