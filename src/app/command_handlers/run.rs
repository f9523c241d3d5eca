use crate::app::command_support::ToolArgs;
use crate::execution::CancelFlag;
use crate::orchestration::algorithms::DescriptorAlgorithm;
use crate::orchestration::Orchestrator;

pub fn cmd_run(args: &[String]) -> Result<String, String> {
    let parsed = ToolArgs::parse(args, "run <tool.yml> [KEY=VALUE ...]")?;
    let settings = parsed.resolve_settings()?;
    let tool_file = parsed.tool_file_name()?;

    let mut orchestrator = Orchestrator::new(settings);
    if let Some(platform) = parsed.platform {
        orchestrator = orchestrator.with_platform(platform);
    }
    let mut algorithm = parsed
        .bindings
        .into_iter()
        .fold(DescriptorAlgorithm::new(tool_file), |algorithm, (key, value)| {
            algorithm.with_binding(key, value)
        });

    let output = orchestrator
        .execute(&mut algorithm, &CancelFlag::new())
        .map_err(|e| e.to_string())?;
    let metadata = output.metadata.to_json_pretty().map_err(|e| e.to_string())?;
    Ok([
        "status=ok".to_string(),
        format!("tool={}", output.metadata.tool_id),
        format!("output_file={}", output.output_file.path().display()),
        metadata,
    ]
    .join("\n"))
}
