#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Run,
    Describe,
    Materialize,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "run" => CliVerb::Run,
        "describe" => CliVerb::Describe,
        "materialize" => CliVerb::Materialize,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  run <tool.yml> [KEY=VALUE ...]         Execute a tool descriptor with literal inputs"
            .to_string(),
        "  describe <tool.yml>                    Print the parsed tool descriptor".to_string(),
        "  materialize <tool.yml> [KEY=VALUE ...] Print the command that would run".to_string(),
        "  help                                   Show this help".to_string(),
        String::new(),
        "Options:".to_string(),
        "  --settings <file>                      Backend settings (default: $EOEXEC_SETTINGS or ~/.eoexec/settings.yaml)"
            .to_string(),
        "  --work-dir <dir>                       Work directory when no settings file exists"
            .to_string(),
        "  --platform posix|windows               Host platform for `materialize`".to_string(),
        String::new(),
        "Bindings: KEY=value binds one value, KEY=a,b binds a list.".to_string(),
        "Logging: set EOEXEC_LOG (e.g. EOEXEC_LOG=debug).".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
