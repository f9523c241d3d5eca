//! Turns a tool descriptor plus runtime values into argv tokens.
//!
//! Precondition for every function here: each `wps-process-reference`
//! argument must already be bound in the value map. A missing key is
//! reported as [`MaterializeError::UnboundInput`]; nothing is defaulted.

use super::{CommandParameter, CommandValue, MaterializeError};
use crate::config::{ArgumentKind, Quantity, ToolDescriptor};
use crate::shared::paths::to_posix;
use std::collections::BTreeMap;
use std::path::Path;

/// Host family, as far as launching executables is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Posix,
    /// Needs `cmd.exe /c` in front of arbitrary executables.
    Windows,
}

impl HostPlatform {
    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(name: &str) -> Self {
        if name.trim().to_ascii_lowercase().starts_with("windows") {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    pub fn shell_wrapper(self) -> &'static [&'static str] {
        match self {
            Self::Posix => &[],
            Self::Windows => &["cmd.exe", "/c"],
        }
    }
}

/// How path-like values are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    Native,
    /// Forward slashes only; used for anything handed to a container.
    Posix,
}

pub fn argument_parameters(
    descriptor: &ToolDescriptor,
    values: &BTreeMap<String, CommandValue>,
    style: PathStyle,
) -> Result<Vec<CommandParameter>, MaterializeError> {
    let mut parameters = Vec::new();
    for argument in &descriptor.command.arguments {
        if argument.kind == ArgumentKind::StaticOption {
            parameters.push(CommandParameter::new(&argument.name, &argument.value));
            continue;
        }

        let input = argument.value.trim();
        let bound = values
            .get(input)
            .ok_or_else(|| MaterializeError::UnboundInput {
                tool: descriptor.id.clone(),
                argument: argument.name.clone(),
                input: input.to_string(),
            })?;
        let bound = match style {
            PathStyle::Native => bound.clone(),
            PathStyle::Posix => bound.map_values(to_posix),
        };

        match bound {
            CommandValue::Single(value) => {
                parameters.push(CommandParameter::new(&argument.name, value));
            }
            CommandValue::Multiple(items) => {
                if argument.quantity == Quantity::Single && items.len() > 1 {
                    return Err(MaterializeError::QuantityMismatch {
                        tool: descriptor.id.clone(),
                        argument: argument.name.clone(),
                        input: input.to_string(),
                        count: items.len(),
                    });
                }
                match argument.separator.as_deref().filter(|sep| !sep.is_empty()) {
                    Some(separator) => {
                        parameters.push(CommandParameter::new(
                            &argument.name,
                            items.join(separator),
                        ));
                    }
                    None => {
                        let mut items = items.into_iter();
                        match items.next() {
                            Some(first) => {
                                parameters.push(CommandParameter::new(&argument.name, first))
                            }
                            None => parameters.push(CommandParameter::flag(&argument.name)),
                        }
                        parameters.extend(items.map(CommandParameter::positional));
                    }
                }
            }
        }
    }
    Ok(parameters)
}

pub fn render_tokens(parameters: &[CommandParameter]) -> Vec<String> {
    parameters
        .iter()
        .flat_map(CommandParameter::tokens)
        .collect()
}

/// Prefixes the shell host when the platform needs one; the original
/// sequence follows unchanged.
pub fn wrap_for_host(tokens: Vec<String>, platform: HostPlatform) -> Vec<String> {
    let wrapper = platform.shell_wrapper();
    if wrapper.is_empty() {
        return tokens;
    }
    let mut wrapped: Vec<String> = wrapper.iter().map(|token| token.to_string()).collect();
    wrapped.extend(tokens);
    wrapped
}

/// Full argv for running the tool as a host process.
pub fn materialize_process_command(
    descriptor: &ToolDescriptor,
    values: &BTreeMap<String, CommandValue>,
    platform: HostPlatform,
) -> Result<Vec<String>, MaterializeError> {
    let folder = descriptor.command.folder.trim();
    let executable = if folder.is_empty() {
        descriptor.command.name.clone()
    } else {
        Path::new(folder)
            .join(&descriptor.command.name)
            .display()
            .to_string()
    };

    let mut tokens = vec![executable];
    tokens.extend(render_tokens(&argument_parameters(
        descriptor,
        values,
        PathStyle::Native,
    )?));
    Ok(wrap_for_host(tokens, platform))
}

/// Command parameters for the container: the configured folder (usually an
/// interpreter) and command name as positionals, then the arguments with
/// POSIX paths.
pub fn container_command_parameters(
    descriptor: &ToolDescriptor,
    values: &BTreeMap<String, CommandValue>,
) -> Result<Vec<CommandParameter>, MaterializeError> {
    let mut parameters = Vec::new();
    if !descriptor.command.folder.trim().is_empty() {
        parameters.push(CommandParameter::positional(&descriptor.command.folder));
    }
    parameters.push(CommandParameter::positional(&descriptor.command.name));
    parameters.extend(argument_parameters(descriptor, values, PathStyle::Posix)?);
    Ok(parameters)
}
