pub mod materialize;
pub mod parameter;
pub mod value;

pub use materialize::{
    argument_parameters, container_command_parameters, materialize_process_command,
    render_tokens, wrap_for_host, HostPlatform, PathStyle,
};
pub use parameter::CommandParameter;
pub use value::CommandValue;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaterializeError {
    #[error("tool `{tool}` argument `{argument}` references unbound input `{input}`")]
    UnboundInput {
        tool: String,
        argument: String,
        input: String,
    },
    #[error(
        "tool `{tool}` argument `{argument}` is declared single but input `{input}` holds {count} values"
    )]
    QuantityMismatch {
        tool: String,
        argument: String,
        input: String,
        count: usize,
    },
}
