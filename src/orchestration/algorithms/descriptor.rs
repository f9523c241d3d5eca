use crate::command::CommandValue;
use crate::orchestration::{Algorithm, OrchestratorError, PreprocessingContext};
use std::collections::BTreeMap;
use std::path::Path;

/// Runs any tool descriptor with literal input bindings; no preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorAlgorithm {
    process_id: String,
    tool_config_name: String,
    result_name_prefix: String,
    bindings: BTreeMap<String, CommandValue>,
}

impl DescriptorAlgorithm {
    pub fn new(tool_config_name: impl Into<String>) -> Self {
        let tool_config_name = tool_config_name.into();
        let stem = Path::new(&tool_config_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| tool_config_name.clone());
        Self {
            process_id: format!("eoexec.{stem}"),
            result_name_prefix: format!("{}_result", stem.replace('-', "_")),
            tool_config_name,
            bindings: BTreeMap::new(),
        }
    }

    pub fn with_binding(mut self, key: impl Into<String>, value: impl Into<CommandValue>) -> Self {
        self.bindings.insert(key.into(), value.into());
        self
    }

    pub fn bindings(&self) -> &BTreeMap<String, CommandValue> {
        &self.bindings
    }

    /// `KEY=value` binds a single value; a comma makes it multiple
    /// (`KEY=a,b`, or `KEY=a,` for a one-element list).
    pub fn parse_binding(raw: &str) -> Result<(String, CommandValue), String> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("binding `{raw}` must use KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("binding `{raw}` has an empty key"));
        }
        let value = if value.contains(',') {
            CommandValue::Multiple(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            CommandValue::single(value.trim())
        };
        Ok((key.to_string(), value))
    }
}

impl Algorithm for DescriptorAlgorithm {
    fn process_id(&self) -> &str {
        &self.process_id
    }

    fn tool_config_name(&self) -> &str {
        &self.tool_config_name
    }

    fn result_name_prefix(&self) -> &str {
        &self.result_name_prefix
    }

    fn create_input_values(
        &mut self,
        _context: &PreprocessingContext<'_>,
    ) -> Result<BTreeMap<String, CommandValue>, OrchestratorError> {
        Ok(self.bindings.clone())
    }
}
