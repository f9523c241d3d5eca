use super::ConfigError;
use crate::shared::serde_ext::scalar_string;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Which execution backend runs the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionKind {
    #[default]
    Docker,
    Process,
}

impl ExecutionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Process => "process",
        }
    }
}

impl std::fmt::Display for ExecutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ArgumentKind {
    /// `value` names an entry of the runtime input map.
    #[serde(rename = "wps-process-reference")]
    ProcessReference,
    /// `value` is emitted literally.
    #[serde(rename = "static-option")]
    StaticOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    #[default]
    Single,
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArgumentDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ArgumentKind,
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: String,
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl ArgumentDescriptor {
    pub fn reference(name: &str, input_key: &str, quantity: Quantity) -> Self {
        Self {
            name: name.to_string(),
            kind: ArgumentKind::ProcessReference,
            value: input_key.to_string(),
            quantity,
            separator: None,
        }
    }

    pub fn static_option(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ArgumentKind::StaticOption,
            value: value.to_string(),
            quantity: Quantity::Single,
            separator: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerSection {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub work_dir: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct CommandSection {
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<ArgumentDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ToolParameters {
    #[serde(default, rename = "inputEpsg", deserialize_with = "scalar_string")]
    pub input_epsg: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Declarative description of one external tool, parsed from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub execution: ExecutionKind,
    pub docker: DockerSection,
    pub command: CommandSection,
    #[serde(default)]
    pub parameter: ToolParameters,
}

impl ToolDescriptor {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_labeled(&raw, &path.display().to_string())
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ConfigError> {
        let mut raw = String::new();
        reader
            .read_to_string(&mut raw)
            .map_err(|source| ConfigError::Read {
                path: "<stream>".to_string(),
                source,
            })?;
        Self::parse_labeled(&raw, "<stream>")
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Self::parse_labeled(raw, "<inline>")
    }

    fn parse_labeled(raw: &str, label: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: label.to_string(),
            source,
        })
    }

    /// Returns a copy whose container name carries `suffix`, leaving `self`
    /// untouched so concurrent runs never share a mutable descriptor.
    pub fn with_run_suffix(&self, suffix: &str) -> Self {
        let mut resolved = self.clone();
        resolved.docker.container = format!("{}{}", self.docker.container.trim(), suffix);
        resolved
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Descriptor {
            tool: self.id.clone(),
            reason,
        };
        if self.id.trim().is_empty() {
            return Err(invalid("`id` must be non-blank".to_string()));
        }
        if self.command.name.trim().is_empty() {
            return Err(invalid("`command.name` must be non-empty".to_string()));
        }
        if self.execution == ExecutionKind::Docker {
            if self.docker.image.trim().is_empty() {
                return Err(invalid("`docker.image` must be non-empty".to_string()));
            }
            if self.docker.container.trim().is_empty() {
                return Err(invalid("`docker.container` must be non-empty".to_string()));
            }
            if self.docker.work_dir.trim().is_empty() {
                return Err(invalid("`docker.workDir` must be non-empty".to_string()));
            }
        }
        for (index, argument) in self.command.arguments.iter().enumerate() {
            match argument.kind {
                ArgumentKind::ProcessReference if argument.value.trim().is_empty() => {
                    return Err(invalid(format!(
                        "argument #{index} (`{}`) references no input",
                        argument.name
                    )));
                }
                ArgumentKind::StaticOption
                    if argument.name.trim().is_empty() && argument.value.trim().is_empty() =>
                {
                    return Err(invalid(format!(
                        "argument #{index} has neither name nor value"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Input keys the runtime value map must bind, in declaration order.
    pub fn referenced_inputs(&self) -> Vec<&str> {
        self.command
            .arguments
            .iter()
            .filter(|argument| argument.kind == ArgumentKind::ProcessReference)
            .map(|argument| argument.value.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAND_COVER: &str = r#"
id: land-cover-classification
docker:
  host: unix:///var/run/docker.sock
  image: dlm_docker:wacodis-eo-hackathon
  container: wacodis-eo-dlm
  workDir: /public
command:
  folder: /bin/ash
  name: /eo.sh
  arguments:
    - name: -input
      type: wps-process-reference
      value: OPTICAL_IMAGES_SOURCES
      quantity: multiple
    - name: -training
      type: wps-process-reference
      value: REFERENCE_DATA
      quantity: single
    - name: -result
      type: wps-process-reference
      value: RESULT_PATH
      quantity: single
    - name: -verbose
      type: static-option
      value: ""
parameter:
  inputEpsg: 4326
"#;

    #[test]
    fn parses_every_section() {
        let descriptor = ToolDescriptor::from_yaml_str(LAND_COVER).expect("parse");
        assert_eq!(descriptor.id, "land-cover-classification");
        assert_eq!(descriptor.execution, ExecutionKind::Docker);
        assert_eq!(descriptor.docker.host, "unix:///var/run/docker.sock");
        assert_eq!(descriptor.docker.image, "dlm_docker:wacodis-eo-hackathon");
        assert_eq!(descriptor.docker.container, "wacodis-eo-dlm");
        assert_eq!(descriptor.docker.work_dir, "/public");
        assert_eq!(descriptor.parameter.input_epsg, "4326");
        assert_eq!(descriptor.command.folder, "/bin/ash");
        assert_eq!(descriptor.command.name, "/eo.sh");
        assert_eq!(descriptor.command.arguments.len(), 4);
        assert_eq!(descriptor.command.arguments[0].quantity, Quantity::Multiple);
        assert_eq!(
            descriptor.command.arguments[3].kind,
            ArgumentKind::StaticOption
        );
        descriptor.validate().expect("valid");
        assert_eq!(
            descriptor.referenced_inputs(),
            vec!["OPTICAL_IMAGES_SOURCES", "REFERENCE_DATA", "RESULT_PATH"]
        );
    }

    #[test]
    fn run_suffix_only_changes_the_container_name() {
        let descriptor = ToolDescriptor::from_yaml_str(LAND_COVER).expect("parse");
        let resolved = descriptor.with_run_suffix("_1700000000000");
        assert_eq!(resolved.docker.container, "wacodis-eo-dlm_1700000000000");
        assert_eq!(descriptor.docker.container, "wacodis-eo-dlm");

        let mut restored = resolved.clone();
        restored.docker.container = descriptor.docker.container.clone();
        assert_eq!(restored, descriptor);
    }

    #[test]
    fn any_non_blank_id_is_accepted() {
        let yaml = "id: {id}\nexecution: process\ndocker: {}\ncommand:\n  name: run\n";
        let spaced = ToolDescriptor::from_yaml_str(&yaml.replace("{id}", "\"Land Cover / v2\""))
            .expect("parse");
        spaced.validate().expect("spaces and slashes are fine");

        let blank = ToolDescriptor::from_yaml_str(&yaml.replace("{id}", "\"  \""))
            .expect("parse");
        let err = blank.validate().expect_err("blank id");
        assert!(err.to_string().contains("`id`"));
    }

    #[test]
    fn missing_command_section_is_a_parse_error() {
        let err = ToolDescriptor::from_yaml_str(
            r#"
id: broken
docker:
  image: alpine
"#,
        )
        .expect_err("missing command");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("command"));
    }

    #[test]
    fn unknown_argument_type_is_a_parse_error() {
        let err = ToolDescriptor::from_yaml_str(
            r#"
id: broken
docker: {}
command:
  name: run
  arguments:
    - name: -x
      type: dynamic
      value: X
"#,
        )
        .expect_err("unknown type");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_container_fields_fail_validation() {
        let descriptor = ToolDescriptor::from_yaml_str(
            r#"
id: gdal-warp
docker:
  image: osgeo/gdal
  workDir: /public
command:
  name: gdalwarp
"#,
        )
        .expect("parse");
        let err = descriptor.validate().expect_err("missing container");
        assert!(err.to_string().contains("docker.container"));
    }

    #[test]
    fn process_descriptors_do_not_need_container_fields() {
        let descriptor = ToolDescriptor::from_yaml_str(
            r#"
id: local-tool
execution: process
docker: {}
command:
  folder: /usr/local/bin
  name: classify
"#,
        )
        .expect("parse");
        descriptor.validate().expect("valid");
        assert_eq!(descriptor.execution, ExecutionKind::Process);
    }

    #[test]
    fn reader_parsing_matches_string_parsing() {
        let from_reader =
            ToolDescriptor::from_reader(LAND_COVER.as_bytes()).expect("parse reader");
        let from_str = ToolDescriptor::from_yaml_str(LAND_COVER).expect("parse str");
        assert_eq!(from_reader, from_str);
    }
}
