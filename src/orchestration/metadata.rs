use serde::{Deserialize, Serialize};
use std::path::Path;

/// Description of one produced result, returned alongside the product file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    pub process_id: String,
    pub tool_id: String,
    pub product_name: String,
    pub output_file: String,
    pub mime_type: String,
    pub source_references: Vec<String>,
    pub run_suffix: String,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
}

impl ProductMetadata {
    pub fn new(
        process_id: &str,
        tool_id: &str,
        output_file: &Path,
        mime_type: &str,
        source_references: Vec<String>,
        run_suffix: &str,
    ) -> Self {
        Self {
            process_id: process_id.to_string(),
            tool_id: tool_id.to_string(),
            product_name: output_file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            output_file: output_file.display().to_string(),
            mime_type: mime_type.to_string(),
            source_references,
            run_suffix: run_suffix.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
