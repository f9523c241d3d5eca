#[derive(Debug, thiserror::Error)]
pub enum PreprocessingError {
    #[error("operator `{operator}` failed: {reason}")]
    Operator { operator: String, reason: String },
    #[error("writer `{writer}` failed: {reason}")]
    Writer { writer: String, reason: String },
    #[error("invalid EPSG code `{value}`, expected e.g. EPSG:4326")]
    InvalidCrs { value: String },
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch source `{reference}`: {source}")]
    Fetch {
        reference: String,
        #[source]
        source: std::io::Error,
    },
    #[error("none of the {attempted} sources could be preprocessed: {}", .failures.join("; "))]
    NoSourcesProcessed {
        attempted: usize,
        failures: Vec<String>,
    },
}

impl PreprocessingError {
    pub fn operator(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Operator {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    pub fn writer(writer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Writer {
            writer: writer.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
