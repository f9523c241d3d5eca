use super::PreprocessingError;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The kind of value an operator or writer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    FeatureCollection,
    FileData,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeatureCollection => f.write_str("feature-collection"),
            Self::FileData => f.write_str("file-data"),
        }
    }
}

/// A stateless transformation step.
pub trait Operator<T>: Send + Sync {
    fn name(&self) -> &str;
    fn supported_kind(&self) -> DataKind;
    fn process(&self, input: T) -> Result<T, PreprocessingError>;
}

/// Terminal step that serializes a value and reports the produced file.
pub trait Writer<T>: Send + Sync {
    fn name(&self) -> &str;
    fn target(&self) -> &Path;
    fn supported_kind(&self) -> DataKind;
    fn write(&self, input: T) -> Result<PathBuf, PreprocessingError>;
}

/// Adapts a closure into an [`Operator`].
pub struct FnOperator<F> {
    name: String,
    kind: DataKind,
    f: F,
}

impl<F> FnOperator<F> {
    pub fn new(name: impl Into<String>, kind: DataKind, f: F) -> Self {
        Self {
            name: name.into(),
            kind,
            f,
        }
    }
}

impl<T, F> Operator<T> for FnOperator<F>
where
    F: Fn(T) -> Result<T, PreprocessingError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_kind(&self) -> DataKind {
        self.kind
    }

    fn process(&self, input: T) -> Result<T, PreprocessingError> {
        (self.f)(input)
    }
}

/// Ordered operators followed by exactly one writer.
pub struct Pipeline<T> {
    operators: Vec<Box<dyn Operator<T>>>,
    writer: Box<dyn Writer<T>>,
}

impl<T: 'static> Pipeline<T> {
    pub fn new(writer: impl Writer<T> + 'static) -> Self {
        Self {
            operators: Vec::new(),
            writer: Box::new(writer),
        }
    }

    pub fn with_operator(mut self, operator: impl Operator<T> + 'static) -> Self {
        self.operators.push(Box::new(operator));
        self
    }

    pub fn with_fn<F>(self, name: impl Into<String>, kind: DataKind, f: F) -> Self
    where
        F: Fn(T) -> Result<T, PreprocessingError> + Send + Sync + 'static,
    {
        self.with_operator(FnOperator::new(name, kind, f))
    }

    pub fn operator_names(&self) -> Vec<&str> {
        self.operators.iter().map(|operator| operator.name()).collect()
    }

    pub fn writer_target(&self) -> &Path {
        self.writer.target()
    }

    /// Threads `input` through every operator in order, then writes it.
    pub fn execute(self, input: T) -> Result<PathBuf, PreprocessingError> {
        let mut value = input;
        for operator in &self.operators {
            debug!(
                operator = operator.name(),
                kind = %operator.supported_kind(),
                "applying preprocessing operator"
            );
            value = operator.process(value)?;
        }

        let writer = &self.writer;
        let written = writer.write(value)?;
        if !written.is_file() {
            return Err(PreprocessingError::writer(
                writer.name(),
                format!("reported file {} does not exist", written.display()),
            ));
        }
        info!(
            writer = writer.name(),
            kind = %writer.supported_kind(),
            operators = self.operators.len(),
            output = %written.display(),
            "preprocessing pipeline finished"
        );
        Ok(written)
    }
}
