use super::pipeline::{DataKind, Writer};
use super::{FeatureCollection, FileData, PreprocessingError};
use crate::shared::fs_atomic::{atomic_copy_file, atomic_write_file};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

fn ensure_parent(writer: &str, target: &Path) -> Result<(), PreprocessingError> {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| PreprocessingError::io(parent, source))
        }
        Some(_) => Ok(()),
        None => Err(PreprocessingError::writer(
            writer,
            format!("target {} has no parent directory", target.display()),
        )),
    }
}

/// Writes a feature collection as GeoJSON.
#[derive(Debug, Clone)]
pub struct GeoJsonWriter {
    target: PathBuf,
}

impl GeoJsonWriter {
    pub const NAME: &'static str = "geojson-writer";

    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Writer<FeatureCollection> for GeoJsonWriter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn target(&self) -> &Path {
        &self.target
    }

    fn supported_kind(&self) -> DataKind {
        DataKind::FeatureCollection
    }

    fn write(&self, input: FeatureCollection) -> Result<PathBuf, PreprocessingError> {
        ensure_parent(Self::NAME, &self.target)?;
        let json = input
            .to_json_string()
            .map_err(|err| PreprocessingError::writer(Self::NAME, err.to_string()))?;
        atomic_write_file(&self.target, json.as_bytes())
            .map_err(|source| PreprocessingError::io(&self.target, source))?;
        debug!(target = %self.target.display(), features = input.len(), "wrote geojson");
        Ok(self.target.clone())
    }
}

/// Materializes an existing file at the target path.
#[derive(Debug, Clone)]
pub struct FileDataWriter {
    target: PathBuf,
}

impl FileDataWriter {
    pub const NAME: &'static str = "file-data-writer";

    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Writer<FileData> for FileDataWriter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn target(&self) -> &Path {
        &self.target
    }

    fn supported_kind(&self) -> DataKind {
        DataKind::FileData
    }

    fn write(&self, input: FileData) -> Result<PathBuf, PreprocessingError> {
        if !input.path.is_file() {
            return Err(PreprocessingError::writer(
                Self::NAME,
                format!("source file {} does not exist", input.path.display()),
            ));
        }
        ensure_parent(Self::NAME, &self.target)?;
        atomic_copy_file(&input.path, &self.target)
            .map_err(|source| PreprocessingError::io(&self.target, source))?;
        debug!(
            source = %input.path.display(),
            target = %self.target.display(),
            mime_type = %input.mime_type,
            "copied file data"
        );
        Ok(self.target.clone())
    }
}
