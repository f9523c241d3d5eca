use std::path::{Path, PathBuf};

pub const GEOTIFF_MIME_TYPE: &str = "image/geotiff";
pub const GEOJSON_MIME_TYPE: &str = "application/geo+json";

/// A file on disk plus its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    pub path: PathBuf,
    pub mime_type: String,
}

impl FileData {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn geotiff(path: impl Into<PathBuf>) -> Self {
        Self::new(path, GEOTIFF_MIME_TYPE)
    }

    /// Media type from the extension; unknown extensions are octet streams.
    pub fn from_extension(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = mime_type_for(&path);
        Self::new(path, mime_type)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "tif" | "tiff" => GEOTIFF_MIME_TYPE,
        "geojson" | "json" => GEOJSON_MIME_TYPE,
        "zip" => "application/zip",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}
