use super::SourceFetcher;
use crate::shared::fs_atomic::atomic_copy_file;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serves plain paths and `file://` URLs from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSourceFetcher;

impl LocalSourceFetcher {
    pub fn new() -> Self {
        Self
    }
}

fn local_path(reference: &str) -> io::Result<PathBuf> {
    let trimmed = reference.trim();
    match trimmed.strip_prefix("file://") {
        Some(rest) => {
            let decoded = urlencoding::decode(rest).map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid file url `{reference}`: {err}"),
                )
            })?;
            Ok(PathBuf::from(decoded.into_owned()))
        }
        None => Ok(PathBuf::from(trimmed)),
    }
}

impl SourceFetcher for LocalSourceFetcher {
    fn fetch(&self, reference: &str, out_dir: &Path) -> io::Result<PathBuf> {
        let path = local_path(reference)?;
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("source file {} does not exist", path.display()),
            ));
        }
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("source {} has no file name", path.display()),
            )
        })?;

        fs::create_dir_all(out_dir)?;
        let staged = out_dir.join(file_name);
        let already_staged = match (fs::canonicalize(&path), fs::canonicalize(out_dir)) {
            (Ok(source), Ok(dir)) => source.parent() == Some(dir.as_path()),
            _ => false,
        };
        if already_staged {
            return Ok(path);
        }
        atomic_copy_file(&path, &staged)?;
        debug!(source = %path.display(), staged = %staged.display(), "staged local source");
        Ok(staged)
    }
}
