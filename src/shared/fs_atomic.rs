use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn sibling_tmp_path(path: &Path) -> io::Result<PathBuf> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("path has no parent"))?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or(0);
    Ok(parent.join(format!(
        ".{}.tmp-{}-{nanos}",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("output"),
        std::process::id(),
    )))
}

/// Writes `content` to a sibling temp file, then renames it over `path`.
/// Readers never observe a half-written product file.
pub fn atomic_write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp_path = sibling_tmp_path(path)?;
    let written = (|| {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()
    })();
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    fs::rename(&tmp_path, path)
}

/// Copies `source` to `target` through a temp file; copying a file onto
/// itself is a no-op.
pub fn atomic_copy_file(source: &Path, target: &Path) -> io::Result<()> {
    if let (Ok(from), Ok(to)) = (fs::canonicalize(source), fs::canonicalize(target)) {
        if from == to {
            return Ok(());
        }
    }
    let tmp_path = sibling_tmp_path(target)?;
    if let Err(err) = fs::copy(source, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    fs::rename(&tmp_path, target)
}
