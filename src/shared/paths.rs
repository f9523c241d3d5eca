use std::path::Path;

/// Rewrites Windows separators so a host path can be handed to a container.
pub fn to_posix(path: &str) -> String {
    path.replace('\\', "/")
}

/// Joins `file_name` onto a container-side base directory using `/`.
pub fn posix_join(base: &str, file_name: &str) -> String {
    let base = to_posix(base);
    let file_name = to_posix(file_name);
    let file_name = file_name.trim_start_matches('/');
    if base.is_empty() {
        return file_name.to_string();
    }
    if base.ends_with('/') {
        format!("{base}{file_name}")
    } else {
        format!("{base}/{file_name}")
    }
}

pub fn file_name_of(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn posix_join_normalizes_separators() {
        assert_eq!(posix_join("/public", "a.tif"), "/public/a.tif");
        assert_eq!(posix_join("/public/", "/a.tif"), "/public/a.tif");
        assert_eq!(posix_join("C:\\data", "sub\\a.tif"), "C:/data/sub/a.tif");
        assert_eq!(posix_join("", "a.tif"), "a.tif");
    }

    #[test]
    fn file_name_of_returns_last_component() {
        assert_eq!(
            file_name_of(&PathBuf::from("/tmp/work/scene.tif")).as_deref(),
            Some("scene.tif")
        );
        assert_eq!(file_name_of(&PathBuf::from("/")), None);
    }
}
