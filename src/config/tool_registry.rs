use super::{ConfigError, ToolDescriptor};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves tool descriptors by file name inside the tool config directory.
///
/// Every lookup parses the file again; callers own the returned value.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    dir: PathBuf,
}

impl ToolRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn load(&self, name: &str) -> Result<ToolDescriptor, ConfigError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ConfigError::UnknownTool {
                name: name.to_string(),
                dir: self.dir.display().to_string(),
            });
        }
        let descriptor = ToolDescriptor::from_path(&path)?;
        descriptor.validate()?;
        debug!(
            tool = %descriptor.id,
            path = %path.display(),
            "parsed tool descriptor"
        );
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const GDAL_WARP: &str = r#"
id: gdal-warp
docker:
  host: unix:///var/run/docker.sock
  image: osgeo/gdal:alpine-small-latest
  container: gdal-warp
  workDir: /public
command:
  name: gdalwarp
  arguments:
    - name: -t_srs
      type: wps-process-reference
      value: TARGET_EPSG
    - name: ""
      type: wps-process-reference
      value: INPUT
    - name: ""
      type: wps-process-reference
      value: OUTPUT
"#;

    #[test]
    fn loads_fresh_independent_instances() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("gdal-warp.yml"), GDAL_WARP).expect("write");
        let registry = ToolRegistry::new(dir.path());

        let first = registry.load("gdal-warp.yml").expect("first");
        let mut second = registry.load("gdal-warp.yml").expect("second");
        assert_eq!(first, second);

        second.docker.container.push_str("_changed");
        assert_eq!(first.docker.container, "gdal-warp");
    }

    #[test]
    fn unknown_tool_names_the_directory() {
        let dir = tempdir().expect("tempdir");
        let registry = ToolRegistry::new(dir.path());
        let err = registry.load("missing.yml").expect_err("missing");
        match err {
            ConfigError::UnknownTool { name, .. } => assert_eq!(name, "missing.yml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_descriptors_are_rejected_on_load() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("broken.yml"),
            "id: broken\ndocker: {}\ncommand:\n  name: run\n",
        )
        .expect("write");
        let registry = ToolRegistry::new(dir.path());
        let err = registry.load("broken.yml").expect_err("invalid");
        assert!(matches!(err, ConfigError::Descriptor { .. }));
    }
}
