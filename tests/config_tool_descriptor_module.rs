use eoexec::config::{
    load_settings, ArgumentKind, ConfigError, ExecutionKind, Quantity, ToolRegistry,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn registry_loads_descriptor_with_numeric_epsg_and_ports() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("gdal-warp.yml"),
        r#"
id: gdal-warp
docker:
  host: tcp://127.0.0.1:2375
  image: osgeo/gdal:alpine-small-latest
  container: gdal-warp
  workDir: /public
  ports: ["8080:80"]
command:
  name: gdalwarp
  arguments:
    - name: -t_srs
      type: wps-process-reference
      value: TARGET_EPSG
    - name: -ot
      type: static-option
      value: Byte
    - name: ""
      type: wps-process-reference
      value: INPUT
      quantity: multiple
      separator: " "
parameter:
  inputEpsg: 32632
  resampling: near
"#,
    )
    .expect("write");

    let descriptor = ToolRegistry::new(dir.path())
        .load("gdal-warp.yml")
        .expect("load");
    assert_eq!(descriptor.execution, ExecutionKind::Docker);
    assert_eq!(descriptor.docker.ports, vec!["8080:80".to_string()]);
    assert_eq!(descriptor.parameter.input_epsg, "32632");
    assert!(descriptor.parameter.extra.contains_key("resampling"));
    assert_eq!(descriptor.command.arguments[1].kind, ArgumentKind::StaticOption);
    assert_eq!(descriptor.command.arguments[2].quantity, Quantity::Multiple);
    assert_eq!(descriptor.command.arguments[2].separator.as_deref(), Some(" "));
}

#[test]
fn settings_file_is_loaded_and_validated() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("settings.yaml");
    fs::write(
        &path,
        format!(
            "work_dir: {work}\ntool_config_dir: {tools}\nepsg: EPSG:32632\npoll_interval_ms: 20\nusername: hub-user\npassword: s3cret\n",
            work = dir.path().join("work").display(),
            tools = dir.path().join("tools").display(),
        ),
    )
    .expect("write");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.epsg, "EPSG:32632");
    assert_eq!(settings.poll_interval_ms, 20);
    assert_eq!(settings.credentials(), Some(("hub-user", "s3cret")));
}

#[test]
fn invalid_settings_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("settings.yaml");
    fs::write(
        &path,
        "work_dir: relative/work\ntool_config_dir: /srv/tools\nepsg: 4326\n",
    )
    .expect("write");
    let err = load_settings(Some(&path)).expect_err("relative work dir");
    assert!(matches!(err, ConfigError::Settings(_)));
}
