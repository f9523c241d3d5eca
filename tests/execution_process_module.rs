#![cfg(unix)]

use eoexec::command::CommandValue;
use eoexec::config::BackendSettings;
use eoexec::execution::{CancelFlag, ExecutionBackend, ExecutionError, ProcessBackend};
use eoexec::orchestration::{OrchestratorError, SequentialRunIds, SystemBackends, ToolExecutor};
use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}

fn write_descriptor(tool_dir: &Path, name: &str, script: &str) {
    fs::write(
        tool_dir.join(name),
        format!(
            "id: {id}\nexecution: process\ndocker: {{}}\ncommand:\n  folder: {folder}\n  name: {script}\n  arguments:\n    - name: --input\n      type: wps-process-reference\n      value: INPUT\n",
            id = name.trim_end_matches(".yml"),
            folder = tool_dir.display(),
        ),
    )
    .expect("write descriptor");
}

fn executor(work_dir: &Path, tool_dir: &Path) -> ToolExecutor {
    let settings = Arc::new(BackendSettings::new(work_dir, tool_dir));
    ToolExecutor::new(
        Arc::clone(&settings),
        Arc::new(SequentialRunIds::new()),
        Arc::new(SystemBackends::new(settings)),
    )
}

#[test]
fn successful_process_reports_zero_and_output() {
    let dir = tempdir().expect("tempdir");
    let script = dir.path().join("tool.sh");
    write_script(&script, "#!/bin/sh\necho done\nexit 0\n");

    let result = ProcessBackend::new(vec![script.display().to_string()])
        .execute(&CancelFlag::new())
        .expect("run");
    assert_eq!(result.result_code(), 0);
    assert_eq!(result.output_message(), "done\n");
}

#[test]
fn tool_executor_passes_bound_arguments_to_the_process() {
    let work = tempdir().expect("work");
    let tools = tempdir().expect("tools");
    write_script(
        &tools.path().join("echo-args.sh"),
        "#!/bin/sh\necho \"$@\"\n",
    );
    write_descriptor(tools.path(), "echo-args.yml", "echo-args.sh");

    let executor = executor(work.path(), tools.path());
    let (descriptor, suffix) = executor.resolve("echo-args.yml").expect("resolve");
    assert_eq!(suffix, "_run1");
    let values = BTreeMap::from([("INPUT".to_string(), CommandValue::single("scene.tif"))]);
    let result = executor
        .run(&descriptor, &values, &CancelFlag::new())
        .expect("run");
    assert_eq!(result.output_message(), "--input scene.tif\n");
}

#[test]
fn non_zero_exit_surfaces_code_and_output() {
    let work = tempdir().expect("work");
    let tools = tempdir().expect("tools");
    write_script(
        &tools.path().join("fail.sh"),
        "#!/bin/sh\necho 'tool failure: bad input' 1>&2\nexit 2\n",
    );
    write_descriptor(tools.path(), "fail.yml", "fail.sh");

    let executor = executor(work.path(), tools.path());
    let (descriptor, _) = executor.resolve("fail.yml").expect("resolve");
    let values = BTreeMap::from([("INPUT".to_string(), CommandValue::single("a.tif"))]);
    let err = executor
        .run(&descriptor, &values, &CancelFlag::new())
        .expect_err("non-zero exit");

    assert_eq!(err.tool_exit_code(), Some(2));
    match err {
        OrchestratorError::Execution(ExecutionError::NonZeroExit {
            tool,
            exit_code,
            output,
            ..
        }) => {
            assert_eq!(tool, "fail");
            assert_eq!(exit_code, 2);
            assert!(output.contains("tool failure: bad input"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn failure_output_with_invalid_utf8_is_not_lost() {
    let dir = tempdir().expect("tempdir");
    let script = dir.path().join("bad-bytes.sh");
    write_script(
        &script,
        "#!/bin/sh\nprintf 'tool failure: bad\\377input\\n'\nexit 2\n",
    );

    let result = ProcessBackend::new(vec![script.display().to_string()])
        .execute(&CancelFlag::new())
        .expect("run");
    assert_eq!(result.result_code(), 2);
    assert!(result.output_message().contains("tool failure"));
    assert!(result.output_message().ends_with("input\n"));
}

#[test]
fn unbound_input_fails_before_spawning() {
    let work = tempdir().expect("work");
    let tools = tempdir().expect("tools");
    let marker = work.path().join("spawned");
    write_script(
        &tools.path().join("touch.sh"),
        &format!("#!/bin/sh\ntouch {}\n", marker.display()),
    );
    write_descriptor(tools.path(), "touch.yml", "touch.sh");

    let executor = executor(work.path(), tools.path());
    let (descriptor, _) = executor.resolve("touch.yml").expect("resolve");
    let err = executor
        .run(&descriptor, &BTreeMap::new(), &CancelFlag::new())
        .expect_err("unbound");
    assert!(matches!(err, OrchestratorError::Materialize(_)));
    assert!(!marker.exists());
}
