use super::{CancelFlag, ExecutionBackend, ExecutionError, ProcessResult, NO_EXIT_CODE};
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reads a pipe to its end on a separate thread. Bytes are kept raw so
/// output that is not UTF-8 still survives.
fn drain<R: Read + Send + 'static>(pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        BufReader::new(pipe).read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(reader: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    reader
        .join()
        .map_err(|_| io::Error::other("pipe reader thread panicked"))?
}

/// Runs a materialized argv as a host child process.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    tokens: Vec<String>,
    working_dir: Option<PathBuf>,
    poll_interval: Duration,
}

impl ProcessBackend {
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            working_dir: None,
            poll_interval: Duration::from_millis(10),
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl ExecutionBackend for ProcessBackend {
    fn describe(&self) -> String {
        self.tokens.join(" ")
    }

    fn execute(&self, cancel: &CancelFlag) -> Result<ProcessResult, ExecutionError> {
        let (program, args) = self
            .tokens
            .split_first()
            .ok_or_else(|| ExecutionError::EmptyCommand("process".to_string()))?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        info!(command = %self.describe(), "spawning tool process");
        let mut child = command.spawn().map_err(|source| ExecutionError::Spawn {
            program: program.clone(),
            source,
        })?;

        let io_error = |source: std::io::Error| ExecutionError::Io {
            program: program.clone(),
            source,
        };
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io_error(std::io::Error::other("missing stdout pipe")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io_error(std::io::Error::other("missing stderr pipe")))?;

        // Both pipes are drained while we wait; a full pipe would block the child.
        let stdout_reader = drain(stdout);
        let stderr_reader = drain(stderr);

        let exit_status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if cancel.is_cancelled() {
                        warn!(program = %program, "cancellation requested, killing tool process");
                        let _ = child.kill();
                        let _ = child.wait();
                        // Readers finish on their own once every pipe writer is gone.
                        return Err(ExecutionError::Interrupted(program.clone()));
                    }
                    thread::sleep(self.poll_interval);
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(io_error(err));
                }
            }
        };

        let mut bytes = collect(stdout_reader).map_err(io_error)?;
        bytes.extend(collect(stderr_reader).map_err(io_error)?);
        let output = String::from_utf8_lossy(&bytes).into_owned();

        let code = exit_status.code().unwrap_or(NO_EXIT_CODE);
        debug!(program = %program, exit_code = code, "tool process finished");
        Ok(ProcessResult::new(code, output))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ProcessBackend {
        ProcessBackend::new(vec!["sh".to_string(), "-c".to_string(), script.to_string()])
    }

    #[test]
    fn captures_exit_code_and_combined_output() {
        let result = sh("echo out; echo err 1>&2; exit 3")
            .execute(&CancelFlag::new())
            .expect("run");
        assert_eq!(result.result_code(), 3);
        assert_eq!(result.output_message(), "out\nerr\n");
    }

    #[test]
    fn output_that_is_not_utf8_is_kept_lossily() {
        let result = sh("printf 'tool failure: bad\\377input\\n'; exit 2")
            .execute(&CancelFlag::new())
            .expect("run");
        assert_eq!(result.result_code(), 2);
        assert!(result.output_message().contains("tool failure: bad"));
        assert!(result.output_message().contains("input"));
        assert!(result.output_message().contains('\u{FFFD}'));
    }

    #[test]
    fn large_output_does_not_block_the_child() {
        let result = sh("i=0; while [ $i -lt 20000 ]; do echo line-$i; i=$((i+1)); done")
            .execute(&CancelFlag::new())
            .expect("run");
        assert!(result.is_success());
        assert_eq!(result.output_message().lines().count(), 20000);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let err = ProcessBackend::new(vec!["/definitely/not/here".to_string()])
            .execute(&CancelFlag::new())
            .expect_err("spawn");
        assert!(matches!(err, ExecutionError::Spawn { .. }));
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = ProcessBackend::new(Vec::new())
            .execute(&CancelFlag::new())
            .expect_err("empty");
        assert!(matches!(err, ExecutionError::EmptyCommand(_)));
    }

    #[test]
    fn cancelled_wait_kills_the_child() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = sh("sleep 5").execute(&cancel).expect_err("interrupted");
        assert!(matches!(err, ExecutionError::Interrupted(_)));
    }
}
