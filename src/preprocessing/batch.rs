use super::PreprocessingError;
use std::fmt::Display;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<T> {
    /// Outputs of every source that succeeded, in source order.
    pub processed: Vec<T>,
    /// One message per failed source.
    pub failures: Vec<String>,
}

/// Runs `step` for every source and keeps going past individual failures.
///
/// Fails with [`PreprocessingError::NoSourcesProcessed`] only when no
/// source produced any output.
pub fn preprocess_batch<S, T, E, F>(
    sources: &[S],
    mut step: F,
) -> Result<BatchOutcome<T>, PreprocessingError>
where
    S: Display,
    E: Display,
    F: FnMut(&S) -> Result<Vec<T>, E>,
{
    let mut outcome = BatchOutcome {
        processed: Vec::new(),
        failures: Vec::new(),
    };
    for source in sources {
        match step(source) {
            Ok(outputs) => outcome.processed.extend(outputs),
            Err(err) => {
                warn!(source = %source, error = %err, "skipping source that failed preprocessing");
                outcome.failures.push(format!("{source}: {err}"));
            }
        }
    }

    if outcome.processed.is_empty() {
        return Err(PreprocessingError::NoSourcesProcessed {
            attempted: sources.len(),
            failures: outcome.failures,
        });
    }
    info!(
        processed = outcome.processed.len(),
        failed = outcome.failures.len(),
        "batch preprocessing finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failures_are_skipped() {
        let outcome = preprocess_batch(&["a", "bad", "c"], |source| {
            if *source == "bad" {
                Err(PreprocessingError::operator("fetch", "unreachable"))
            } else {
                Ok(vec![format!("{source}.tif")])
            }
        })
        .expect("batch");
        assert_eq!(outcome.processed, vec!["a.tif".to_string(), "c.tif".to_string()]);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].starts_with("bad: "));
    }

    #[test]
    fn all_failures_fail_the_batch() {
        let err = preprocess_batch(&["x", "y"], |_| -> Result<Vec<String>, _> {
            Err(PreprocessingError::operator("fetch", "unreachable"))
        })
        .expect_err("nothing processed");
        match err {
            PreprocessingError::NoSourcesProcessed { attempted, failures } => {
                assert_eq!(attempted, 2);
                assert_eq!(failures.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_batch_fails() {
        let err = preprocess_batch(&Vec::<String>::new(), |_| {
            Ok::<_, PreprocessingError>(vec![1])
        })
        .expect_err("empty");
        assert!(matches!(
            err,
            PreprocessingError::NoSourcesProcessed { attempted: 0, .. }
        ));
    }
}
