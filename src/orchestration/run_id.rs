use crate::shared::ids::random_hex_id;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the identifiers that keep concurrent runs apart.
pub trait RunIdGenerator: Send + Sync {
    /// Appended to container names, including its leading separator.
    fn next_suffix(&self) -> Result<String, String>;

    /// Unique part of a result product name.
    fn next_product_id(&self) -> Result<String, String>;
}

/// OS-random hex identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRunIds;

impl RunIdGenerator for RandomRunIds {
    fn next_suffix(&self) -> Result<String, String> {
        Ok(format!("_{}", random_hex_id(6)?))
    }

    fn next_product_id(&self) -> Result<String, String> {
        random_hex_id(16)
    }
}

/// Deterministic counter, for tests and reproducible runs.
#[derive(Debug, Default)]
pub struct SequentialRunIds {
    counter: AtomicU64,
}

impl SequentialRunIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl RunIdGenerator for SequentialRunIds {
    fn next_suffix(&self) -> Result<String, String> {
        Ok(format!("_run{}", self.next()))
    }

    fn next_product_id(&self) -> Result<String, String> {
        Ok(format!("p{}", self.next()))
    }
}
