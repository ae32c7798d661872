//! Test and helper mocks for stride_core

use std::collections::HashMap;

use stride_traits::{StateStore, StepSink};

/// In-memory `StateStore` with no durability. Used across the core tests
/// and as the restart-simulation vehicle (clone it to "survive" a restart).
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    ints: HashMap<String, i64>,
    floats: HashMap<String, f64>,
}

impl StateStore for MemStore {
    fn get_i64(&self, key: &str) -> Option<i64> {
        self.ints.get(key).copied()
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.floats.get(key).copied()
    }

    fn put_i64(
        &mut self,
        key: &str,
        value: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.ints.insert(key.to_owned(), value);
        Ok(())
    }

    fn put_f64(
        &mut self,
        key: &str,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.floats.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.ints.remove(key);
        self.floats.remove(key);
        Ok(())
    }
}

/// Sink that drops every emission.
pub struct NullSink;

impl StepSink for NullSink {
    fn emit(&self, _steps_today: u32) {}
}
