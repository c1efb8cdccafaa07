//! In-memory record store for testing and development.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error::Result;
use crate::traits::RecordStore;

/// In-memory row store. Clones share the same underlying rows.
///
/// Useful for tests and development. Not suitable for production as data is
/// lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<Vec<Vec<String>>>>,
    append_calls: Arc<RwLock<Vec<usize>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with rows (header included).
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        let store = Self::new();
        *store.rows.write().unwrap() = rows;
        store
    }

    /// Get the number of stored rows.
    pub fn row_count(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    /// Snapshot of all rows.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.read().unwrap().clone()
    }

    /// Sizes of each `append_rows` call, for chunking assertions.
    pub fn append_call_sizes(&self) -> Vec<usize> {
        self.append_calls.read().unwrap().clone()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            append_calls: Arc::clone(&self.append_calls),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows.read().unwrap().clone())
    }

    async fn append_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        self.append_calls.write().unwrap().push(rows.len());
        self.rows.write().unwrap().extend_from_slice(rows);
        Ok(())
    }
}
