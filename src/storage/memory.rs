use std::collections::HashMap;
use std::sync::Mutex;

use super::RecordStore;
use crate::errors::{BudgetError, Result};

/// In-process record store, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryStorage {
    fn read(&self, name: &str) -> Result<Option<String>> {
        let records = self.records.lock().map_err(poisoned)?;
        Ok(records.get(name).cloned())
    }

    fn write(&self, name: &str, data: &str) -> Result<()> {
        let mut records = self.records.lock().map_err(poisoned)?;
        records.insert(name.to_string(), data.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let mut records = self.records.lock().map_err(poisoned)?;
        records.remove(name);
        Ok(())
    }
}

fn poisoned<T>(_: T) -> BudgetError {
    BudgetError::Storage("in-memory store lock poisoned".into())
}
