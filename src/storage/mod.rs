//! Persistence seam. Records are opaque JSON documents keyed by name; the
//! typed [`WalletRepository`] sits on top of any [`RecordStore`].
//!
//! Every save replaces the whole document, so concurrent writers resolve as
//! last-writer-wins.

pub mod json_backend;
pub mod memory;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::domain::{FinancialProfile, UserRecord, WalletState};
use crate::errors::{BudgetError, Result};

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;

pub const USER_RECORD: &str = "user";
pub const FINANCES_RECORD: &str = "userFinances";
pub const WALLET_RECORD: &str = "wallet";

/// Abstraction over key-value backends holding serialized records.
pub trait RecordStore: Send + Sync {
    /// Returns the stored document, or `None` when the record is absent.
    fn read(&self, name: &str) -> Result<Option<String>>;
    fn write(&self, name: &str, data: &str) -> Result<()>;
    fn remove(&self, name: &str) -> Result<()>;
}

/// Typed access to the `user`, `userFinances`, and `wallet` records.
pub struct WalletRepository {
    store: Box<dyn RecordStore>,
}

impl WalletRepository {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn load_wallet(&self) -> Result<WalletState> {
        self.load_record(WALLET_RECORD)
    }

    pub fn save_wallet(&self, wallet: &WalletState) -> Result<()> {
        self.save_record(WALLET_RECORD, wallet)
    }

    pub fn load_user(&self) -> Result<UserRecord> {
        self.load_record(USER_RECORD)
    }

    pub fn save_user(&self, user: &UserRecord) -> Result<()> {
        self.save_record(USER_RECORD, user)
    }

    pub fn load_finances(&self) -> Result<FinancialProfile> {
        self.load_record(FINANCES_RECORD)
    }

    pub fn save_finances(&self, finances: &FinancialProfile) -> Result<()> {
        self.save_record(FINANCES_RECORD, finances)
    }

    pub fn load_record<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let data = self
            .store
            .read(name)?
            .ok_or_else(|| BudgetError::NotFound(name.to_string()))?;
        debug!(record = name, bytes = data.len(), "loaded record");
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save_record<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.store.write(name, &json)?;
        debug!(record = name, bytes = json.len(), "saved record");
        Ok(())
    }

    pub fn remove_record(&self, name: &str) -> Result<()> {
        self.store.remove(name)
    }
}
