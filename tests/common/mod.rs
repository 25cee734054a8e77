#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use daily_budget::{
    config::ConfigManager,
    core::wallet_manager::WalletManager,
    domain::{DailyHabits, UserProfile},
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a fresh data directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn storage_in(base: &Path) -> JsonStorage {
    JsonStorage::new(Some(base.to_path_buf()), Some(3)).expect("create json storage backend")
}

/// Creates isolated managers backed by a unique directory for each test.
pub fn setup_test_env() -> (WalletManager, ConfigManager, PathBuf) {
    let base = temp_base();
    let manager = WalletManager::new(Box::new(storage_in(&base)));
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (manager, config_manager, base)
}

/// Signs up, completes setup, and derives the sample wallet.
pub fn onboard(manager: &WalletManager, habits: &DailyHabits) {
    manager
        .sign_up(UserProfile::new("Asha Rao", "asha@example.com"))
        .expect("sign up");
    manager.complete_setup(50000.0, 3000.0).expect("setup");
    manager.submit_daily_habits(habits).expect("habits");
}

pub fn sample_habits() -> DailyHabits {
    DailyHabits::new(50.0)
        .with_category("tiffin", 10.0)
        .with_category("lunch", 15.0)
        .with_category("dinner", 15.0)
        .with_category("transport", 10.0)
}
