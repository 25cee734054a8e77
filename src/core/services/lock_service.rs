//! Manual budget lock and reward points.

use tracing::{debug, info};

use crate::domain::WalletState;

pub struct LockService;

impl LockService {
    /// Returns a copy of `wallet` with the lock flag set to `locked`. While
    /// locked, every admission is rejected; there is no automatic unlock.
    pub fn set_lock(wallet: &WalletState, locked: bool) -> WalletState {
        let mut next = wallet.clone();
        next.budget_locked = locked;
        info!(locked, "budget lock updated");
        next
    }

    pub fn toggle_lock(wallet: &WalletState) -> WalletState {
        Self::set_lock(wallet, !wallet.budget_locked)
    }

    /// Reward accrual for under-budget days. Points are not earned yet, so
    /// the wallet comes back unchanged.
    pub fn accrue_daily_reward(wallet: &WalletState) -> WalletState {
        debug!(rewards = wallet.rewards, "daily reward accrual is a no-op");
        wallet.clone()
    }
}
