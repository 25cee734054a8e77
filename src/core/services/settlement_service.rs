//! Day-boundary handling for the spending counters.
//!
//! Both policies default to doing nothing: `spent` accumulates across days
//! and savings never accrue unless a rollover and settlement are configured.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::WalletState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverPolicy {
    #[default]
    Never,
    /// Zero the counters when the UTC date moves past `period_start`.
    Daily,
}

/// What happens to unspent money when a period closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementPolicy {
    #[default]
    None,
    /// Unspent usable amount moves into savings.
    RollUnspentUsable,
}

pub struct SettlementService;

impl SettlementService {
    /// Returns `wallet` ready for spending at `now`.
    ///
    /// A wallet without a `period_start` is stamped with today's date and
    /// otherwise left alone.
    pub fn reset_if_new_day(
        wallet: &WalletState,
        now: DateTime<Utc>,
        rollover: RolloverPolicy,
        settlement: SettlementPolicy,
    ) -> WalletState {
        if rollover == RolloverPolicy::Never {
            return wallet.clone();
        }
        let today = now.date_naive();
        let mut next = wallet.clone();
        match wallet.period_start {
            None => next.period_start = Some(today),
            Some(start) if today > start => {
                let settled = Self::settle(&next, settlement);
                next.savings += settled;
                for category in next.categories.values_mut() {
                    category.spent = 0.0;
                }
                next.period_start = Some(today);
                info!(%start, %today, settled, "spending period rolled over");
            }
            Some(_) => {}
        }
        next
    }

    /// Amount moved into savings when the current period closes.
    pub fn settle(wallet: &WalletState, settlement: SettlementPolicy) -> f64 {
        match settlement {
            SettlementPolicy::None => 0.0,
            SettlementPolicy::RollUnspentUsable => {
                (wallet.usable_amount - wallet.total_spent()).max(0.0)
            }
        }
    }
}
