//! Derives the initial wallet from declared daily habits.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::{
    CategoryLimit, DailyHabits, WalletState, BUFFER_RATIO, OTHER_CATEGORY, USABLE_RATIO,
};
use crate::errors::{BudgetError, Result};

const SUM_TOLERANCE: f64 = 1e-9;
const MAX_DAYS_IN_MONTH: f64 = 31.0;

pub struct AllocationService;

impl AllocationService {
    /// Splits the daily spend into usable amount and buffer, and turns each
    /// declared habit into a category limit. Whatever the habits leave over
    /// lands in the synthetic `other` category.
    pub fn derive_wallet_allocation(
        habits: &DailyHabits,
        monthly_budget: f64,
    ) -> Result<WalletState> {
        Self::derive_wallet_allocation_on(habits, monthly_budget, None)
    }

    /// Same as [`derive_wallet_allocation`](Self::derive_wallet_allocation), stamping
    /// the spending period the fresh counters belong to.
    pub fn derive_wallet_allocation_on(
        habits: &DailyHabits,
        monthly_budget: f64,
        period_start: Option<NaiveDate>,
    ) -> Result<WalletState> {
        let daily_spend = habits.daily_spend;
        if !daily_spend.is_finite() || daily_spend <= 0.0 {
            return Err(BudgetError::InvalidAllocation(format!(
                "daily spend must be a positive amount, got {daily_spend}"
            )));
        }
        if !monthly_budget.is_finite() || monthly_budget < 0.0 {
            return Err(BudgetError::InvalidAllocation(format!(
                "monthly budget must be a non-negative amount, got {monthly_budget}"
            )));
        }

        let categories = Self::build_categories(habits)?;

        if daily_spend * MAX_DAYS_IN_MONTH > monthly_budget {
            warn!(
                daily_spend,
                monthly_budget, "daily spend may not fit inside the monthly budget"
            );
        }

        let wallet = WalletState {
            balance: daily_spend,
            usable_amount: daily_spend * USABLE_RATIO,
            buffer: daily_spend * BUFFER_RATIO,
            categories,
            transactions: Vec::new(),
            savings: 0.0,
            budget_locked: false,
            rewards: 0,
            period_start,
        };
        info!(
            daily_spend,
            usable = wallet.usable_amount,
            buffer = wallet.buffer,
            categories = wallet.categories.len(),
            "derived wallet allocation"
        );
        Ok(wallet)
    }

    fn build_categories(habits: &DailyHabits) -> Result<BTreeMap<String, CategoryLimit>> {
        let mut categories: BTreeMap<String, CategoryLimit> = BTreeMap::new();
        for (raw_name, &amount) in &habits.categories {
            let name = raw_name.trim();
            if name.is_empty() {
                return Err(BudgetError::InvalidAllocation(
                    "category names cannot be empty".into(),
                ));
            }
            if name.eq_ignore_ascii_case(OTHER_CATEGORY) {
                return Err(BudgetError::InvalidAllocation(format!(
                    "`{OTHER_CATEGORY}` is reserved for the unallocated remainder"
                )));
            }
            if !amount.is_finite() || amount < 0.0 {
                return Err(BudgetError::InvalidAllocation(format!(
                    "category `{name}` needs a non-negative amount, got {amount}"
                )));
            }
            if categories
                .keys()
                .any(|existing| existing.eq_ignore_ascii_case(name))
            {
                return Err(BudgetError::InvalidAllocation(format!(
                    "category `{name}` declared twice"
                )));
            }
            categories.insert(name.to_string(), CategoryLimit::new(name, amount));
        }

        let declared = habits.declared_total();
        let remainder = habits.daily_spend - declared;
        if remainder < -SUM_TOLERANCE {
            return Err(BudgetError::InvalidAllocation(format!(
                "declared categories total {declared:.2} which exceeds the daily spend of {:.2}",
                habits.daily_spend
            )));
        }
        categories.insert(
            OTHER_CATEGORY.to_string(),
            CategoryLimit::new(OTHER_CATEGORY, remainder.max(0.0)),
        );
        Ok(categories)
    }
}
