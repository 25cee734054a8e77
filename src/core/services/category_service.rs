use std::collections::BTreeMap;

use tracing::info;

use crate::domain::{CategoryLimit, WalletState};
use crate::errors::{BudgetError, Result};

/// Category editing that keeps accumulated spending intact.
pub struct CategoryService;

impl CategoryService {
    pub fn add(wallet: &WalletState, name: &str, limit: f64) -> Result<WalletState> {
        let name = Self::validate_name(wallet, name)?;
        Self::validate_limit(limit)?;
        let mut next = wallet.clone();
        next.categories
            .insert(name.clone(), CategoryLimit::new(name.clone(), limit));
        info!(category = %name, limit, "category added");
        Ok(next)
    }

    pub fn remove(wallet: &WalletState, name: &str) -> Result<WalletState> {
        let key = wallet
            .find_category_key(name)
            .map(str::to_string)
            .ok_or_else(|| BudgetError::NotFound(format!("category `{}`", name.trim())))?;
        let mut next = wallet.clone();
        next.categories.remove(&key);
        info!(category = %key, "category removed");
        Ok(next)
    }

    pub fn set_limit(wallet: &WalletState, name: &str, limit: f64) -> Result<WalletState> {
        Self::validate_limit(limit)?;
        let key = wallet
            .find_category_key(name)
            .map(str::to_string)
            .ok_or_else(|| BudgetError::NotFound(format!("category `{}`", name.trim())))?;
        let mut next = wallet.clone();
        if let Some(category) = next.category_mut(&key) {
            category.limit = limit;
        }
        info!(category = %key, limit, "category limit updated");
        Ok(next)
    }

    /// Rebuilds the category map from an editor list. Retained names keep
    /// their `spent`; new names start at zero; missing names are dropped.
    pub fn replace_all(wallet: &WalletState, entries: &[(String, f64)]) -> Result<WalletState> {
        let mut categories: BTreeMap<String, CategoryLimit> = BTreeMap::new();
        for (raw_name, limit) in entries {
            let name = raw_name.trim();
            if name.is_empty() {
                return Err(BudgetError::Validation("category name cannot be empty".into()));
            }
            Self::validate_limit(*limit)?;
            if categories
                .keys()
                .any(|existing| existing.eq_ignore_ascii_case(name))
            {
                return Err(BudgetError::Validation(format!(
                    "category `{name}` listed twice"
                )));
            }
            let spent = wallet
                .find_category_key(name)
                .and_then(|key| wallet.category(key))
                .map_or(0.0, |existing| existing.spent);
            categories.insert(
                name.to_string(),
                CategoryLimit {
                    name: name.to_string(),
                    limit: *limit,
                    spent,
                },
            );
        }
        let mut next = wallet.clone();
        next.categories = categories;
        info!(count = next.categories.len(), "categories replaced");
        Ok(next)
    }

    fn validate_name(wallet: &WalletState, candidate: &str) -> Result<String> {
        let name = candidate.trim();
        if name.is_empty() {
            return Err(BudgetError::Validation("category name cannot be empty".into()));
        }
        if wallet.find_category_key(name).is_some() {
            return Err(BudgetError::Validation(format!(
                "category `{name}` already exists"
            )));
        }
        Ok(name.to_string())
    }

    fn validate_limit(limit: f64) -> Result<()> {
        if limit.is_finite() && limit > 0.0 {
            Ok(())
        } else {
            Err(BudgetError::Validation(format!(
                "category limit must be a positive number, got {limit}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::AllocationService;
    use crate::domain::DailyHabits;

    fn wallet() -> WalletState {
        let mut wallet = AllocationService::derive_wallet_allocation(
            &DailyHabits::new(50.0)
                .with_category("lunch", 15.0)
                .with_category("dinner", 15.0),
            1500.0,
        )
        .unwrap();
        wallet.categories.get_mut("lunch").unwrap().spent = 9.0;
        wallet
    }

    #[test]
    fn add_starts_new_category_at_zero() {
        let next = CategoryService::add(&wallet(), " snacks ", 5.0).unwrap();
        let snacks = next.category("snacks").expect("added");
        assert_eq!(snacks.spent, 0.0);
        assert_eq!(snacks.limit, 5.0);
        assert_eq!(next.category("lunch").unwrap().spent, 9.0);
    }

    #[test]
    fn add_rejects_duplicates_and_bad_limits() {
        let w = wallet();
        assert!(CategoryService::add(&w, "LUNCH", 5.0).is_err());
        assert!(CategoryService::add(&w, "", 5.0).is_err());
        assert!(CategoryService::add(&w, "snacks", 0.0).is_err());
        assert!(CategoryService::add(&w, "snacks", f64::INFINITY).is_err());
    }

    #[test]
    fn remove_keeps_other_spending() {
        let next = CategoryService::remove(&wallet(), "Dinner").unwrap();
        assert!(next.category("dinner").is_none());
        assert_eq!(next.category("lunch").unwrap().spent, 9.0);
        let err = CategoryService::remove(&next, "dinner").expect_err("gone");
        assert!(matches!(err, BudgetError::NotFound(_)));
    }

    #[test]
    fn set_limit_preserves_spent() {
        let next = CategoryService::set_limit(&wallet(), "lunch", 20.0).unwrap();
        let lunch = next.category("lunch").unwrap();
        assert_eq!(lunch.limit, 20.0);
        assert_eq!(lunch.spent, 9.0);
    }

    #[test]
    fn replace_all_preserves_retained_spent() {
        let entries = vec![("lunch".to_string(), 12.0), ("books".to_string(), 4.0)];
        let next = CategoryService::replace_all(&wallet(), &entries).unwrap();
        assert_eq!(next.categories.len(), 2);
        assert_eq!(next.category("lunch").unwrap().spent, 9.0);
        assert_eq!(next.category("lunch").unwrap().limit, 12.0);
        assert_eq!(next.category("books").unwrap().spent, 0.0);
        assert!(next.category("other").is_none());
    }

    #[test]
    fn replace_all_matches_retained_names_ignoring_case() {
        let entries = vec![("Lunch".to_string(), 12.0), ("DINNER".to_string(), 15.0)];
        let next = CategoryService::replace_all(&wallet(), &entries).unwrap();
        let lunch = next.category("Lunch").expect("renamed key kept");
        assert_eq!(lunch.spent, 9.0);
        assert_eq!(lunch.limit, 12.0);
        assert_eq!(next.category("DINNER").unwrap().spent, 0.0);
        assert!(next.category("lunch").is_none());
    }
}
