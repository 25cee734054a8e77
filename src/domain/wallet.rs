use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CategoryLimit, Transaction};

/// Share of the daily budget spendable under normal category rules.
pub const USABLE_RATIO: f64 = 0.8;
/// Share of the daily budget held back as the buffer.
pub const BUFFER_RATIO: f64 = 0.2;
/// Fraction of the usable amount past which spending needs justification.
pub const BUDGET_WARNING_RATIO: f64 = 0.8;
/// Synthetic category absorbing whatever the declared habits leave over.
pub const OTHER_CATEGORY: &str = "other";

/// Daily spending habits declared during onboarding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DailyHabits {
    pub daily_spend: f64,
    #[serde(default)]
    pub categories: BTreeMap<String, f64>,
}

impl DailyHabits {
    pub fn new(daily_spend: f64) -> Self {
        Self {
            daily_spend,
            categories: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.categories.insert(name.into(), amount);
        self
    }

    pub fn declared_total(&self) -> f64 {
        self.categories.values().sum()
    }
}

/// The canonical mutable budget record. Only engine services change it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletState {
    /// Daily budget the allocation was derived from.
    pub balance: f64,
    pub usable_amount: f64,
    pub buffer: f64,
    pub categories: BTreeMap<String, CategoryLimit>,
    /// Newest first.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub savings: f64,
    #[serde(default)]
    pub budget_locked: bool,
    #[serde(default)]
    pub rewards: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
}

impl WalletState {
    pub fn category(&self, name: &str) -> Option<&CategoryLimit> {
        self.categories.get(name)
    }

    pub(crate) fn category_mut(&mut self, name: &str) -> Option<&mut CategoryLimit> {
        self.categories.get_mut(name)
    }

    /// Sum of `spent` across every category.
    pub fn total_spent(&self) -> f64 {
        self.categories.values().map(|category| category.spent).sum()
    }

    /// Sum of every category limit.
    pub fn total_limits(&self) -> f64 {
        self.categories.values().map(|category| category.limit).sum()
    }

    /// Spending level past which admissions need buffer justification.
    pub fn warning_threshold(&self) -> f64 {
        self.usable_amount * BUDGET_WARNING_RATIO
    }

    /// Finds a category by name ignoring ASCII case.
    pub fn find_category_key(&self, name: &str) -> Option<&str> {
        let wanted = name.trim();
        self.categories
            .keys()
            .find(|key| key.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }
}
