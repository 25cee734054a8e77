//! User identity and financial profile records.

use serde::{Deserialize, Serialize};

/// Identity and demographic details captured at signup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age: None,
            contact: None,
        }
    }

    /// Up to two initials taken from the first two words of the name.
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .take(2)
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        if initials.is_empty() {
            "U".into()
        } else {
            initials
        }
    }
}

/// Login and onboarding progress flags stored alongside the profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionFlags {
    pub is_logged_in: bool,
    pub setup_complete: bool,
}

/// The persisted `user` record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserRecord {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(flatten)]
    pub session: SessionFlags,
}

/// The persisted `userFinances` record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    pub income: f64,
    pub monthly_budget_amount: f64,
    pub wallet_balance: f64,
    #[serde(default)]
    pub daily_habits_set: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
}

impl FinancialProfile {
    pub fn new(income: f64, monthly_budget_amount: f64) -> Self {
        Self {
            income,
            monthly_budget_amount,
            wallet_balance: monthly_budget_amount,
            daily_habits_set: false,
            daily_budget: None,
        }
    }
}

/// Partial profile edit; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
    pub contact: Option<String>,
    pub income: Option<f64>,
    pub monthly_budget_amount: Option<f64>,
}

impl ProfileEdit {
    pub fn touches_finances(&self) -> bool {
        self.income.is_some() || self.monthly_budget_amount.is_some()
    }
}
