use serde::{Deserialize, Serialize};

/// A per-category daily spending cap and the amount spent against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryLimit {
    pub name: String,
    pub limit: f64,
    #[serde(default)]
    pub spent: f64,
}

impl CategoryLimit {
    pub fn new(name: impl Into<String>, limit: f64) -> Self {
        Self {
            name: name.into(),
            limit,
            spent: 0.0,
        }
    }

    /// Amount still available before the limit is crossed. Negative once overspent.
    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }

    /// Returns `true` when spending `amount` more would exceed the limit.
    pub fn would_exceed(&self, amount: f64) -> bool {
        self.spent + amount > self.limit
    }
}
