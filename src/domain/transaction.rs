//! Recorded transactions and the candidates submitted for admission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An admitted expense. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub recipient: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub used_buffer: bool,
    #[serde(default)]
    pub buffer_reason: Option<String>,
}

impl Transaction {
    pub(crate) fn from_candidate(
        candidate: &TransactionCandidate,
        timestamp: DateTime<Utc>,
        buffer_reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: candidate.amount,
            category: candidate.category.clone(),
            description: candidate.description.trim().to_string(),
            recipient: candidate.recipient.trim().to_string(),
            timestamp,
            used_buffer: buffer_reason.is_some(),
            buffer_reason,
        }
    }
}

/// A proposed expense awaiting an admission decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionCandidate {
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub recipient: String,
}

impl TransactionCandidate {
    pub fn new(
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            category: category.into(),
            description: description.into(),
            recipient: recipient.into(),
        }
    }
}

/// The user's stated reason for drawing on the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferJustification {
    pub reason: String,
}

impl BufferJustification {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The trimmed reason, or `None` when it is blank.
    pub fn reason(&self) -> Option<&str> {
        let trimmed = self.reason.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
