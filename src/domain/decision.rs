use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict on a candidate transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum AdmissionDecision {
    Allowed,
    RequiresBufferJustification(JustificationReason),
    Rejected(RejectionReason),
}

impl AdmissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionDecision::Allowed)
    }
}

impl fmt::Display for AdmissionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionDecision::Allowed => f.write_str("allowed"),
            AdmissionDecision::RequiresBufferJustification(reason) => {
                write!(f, "requires buffer justification ({reason})")
            }
            AdmissionDecision::Rejected(reason) => write!(f, "rejected ({reason})"),
        }
    }
}

/// Why a candidate needs to draw on the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JustificationReason {
    /// The category would go over its daily limit.
    CategoryLimit,
    /// Total spending would pass 80% of the usable amount.
    BudgetThreshold,
}

impl fmt::Display for JustificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JustificationReason::CategoryLimit => "category_limit",
            JustificationReason::BudgetThreshold => "budget_threshold",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Locked,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::Locked => f.write_str("locked"),
        }
    }
}
