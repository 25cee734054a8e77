//! Transaction admission rules: category limits, the 80% spending threshold,
//! the budget lock, and buffer justification.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::time::{Clock, SystemClock};
use crate::domain::{
    AdmissionDecision, BufferJustification, JustificationReason, RejectionReason, Transaction,
    TransactionCandidate, WalletState,
};
use crate::errors::{BudgetError, Result};

const CAPACITY_TOLERANCE: f64 = 1e-9;

/// How much justified overspend the buffer may absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferPolicy {
    /// Any justified transaction is admitted; the reason is the audit trail.
    #[default]
    Unlimited,
    /// Spending past the 80% threshold may not exceed the buffer amount.
    Capped,
}

/// Evaluates candidates against a wallet and records the admitted ones.
#[derive(Clone)]
pub struct AdmissionService {
    clock: Arc<dyn Clock>,
    buffer_policy: BufferPolicy,
}

impl Default for AdmissionService {
    fn default() -> Self {
        Self::new(BufferPolicy::default())
    }
}

impl AdmissionService {
    pub fn new(buffer_policy: BufferPolicy) -> Self {
        Self::with_clock(Arc::new(SystemClock), buffer_policy)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, buffer_policy: BufferPolicy) -> Self {
        Self {
            clock,
            buffer_policy,
        }
    }

    pub fn buffer_policy(&self) -> BufferPolicy {
        self.buffer_policy
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Decides whether `candidate` may proceed. Never touches `wallet`.
    ///
    /// The lock is checked before anything else, so a locked wallet rejects
    /// even malformed candidates. After that, a malformed candidate is an
    /// error, the category limit wins over the spending threshold, and
    /// anything left is allowed.
    pub fn evaluate(
        wallet: &WalletState,
        candidate: &TransactionCandidate,
    ) -> Result<AdmissionDecision> {
        if wallet.budget_locked {
            debug!(category = %candidate.category, "wallet locked, rejecting candidate");
            return Ok(AdmissionDecision::Rejected(RejectionReason::Locked));
        }

        Self::validate_candidate(wallet, candidate)?;

        let category = wallet
            .category(&candidate.category)
            .ok_or_else(|| unknown_category(&candidate.category))?;
        let category_over_limit = category.would_exceed(candidate.amount);
        let budget_over_threshold =
            wallet.total_spent() + candidate.amount > wallet.warning_threshold();

        let decision = if category_over_limit {
            AdmissionDecision::RequiresBufferJustification(JustificationReason::CategoryLimit)
        } else if budget_over_threshold {
            AdmissionDecision::RequiresBufferJustification(JustificationReason::BudgetThreshold)
        } else {
            AdmissionDecision::Allowed
        };
        debug!(
            category = %candidate.category,
            amount = candidate.amount,
            %decision,
            "evaluated candidate"
        );
        Ok(decision)
    }

    /// Records `candidate` against a copy of `wallet` and returns the updated
    /// wallet together with the new transaction.
    ///
    /// Buffer-requiring candidates need a non-blank justification. A
    /// justification passed for an allowed candidate is ignored.
    pub fn admit(
        &self,
        wallet: &WalletState,
        candidate: &TransactionCandidate,
        justification: Option<&BufferJustification>,
    ) -> Result<(WalletState, Transaction)> {
        let buffer_reason = match Self::evaluate(wallet, candidate)? {
            AdmissionDecision::Rejected(reason) => return Err(BudgetError::Rejected(reason)),
            AdmissionDecision::Allowed => None,
            AdmissionDecision::RequiresBufferJustification(reason) => {
                let text = justification
                    .and_then(BufferJustification::reason)
                    .ok_or(BudgetError::JustificationRequired(reason))?;
                self.check_buffer_capacity(wallet, candidate)?;
                warn!(
                    category = %candidate.category,
                    amount = candidate.amount,
                    %reason,
                    "drawing on buffer"
                );
                Some(text.to_string())
            }
        };

        let mut next = wallet.clone();
        let transaction = Transaction::from_candidate(candidate, self.clock.now(), buffer_reason);
        let category = next
            .category_mut(&candidate.category)
            .ok_or_else(|| unknown_category(&candidate.category))?;
        category.spent += candidate.amount;
        next.transactions.insert(0, transaction.clone());

        info!(
            id = %transaction.id,
            category = %transaction.category,
            amount = transaction.amount,
            used_buffer = transaction.used_buffer,
            "transaction admitted"
        );
        Ok((next, transaction))
    }

    /// Buffer draw once `candidate` is spent: whatever total spending would
    /// sit above the 80% threshold.
    pub fn buffer_draw_after(wallet: &WalletState, candidate: &TransactionCandidate) -> f64 {
        (wallet.total_spent() + candidate.amount - wallet.warning_threshold()).max(0.0)
    }

    fn check_buffer_capacity(
        &self,
        wallet: &WalletState,
        candidate: &TransactionCandidate,
    ) -> Result<()> {
        if self.buffer_policy == BufferPolicy::Unlimited {
            return Ok(());
        }
        let requested = Self::buffer_draw_after(wallet, candidate);
        if requested > wallet.buffer + CAPACITY_TOLERANCE {
            let already_used = (wallet.total_spent() - wallet.warning_threshold()).max(0.0);
            return Err(BudgetError::BufferExhausted {
                requested,
                available: (wallet.buffer - already_used).max(0.0),
            });
        }
        Ok(())
    }

    fn validate_candidate(wallet: &WalletState, candidate: &TransactionCandidate) -> Result<()> {
        if !(candidate.amount.is_finite() && candidate.amount > 0.0) {
            return Err(BudgetError::Validation(format!(
                "amount must be greater than zero, got {}",
                candidate.amount
            )));
        }
        if wallet.category(&candidate.category).is_none() {
            return Err(unknown_category(&candidate.category));
        }
        if candidate.description.trim().is_empty() {
            return Err(BudgetError::Validation("description is required".into()));
        }
        if candidate.recipient.trim().is_empty() {
            return Err(BudgetError::Validation("recipient is required".into()));
        }
        Ok(())
    }
}

fn unknown_category(name: &str) -> BudgetError {
    BudgetError::Validation(format!("unknown category `{name}`"))
}
