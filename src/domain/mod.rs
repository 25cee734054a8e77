//! Pure domain models for the daily budget: profiles, wallet state, category
//! limits, transactions, and admission decisions. No I/O lives here.

pub mod category;
pub mod decision;
pub mod profile;
pub mod transaction;
pub mod wallet;

pub use category::CategoryLimit;
pub use decision::{AdmissionDecision, JustificationReason, RejectionReason};
pub use profile::{FinancialProfile, ProfileEdit, SessionFlags, UserProfile, UserRecord};
pub use transaction::{BufferJustification, Transaction, TransactionCandidate};
pub use wallet::{
    DailyHabits, WalletState, BUDGET_WARNING_RATIO, BUFFER_RATIO, OTHER_CATEGORY, USABLE_RATIO,
};
