pub mod admission_service;
pub mod allocation_service;
pub mod analysis_service;
pub mod category_service;
pub mod lock_service;
pub mod settlement_service;

pub use admission_service::{AdmissionService, BufferPolicy};
pub use allocation_service::AllocationService;
pub use analysis_service::{
    AnalysisService, CategoryShare, MonthlyTotal, WalletSummary, RECENT_TRANSACTIONS,
};
pub use category_service::CategoryService;
pub use lock_service::LockService;
pub use settlement_service::{RolloverPolicy, SettlementPolicy, SettlementService};
