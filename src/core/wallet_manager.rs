use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::core::services::{
    AdmissionService, AllocationService, BufferPolicy, CategoryService, LockService,
    RolloverPolicy, SettlementPolicy, SettlementService,
};
use crate::core::time::{Clock, SystemClock};
use crate::domain::{
    AdmissionDecision, BufferJustification, DailyHabits, FinancialProfile, ProfileEdit,
    SessionFlags, Transaction, TransactionCandidate, UserProfile, UserRecord, WalletState,
};
use crate::errors::{BudgetError, Result};
use crate::storage::{RecordStore, WalletRepository};

/// Facade that ties the engine services to persistent records.
///
/// Every mutating call loads the current record, applies one service step,
/// and saves the result.
pub struct WalletManager {
    repository: WalletRepository,
    admission: AdmissionService,
    rollover: RolloverPolicy,
    settlement: SettlementPolicy,
}

impl WalletManager {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self::with_clock(
            store,
            Arc::new(SystemClock),
            BufferPolicy::default(),
            RolloverPolicy::default(),
            SettlementPolicy::default(),
        )
    }

    pub fn from_config(store: Box<dyn RecordStore>, config: &Config) -> Self {
        Self::with_clock(
            store,
            Arc::new(SystemClock),
            config.buffer_policy,
            config.day_rollover,
            config.savings_settlement,
        )
    }

    pub fn with_clock(
        store: Box<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        buffer_policy: BufferPolicy,
        rollover: RolloverPolicy,
        settlement: SettlementPolicy,
    ) -> Self {
        Self {
            repository: WalletRepository::new(store),
            admission: AdmissionService::with_clock(clock, buffer_policy),
            rollover,
            settlement,
        }
    }

    pub fn repository(&self) -> &WalletRepository {
        &self.repository
    }

    pub fn load_wallet(&self) -> Result<WalletState> {
        self.repository.load_wallet()
    }

    /// The stored wallet with today's rollover applied. Nothing is saved;
    /// read-only views use this so a new day shows a fresh ledger.
    pub fn current_wallet(&self) -> Result<WalletState> {
        let wallet = self.load_wallet()?;
        Ok(SettlementService::reset_if_new_day(
            &wallet,
            self.admission.clock().now(),
            self.rollover,
            self.settlement,
        ))
    }

    pub fn save_wallet(&self, wallet: &WalletState) -> Result<()> {
        self.repository.save_wallet(wallet)?;
        info!(
            spent = wallet.total_spent(),
            transactions = wallet.transactions.len(),
            "wallet saved"
        );
        Ok(())
    }

    pub fn load_user(&self) -> Result<UserRecord> {
        self.repository.load_user()
    }

    pub fn load_finances(&self) -> Result<FinancialProfile> {
        self.repository.load_finances()
    }

    pub fn sign_up(&self, profile: UserProfile) -> Result<UserRecord> {
        let profile = UserProfile {
            name: required(&profile.name, "name")?,
            email: required(&profile.email, "email")?,
            ..profile
        };
        let record = UserRecord {
            profile,
            session: SessionFlags {
                is_logged_in: true,
                setup_complete: false,
            },
        };
        self.repository.save_user(&record)?;
        info!(user = %record.profile.email, "user signed up");
        Ok(record)
    }

    pub fn complete_setup(&self, income: f64, monthly_budget: f64) -> Result<FinancialProfile> {
        let mut user = self.repository.load_user()?;
        validate_income(income)?;
        validate_monthly_budget(monthly_budget)?;

        let finances = FinancialProfile::new(income, monthly_budget);
        self.repository.save_finances(&finances)?;
        user.session.setup_complete = true;
        self.repository.save_user(&user)?;
        info!(income, monthly_budget, "financial setup completed");
        Ok(finances)
    }

    /// Derives and stores the wallet from the declared habits.
    pub fn submit_daily_habits(&self, habits: &DailyHabits) -> Result<WalletState> {
        let mut finances = self.repository.load_finances()?;
        let wallet = AllocationService::derive_wallet_allocation_on(
            habits,
            finances.monthly_budget_amount,
            Some(self.admission.clock().today()),
        )?;
        self.save_wallet(&wallet)?;
        finances.daily_habits_set = true;
        finances.daily_budget = Some(habits.daily_spend);
        self.repository.save_finances(&finances)?;
        Ok(wallet)
    }

    /// Applies a partial edit. Financial changes never re-derive the wallet.
    pub fn update_profile(&self, edit: &ProfileEdit) -> Result<UserRecord> {
        let mut user = self.repository.load_user()?;
        if let Some(name) = &edit.name {
            user.profile.name = required(name, "name")?;
        }
        if let Some(email) = &edit.email {
            user.profile.email = required(email, "email")?;
        }
        if let Some(age) = edit.age {
            user.profile.age = Some(age);
        }
        if let Some(contact) = &edit.contact {
            let contact = contact.trim();
            user.profile.contact = (!contact.is_empty()).then(|| contact.to_string());
        }

        if edit.touches_finances() {
            let mut finances = self.repository.load_finances()?;
            if let Some(income) = edit.income {
                validate_income(income)?;
                finances.income = income;
            }
            if let Some(budget) = edit.monthly_budget_amount {
                validate_monthly_budget(budget)?;
                finances.monthly_budget_amount = budget;
            }
            self.repository.save_finances(&finances)?;
        }

        self.repository.save_user(&user)?;
        info!(finances = edit.touches_finances(), "profile updated");
        Ok(user)
    }

    /// Decision for `candidate` against the current wallet. Nothing is saved.
    pub fn evaluate(&self, candidate: &TransactionCandidate) -> Result<AdmissionDecision> {
        let wallet = self.current_wallet()?;
        AdmissionService::evaluate(&wallet, &self.resolve_category(&wallet, candidate))
    }

    pub fn record_transaction(
        &self,
        candidate: &TransactionCandidate,
        justification: Option<&BufferJustification>,
    ) -> Result<Transaction> {
        let wallet = self.current_wallet()?;
        let candidate = self.resolve_category(&wallet, candidate);
        let (next, transaction) = self
            .admission
            .admit(&wallet, &candidate, justification)
            .map_err(|err| {
                warn!(category = %candidate.category, error = %err, "transaction not admitted");
                err
            })?;
        self.save_wallet(&next)?;
        Ok(transaction)
    }

    pub fn set_lock(&self, locked: bool) -> Result<WalletState> {
        self.update_wallet(|wallet| Ok(LockService::set_lock(wallet, locked)))
    }

    pub fn toggle_lock(&self) -> Result<WalletState> {
        self.update_wallet(|wallet| Ok(LockService::toggle_lock(wallet)))
    }

    pub fn accrue_daily_reward(&self) -> Result<WalletState> {
        self.update_wallet(|wallet| Ok(LockService::accrue_daily_reward(wallet)))
    }

    pub fn add_category(&self, name: &str, limit: f64) -> Result<WalletState> {
        self.update_wallet(|wallet| CategoryService::add(wallet, name, limit))
    }

    pub fn remove_category(&self, name: &str) -> Result<WalletState> {
        self.update_wallet(|wallet| CategoryService::remove(wallet, name))
    }

    pub fn set_category_limit(&self, name: &str, limit: f64) -> Result<WalletState> {
        self.update_wallet(|wallet| CategoryService::set_limit(wallet, name, limit))
    }

    pub fn replace_categories(&self, entries: &[(String, f64)]) -> Result<WalletState> {
        self.update_wallet(|wallet| CategoryService::replace_all(wallet, entries))
    }

    fn update_wallet<F>(&self, step: F) -> Result<WalletState>
    where
        F: FnOnce(&WalletState) -> Result<WalletState>,
    {
        let wallet = self.load_wallet()?;
        let next = step(&wallet)?;
        self.save_wallet(&next)?;
        Ok(next)
    }

    /// Maps the candidate's category onto the stored key, ignoring case.
    fn resolve_category(
        &self,
        wallet: &WalletState,
        candidate: &TransactionCandidate,
    ) -> TransactionCandidate {
        match wallet.find_category_key(&candidate.category) {
            Some(key) if key != candidate.category => TransactionCandidate {
                category: key.to_string(),
                ..candidate.clone()
            },
            _ => candidate.clone(),
        }
    }
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn validate_income(income: f64) -> Result<()> {
    if income.is_finite() && income >= 0.0 {
        Ok(())
    } else {
        Err(BudgetError::Validation(format!(
            "income must be a non-negative amount, got {income}"
        )))
    }
}

fn validate_monthly_budget(budget: f64) -> Result<()> {
    if budget.is_finite() && budget > 0.0 {
        Ok(())
    } else {
        Err(BudgetError::Validation(format!(
            "monthly budget must be greater than zero, got {budget}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::domain::{JustificationReason, RejectionReason};
    use crate::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};

    fn manager_at(day: u32, rollover: RolloverPolicy) -> WalletManager {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap());
        WalletManager::with_clock(
            Box::new(MemoryStorage::new()),
            Arc::new(clock),
            BufferPolicy::Unlimited,
            rollover,
            SettlementPolicy::None,
        )
    }

    fn onboarded(manager: &WalletManager) -> WalletState {
        manager
            .sign_up(UserProfile::new("Asha Rao", "asha@example.com"))
            .unwrap();
        manager.complete_setup(60000.0, 3000.0).unwrap();
        manager
            .submit_daily_habits(&DailyHabits::new(100.0).with_category("lunch", 15.0))
            .unwrap()
    }

    fn lunch(amount: f64) -> TransactionCandidate {
        TransactionCandidate::new(amount, "lunch", "lunch", "canteen")
    }

    #[test]
    fn onboarding_writes_all_three_records() {
        let manager = manager_at(3, RolloverPolicy::Never);
        let wallet = onboarded(&manager);

        let user = manager.load_user().unwrap();
        assert!(user.session.is_logged_in);
        assert!(user.session.setup_complete);

        let finances = manager.load_finances().unwrap();
        assert_eq!(finances.wallet_balance, 3000.0);
        assert!(finances.daily_habits_set);
        assert_eq!(finances.daily_budget, Some(100.0));

        assert_eq!(manager.load_wallet().unwrap(), wallet);
        assert_eq!(wallet.period_start, chrono::NaiveDate::from_ymd_opt(2024, 6, 3));
    }

    #[test]
    fn setup_requires_a_signed_up_user() {
        let manager = manager_at(3, RolloverPolicy::Never);
        let err = manager.complete_setup(1000.0, 500.0).expect_err("no user");
        assert!(matches!(err, BudgetError::NotFound(_)));
    }

    #[test]
    fn sign_up_requires_name_and_email() {
        let manager = manager_at(3, RolloverPolicy::Never);
        assert!(manager.sign_up(UserProfile::new(" ", "a@b.c")).is_err());
        assert!(manager.sign_up(UserProfile::new("Asha", "")).is_err());
    }

    #[test]
    fn sixth_lunch_needs_justification_then_records_buffer_use() {
        let manager = manager_at(3, RolloverPolicy::Never);
        onboarded(&manager);

        for _ in 0..5 {
            manager.record_transaction(&lunch(3.0), None).unwrap();
        }
        assert_eq!(
            manager.evaluate(&lunch(3.0)).unwrap(),
            AdmissionDecision::RequiresBufferJustification(JustificationReason::CategoryLimit)
        );
        let err = manager
            .record_transaction(&lunch(3.0), None)
            .expect_err("needs reason");
        assert!(matches!(
            err,
            BudgetError::JustificationRequired(JustificationReason::CategoryLimit)
        ));

        let txn = manager
            .record_transaction(&lunch(3.0), Some(&BufferJustification::new("emergency")))
            .unwrap();
        assert!(txn.used_buffer);
        assert_eq!(txn.buffer_reason.as_deref(), Some("emergency"));

        let wallet = manager.load_wallet().unwrap();
        assert!((wallet.category("lunch").unwrap().spent - 18.0).abs() < 1e-9);
        assert_eq!(wallet.transactions.len(), 6);
        assert_eq!(wallet.transactions[0].id, txn.id);
    }

    #[test]
    fn locked_wallet_rejects_and_stays_unchanged() {
        let manager = manager_at(3, RolloverPolicy::Never);
        onboarded(&manager);
        manager.set_lock(true).unwrap();
        let before = manager.load_wallet().unwrap();

        let err = manager
            .record_transaction(&lunch(1.0), Some(&BufferJustification::new("please")))
            .expect_err("locked");
        assert!(matches!(err, BudgetError::Rejected(RejectionReason::Locked)));
        assert_eq!(manager.load_wallet().unwrap(), before);

        manager.toggle_lock().unwrap();
        assert!(manager.record_transaction(&lunch(1.0), None).is_ok());
    }

    #[test]
    fn category_lookup_ignores_case() {
        let manager = manager_at(3, RolloverPolicy::Never);
        onboarded(&manager);
        let txn = manager
            .record_transaction(&TransactionCandidate::new(2.0, "LUNCH", "tea", "stall"), None)
            .unwrap();
        assert_eq!(txn.category, "lunch");
    }

    #[test]
    fn profile_edit_keeps_wallet() {
        let manager = manager_at(3, RolloverPolicy::Never);
        let wallet = onboarded(&manager);
        let edit = ProfileEdit {
            name: Some("Asha R".into()),
            monthly_budget_amount: Some(9000.0),
            ..ProfileEdit::default()
        };
        let user = manager.update_profile(&edit).unwrap();
        assert_eq!(user.profile.name, "Asha R");
        assert_eq!(manager.load_finances().unwrap().monthly_budget_amount, 9000.0);
        assert_eq!(manager.load_wallet().unwrap(), wallet);
    }

    #[test]
    fn current_wallet_applies_rollover_without_saving() {
        let first = manager_at(3, RolloverPolicy::Daily);
        onboarded(&first);
        for _ in 0..2 {
            first.record_transaction(&lunch(4.0), None).unwrap();
        }
        assert_eq!(first.current_wallet().unwrap().category("lunch").unwrap().spent, 8.0);

        let store = MemoryStorage::new();
        let json = serde_json::to_string(&first.load_wallet().unwrap()).unwrap();
        store.write(crate::storage::WALLET_RECORD, &json).unwrap();
        let next_day = WalletManager::with_clock(
            Box::new(store),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 4, 9, 0, 0).unwrap())),
            BufferPolicy::Unlimited,
            RolloverPolicy::Daily,
            SettlementPolicy::None,
        );

        let current = next_day.current_wallet().unwrap();
        assert_eq!(current.category("lunch").unwrap().spent, 0.0);
        assert_eq!(current.total_spent(), 0.0);
        assert_eq!(current.transactions.len(), 2);
        assert_eq!(next_day.load_wallet().unwrap().category("lunch").unwrap().spent, 8.0);
    }

    #[test]
    fn daily_rollover_resets_before_admission() {
        let first = manager_at(3, RolloverPolicy::Daily);
        onboarded(&first);
        for _ in 0..5 {
            first.record_transaction(&lunch(3.0), None).unwrap();
        }
        let stored = first.load_wallet().unwrap();

        let store = MemoryStorage::new();
        let json = serde_json::to_string(&stored).unwrap();
        store.write(crate::storage::WALLET_RECORD, &json).unwrap();
        let next_day = WalletManager::with_clock(
            Box::new(store),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 4, 8, 0, 0).unwrap())),
            BufferPolicy::Unlimited,
            RolloverPolicy::Daily,
            SettlementPolicy::None,
        );
        assert_eq!(next_day.evaluate(&lunch(3.0)).unwrap(), AdmissionDecision::Allowed);
        next_day.record_transaction(&lunch(3.0), None).unwrap();
        let wallet = next_day.load_wallet().unwrap();
        assert_eq!(wallet.category("lunch").unwrap().spent, 3.0);
        assert_eq!(wallet.transactions.len(), 6);
    }

    #[test]
    fn category_edits_persist() {
        let manager = manager_at(3, RolloverPolicy::Never);
        onboarded(&manager);
        manager.add_category("books", 10.0).unwrap();
        manager.set_category_limit("lunch", 20.0).unwrap();
        manager.remove_category("other").unwrap();
        let wallet = manager.load_wallet().unwrap();
        assert!(wallet.category("books").is_some());
        assert!(wallet.category("other").is_none());
        assert_eq!(wallet.category("lunch").unwrap().limit, 20.0);

        let replaced = manager
            .replace_categories(&[("lunch".to_string(), 18.0), ("tea".to_string(), 4.0)])
            .unwrap();
        assert_eq!(replaced.categories.len(), 2);
        assert_eq!(manager.accrue_daily_reward().unwrap(), replaced);
    }
}
