mod common;

use common::{onboard, sample_habits, setup_test_env, storage_in};
use daily_budget::{
    core::services::{AdmissionService, AnalysisService},
    core::wallet_manager::WalletManager,
    domain::{
        AdmissionDecision, BufferJustification, JustificationReason, RejectionReason,
        TransactionCandidate,
    },
    errors::BudgetError,
    storage::WALLET_RECORD,
};

fn candidate(amount: f64, category: &str) -> TransactionCandidate {
    TransactionCandidate::new(amount, category, "meal", "canteen")
}

#[test]
fn derived_wallet_splits_budget_and_fills_other() {
    let (manager, _config, _base) = setup_test_env();
    onboard(&manager, &sample_habits());

    let wallet = manager.load_wallet().expect("wallet stored");
    assert!((wallet.usable_amount - 40.0).abs() < 1e-9);
    assert!((wallet.buffer - 10.0).abs() < 1e-9);
    assert!((wallet.total_limits() - 50.0).abs() < 1e-9);
    assert_eq!(wallet.category("other").map(|c| c.limit), Some(0.0));
}

#[test]
fn tiffin_over_limit_needs_category_justification() {
    let (manager, _config, _base) = setup_test_env();
    onboard(&manager, &sample_habits());
    let wallet = manager.load_wallet().unwrap();

    let decision = AdmissionService::evaluate(&wallet, &candidate(12.0, "tiffin")).unwrap();
    assert_eq!(
        decision,
        AdmissionDecision::RequiresBufferJustification(JustificationReason::CategoryLimit)
    );
    // evaluation never mutates
    assert_eq!(manager.load_wallet().unwrap(), wallet);
}

#[test]
fn justified_spend_survives_reload_from_disk() {
    let (manager, _config, base) = setup_test_env();
    onboard(&manager, &sample_habits());

    for _ in 0..5 {
        manager.record_transaction(&candidate(3.0, "lunch"), None).unwrap();
    }
    let err = manager
        .record_transaction(&candidate(3.0, "lunch"), None)
        .expect_err("sixth lunch needs a reason");
    assert!(matches!(
        err,
        BudgetError::JustificationRequired(JustificationReason::CategoryLimit)
    ));
    manager
        .record_transaction(
            &candidate(3.0, "lunch"),
            Some(&BufferJustification::new("emergency")),
        )
        .unwrap();

    let reopened = WalletManager::new(Box::new(storage_in(&base)));
    let wallet = reopened.load_wallet().unwrap();
    assert!((wallet.category("lunch").unwrap().spent - 18.0).abs() < 1e-9);
    assert_eq!(wallet.transactions.len(), 6);
    assert!(wallet.transactions[0].used_buffer);
    assert_eq!(wallet.transactions[0].buffer_reason.as_deref(), Some("emergency"));
    assert!(wallet.transactions[1..].iter().all(|t| !t.used_buffer));
}

#[test]
fn lock_blocks_every_candidate_until_unlocked() {
    let (manager, _config, _base) = setup_test_env();
    onboard(&manager, &sample_habits());
    manager.set_lock(true).unwrap();

    for (amount, category) in [(1.0, "tiffin"), (100.0, "lunch"), (0.5, "other")] {
        assert_eq!(
            manager.evaluate(&candidate(amount, category)).unwrap(),
            AdmissionDecision::Rejected(RejectionReason::Locked)
        );
    }
    manager.set_lock(false).unwrap();
    assert!(manager.evaluate(&candidate(1.0, "tiffin")).unwrap().is_allowed());
}

#[test]
fn every_save_keeps_a_bounded_backup_trail() {
    let (manager, _config, base) = setup_test_env();
    onboard(&manager, &sample_habits());
    for _ in 0..4 {
        manager.record_transaction(&candidate(1.0, "dinner"), None).unwrap();
    }
    let backups = storage_in(&base).list_backups(WALLET_RECORD).unwrap();
    assert_eq!(backups.len(), 3);
}

#[test]
fn projections_follow_recorded_spending() {
    let (manager, _config, _base) = setup_test_env();
    onboard(&manager, &sample_habits());
    manager.record_transaction(&candidate(8.0, "dinner"), None).unwrap();
    manager.record_transaction(&candidate(4.0, "tiffin"), None).unwrap();

    let wallet = manager.load_wallet().unwrap();
    let top = AnalysisService::top_categories(&wallet, 2);
    assert_eq!(top[0].name, "dinner");
    assert_eq!(top[1].name, "tiffin");
    assert!((AnalysisService::remaining_usable(&wallet) - 28.0).abs() < 1e-9);
    assert!((AnalysisService::spending_percentage(&wallet) - 30.0).abs() < 1e-9);
    let months: f64 = AnalysisService::monthly_aggregate(&wallet)
        .iter()
        .map(|bucket| bucket.total)
        .sum();
    assert!((months - 12.0).abs() < 1e-9);
    assert!(AnalysisService::investment_suggestion(&wallet).contains("dinner"));
}

#[test]
fn missing_records_point_back_to_onboarding() {
    let (manager, _config, _base) = setup_test_env();
    assert!(matches!(manager.load_wallet(), Err(BudgetError::NotFound(_))));
    assert!(matches!(
        manager.submit_daily_habits(&sample_habits()),
        Err(BudgetError::NotFound(_))
    ));
}
