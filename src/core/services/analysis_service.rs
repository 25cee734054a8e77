//! Read-only projections over a wallet: totals, savings rate, category
//! rankings, monthly spend, transaction history, and the investment
//! suggestion text.

use std::cmp::Ordering;

use chrono::{Datelike, Month};
use serde::Serialize;

use crate::domain::{CategoryLimit, Transaction, WalletState};

const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
const UNKNOWN_CATEGORY: &str = "unknown";

/// How many transactions the wallet dashboard lists.
pub const RECENT_TRANSACTIONS: usize = 3;

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Spend recorded in one calendar month, across all years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month: Month,
    pub total: f64,
}

impl MonthlyTotal {
    /// Three-letter label such as `Jan`.
    pub fn label(&self) -> &'static str {
        &self.month.name()[..3]
    }
}

/// One category's share of spending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub spent: f64,
    pub limit: f64,
    pub share_of_total: f64,
    pub share_of_limit: f64,
}

/// Dashboard figures bundled together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletSummary {
    pub daily_budget: f64,
    pub usable_amount: f64,
    pub buffer: f64,
    pub total_spent: f64,
    pub remaining_usable: f64,
    pub spending_percentage: f64,
    pub buffer_used: f64,
    pub buffer_remaining: f64,
    pub savings: f64,
    pub savings_rate: f64,
    pub rewards: u64,
    pub budget_locked: bool,
    pub transaction_count: usize,
}

pub struct AnalysisService;

impl AnalysisService {
    pub fn total_spent(wallet: &WalletState) -> f64 {
        wallet.total_spent()
    }

    /// Savings as a percentage of the whole daily budget. Zero while no
    /// savings have accrued.
    pub fn savings_rate(wallet: &WalletState) -> f64 {
        percentage(wallet.savings, wallet.usable_amount + wallet.buffer)
    }

    /// Categories by `spent` descending, ties broken by name.
    pub fn top_categories(wallet: &WalletState, n: usize) -> Vec<&CategoryLimit> {
        let mut ranked: Vec<&CategoryLimit> = wallet.categories.values().collect();
        ranked.sort_by(|a, b| {
            b.spent
                .partial_cmp(&a.spent)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked.truncate(n);
        ranked
    }

    /// Twelve buckets, January first, summing transaction amounts by the
    /// calendar month of their timestamp.
    pub fn monthly_aggregate(wallet: &WalletState) -> Vec<MonthlyTotal> {
        let mut totals = [0.0_f64; 12];
        for txn in &wallet.transactions {
            totals[txn.timestamp.month0() as usize] += txn.amount;
        }
        MONTHS
            .iter()
            .zip(totals)
            .map(|(month, total)| MonthlyTotal {
                month: *month,
                total,
            })
            .collect()
    }

    /// Transaction history, newest first. `query` matches description or
    /// recipient ignoring case; `category` matches the category name
    /// ignoring case. Blank filters match everything.
    pub fn transactions<'a>(
        wallet: &'a WalletState,
        query: Option<&str>,
        category: Option<&str>,
    ) -> Vec<&'a Transaction> {
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        wallet
            .transactions
            .iter()
            .filter(|txn| category.map_or(true, |c| txn.category.eq_ignore_ascii_case(c)))
            .filter(|txn| {
                needle.as_deref().map_or(true, |needle| {
                    txn.description.to_lowercase().contains(needle)
                        || txn.recipient.to_lowercase().contains(needle)
                })
            })
            .collect()
    }

    /// The `n` most recent transactions.
    pub fn recent(wallet: &WalletState, n: usize) -> Vec<&Transaction> {
        wallet.transactions.iter().take(n).collect()
    }

    pub fn remaining_usable(wallet: &WalletState) -> f64 {
        wallet.usable_amount - wallet.total_spent()
    }

    /// Share of the usable amount already spent, capped at 100.
    pub fn spending_percentage(wallet: &WalletState) -> f64 {
        percentage(wallet.total_spent(), wallet.usable_amount).min(100.0)
    }

    /// Spending that sits above the 80% threshold.
    pub fn buffer_used(wallet: &WalletState) -> f64 {
        (wallet.total_spent() - wallet.warning_threshold()).max(0.0)
    }

    pub fn buffer_remaining(wallet: &WalletState) -> f64 {
        wallet.buffer - Self::buffer_used(wallet)
    }

    pub fn category_breakdown(wallet: &WalletState) -> Vec<CategoryShare> {
        let total = wallet.total_spent();
        Self::top_categories(wallet, wallet.categories.len())
            .into_iter()
            .map(|category| CategoryShare {
                name: category.name.clone(),
                spent: category.spent,
                limit: category.limit,
                share_of_total: percentage(category.spent, total),
                share_of_limit: percentage(category.spent, category.limit),
            })
            .collect()
    }

    pub fn wallet_summary(wallet: &WalletState) -> WalletSummary {
        WalletSummary {
            daily_budget: wallet.balance,
            usable_amount: wallet.usable_amount,
            buffer: wallet.buffer,
            total_spent: wallet.total_spent(),
            remaining_usable: Self::remaining_usable(wallet),
            spending_percentage: Self::spending_percentage(wallet),
            buffer_used: Self::buffer_used(wallet),
            buffer_remaining: Self::buffer_remaining(wallet),
            savings: wallet.savings,
            savings_rate: Self::savings_rate(wallet),
            rewards: wallet.rewards,
            budget_locked: wallet.budget_locked,
            transaction_count: wallet.transactions.len(),
        }
    }

    pub fn investment_suggestion(wallet: &WalletState) -> String {
        Self::investment_suggestion_with_symbol(wallet, DEFAULT_CURRENCY_SYMBOL)
    }

    /// Picks one of three fixed messages by comparing savings with the
    /// usable amount. This is a template, not advice.
    pub fn investment_suggestion_with_symbol(wallet: &WalletState, symbol: &str) -> String {
        let savings = wallet.savings;
        let breakdown = Self::category_breakdown(wallet);
        let (highest, highest_share) = breakdown
            .first()
            .map(|share| (share.name.as_str(), share.share_of_total))
            .unwrap_or((UNKNOWN_CATEGORY, 0.0));

        if savings > wallet.usable_amount * 3.0 {
            format!(
                "You have a healthy savings of {symbol}{savings:.2}. Consider investing 30% in a mix of mutual funds and fixed deposits for long-term growth. Your highest expense category is {highest}, which accounts for {highest_share:.2}% of your spending."
            )
        } else if savings > wallet.usable_amount {
            format!(
                "You have saved {symbol}{savings:.2}. Consider starting with a small investment in a liquid fund while building your emergency fund. Focus on reducing expenses in {highest} to increase your savings rate."
            )
        } else {
            format!(
                "Your current savings of {symbol}{savings:.2} are below optimal levels. Focus on building an emergency fund of at least 3 months of expenses before investing. Consider reducing spending in {highest} which is your highest expense category."
            )
        }
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::AllocationService;
    use crate::domain::{DailyHabits, Transaction, TransactionCandidate};
    use chrono::{TimeZone, Utc};

    fn wallet() -> WalletState {
        let habits = DailyHabits::new(50.0)
            .with_category("tiffin", 10.0)
            .with_category("lunch", 15.0)
            .with_category("dinner", 15.0)
            .with_category("transport", 10.0);
        AllocationService::derive_wallet_allocation(&habits, 1500.0).unwrap()
    }

    fn spend(wallet: &mut WalletState, category: &str, amount: f64) {
        wallet.categories.get_mut(category).unwrap().spent += amount;
    }

    fn txn_on(month: u32, amount: f64) -> Transaction {
        let candidate = TransactionCandidate::new(amount, "lunch", "thali", "mess");
        Transaction::from_candidate(
            &candidate,
            Utc.with_ymd_and_hms(2024, month, 10, 12, 0, 0).unwrap(),
            None,
        )
    }

    #[test]
    fn savings_rate_is_zero_without_savings() {
        assert_eq!(AnalysisService::savings_rate(&wallet()), 0.0);
        let mut w = wallet();
        w.savings = 25.0;
        assert!((AnalysisService::savings_rate(&w) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn top_categories_break_ties_by_name() {
        let mut w = wallet();
        spend(&mut w, "lunch", 6.0);
        spend(&mut w, "dinner", 6.0);
        spend(&mut w, "transport", 2.0);
        let names: Vec<&str> = AnalysisService::top_categories(&w, 3)
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["dinner", "lunch", "transport"]);
    }

    #[test]
    fn top_categories_truncates_and_handles_large_n() {
        let w = wallet();
        assert_eq!(AnalysisService::top_categories(&w, 0).len(), 0);
        assert_eq!(AnalysisService::top_categories(&w, 99).len(), 5);
        let first = AnalysisService::top_categories(&w, 1);
        assert_eq!(first[0].name, "dinner");
    }

    #[test]
    fn monthly_aggregate_is_calendar_ordered() {
        let mut w = wallet();
        w.transactions = vec![txn_on(11, 4.0), txn_on(2, 3.0), txn_on(11, 1.5)];
        let months = AnalysisService::monthly_aggregate(&w);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].label(), "Jan");
        assert_eq!(months[0].total, 0.0);
        assert_eq!(months[1].total, 3.0);
        assert_eq!(months[10].month, Month::November);
        assert_eq!(months[10].total, 5.5);
        assert_eq!(months[11].label(), "Dec");
    }

    fn txn(category: &str, description: &str, recipient: &str) -> Transaction {
        let candidate = TransactionCandidate::new(2.0, category, description, recipient);
        Transaction::from_candidate(
            &candidate,
            Utc.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).unwrap(),
            None,
        )
    }

    fn history() -> WalletState {
        let mut w = wallet();
        w.transactions = vec![
            txn("dinner", "Paneer roll", "Street Stall"),
            txn("lunch", "veg thali", "Canteen"),
            txn("transport", "auto fare", "Ravi"),
            txn("lunch", "curd rice", "street stall"),
        ];
        w
    }

    #[test]
    fn transaction_search_ignores_case_across_fields() {
        let w = history();
        let hits = AnalysisService::transactions(&w, Some("STALL"), None);
        let names: Vec<&str> = hits.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, ["Paneer roll", "curd rice"]);

        let by_description = AnalysisService::transactions(&w, Some("thali"), None);
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].recipient, "Canteen");
    }

    #[test]
    fn transaction_filter_by_category_keeps_order() {
        let w = history();
        let lunch = AnalysisService::transactions(&w, None, Some("Lunch"));
        let names: Vec<&str> = lunch.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, ["veg thali", "curd rice"]);

        let both = AnalysisService::transactions(&w, Some("stall"), Some("lunch"));
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].description, "curd rice");

        assert_eq!(AnalysisService::transactions(&w, Some("  "), Some("")).len(), 4);
        assert!(AnalysisService::transactions(&w, Some("pizza"), None).is_empty());
    }

    #[test]
    fn recent_takes_newest_first() {
        let w = history();
        let recent = AnalysisService::recent(&w, 3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].description, "Paneer roll");
        assert_eq!(AnalysisService::recent(&w, 10).len(), 4);
        assert!(AnalysisService::recent(&wallet(), 3).is_empty());
    }

    #[test]
    fn buffer_usage_follows_threshold() {
        let mut w = wallet();
        spend(&mut w, "lunch", 15.0);
        spend(&mut w, "dinner", 15.0);
        assert_eq!(AnalysisService::buffer_used(&w), 0.0);
        spend(&mut w, "tiffin", 6.0);
        // 36 spent against a 32 threshold
        assert!((AnalysisService::buffer_used(&w) - 4.0).abs() < 1e-9);
        assert!((AnalysisService::buffer_remaining(&w) - 6.0).abs() < 1e-9);
        assert!((AnalysisService::remaining_usable(&w) - 4.0).abs() < 1e-9);
        assert!((AnalysisService::spending_percentage(&w) - 90.0).abs() < 1e-9);
        spend(&mut w, "other", 20.0);
        assert_eq!(AnalysisService::spending_percentage(&w), 100.0);
    }

    #[test]
    fn breakdown_reports_shares() {
        let mut w = wallet();
        spend(&mut w, "lunch", 6.0);
        spend(&mut w, "tiffin", 2.0);
        let breakdown = AnalysisService::category_breakdown(&w);
        assert_eq!(breakdown[0].name, "lunch");
        assert!((breakdown[0].share_of_total - 75.0).abs() < 1e-9);
        assert!((breakdown[0].share_of_limit - 40.0).abs() < 1e-9);
        let other = breakdown.iter().find(|s| s.name == "other").unwrap();
        assert_eq!(other.share_of_limit, 0.0);
    }

    #[test]
    fn suggestion_tiers_follow_savings() {
        let mut w = wallet();
        spend(&mut w, "lunch", 5.0);
        let low = AnalysisService::investment_suggestion(&w);
        assert!(low.contains("emergency fund of at least 3 months"));
        assert!(low.contains("₹0.00"));
        assert!(low.contains("lunch"));

        w.savings = 50.0;
        let mid = AnalysisService::investment_suggestion(&w);
        assert!(mid.contains("liquid fund"));

        w.savings = 121.0;
        let high = AnalysisService::investment_suggestion_with_symbol(&w, "$");
        assert!(high.contains("$121.00"));
        assert!(high.contains("mutual funds"));
        assert!(high.contains("100.00%"));
    }
}
