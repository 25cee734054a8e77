use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::services::{AnalysisService, RECENT_TRANSACTIONS};
use crate::domain::{AdmissionDecision, BufferJustification, Transaction, TransactionCandidate};

use super::{parse_amount, usage_error, CommandDefinition};

const SPEND_USAGE: &str = "spend <amount> <category> <description> <recipient> [reason ...]";
const CHECK_USAGE: &str = "check <amount> <category>";
const LOCK_USAGE: &str = "lock [on|off]";
const TRANSACTIONS_USAGE: &str = "transactions [--category <name>] [search ...]";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const CATEGORY_USAGE: &str =
    "category add <name> <limit> | category remove <name> | category limit <name> <limit>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("spend", "Record a transaction", SPEND_USAGE, cmd_spend),
        CommandDefinition::new(
            "check",
            "Preview the admission decision for an amount",
            CHECK_USAGE,
            cmd_check,
        ),
        CommandDefinition::new("lock", "Lock or unlock the budget", LOCK_USAGE, cmd_lock),
        CommandDefinition::new("status", "Show the wallet dashboard", "status", cmd_status),
        CommandDefinition::new(
            "categories",
            "List category limits and spending",
            "categories",
            cmd_categories,
        ),
        CommandDefinition::new("category", "Edit categories", CATEGORY_USAGE, cmd_category),
        CommandDefinition::new(
            "transactions",
            "Search transaction history, newest first",
            TRANSACTIONS_USAGE,
            cmd_transactions,
        ),
    ]
}

fn cmd_spend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [amount, category, description, recipient, reason @ ..] = args else {
        return Err(usage_error(SPEND_USAGE));
    };
    let candidate = TransactionCandidate::new(
        parse_amount(amount, "amount")?,
        *category,
        *description,
        *recipient,
    );
    let justification = (!reason.is_empty()).then(|| BufferJustification::new(reason.join(" ")));

    let transaction = context
        .manager
        .record_transaction(&candidate, justification.as_ref())?;
    if transaction.used_buffer {
        output::warning(format!(
            "Recorded {} for {} using the buffer.",
            context.money(transaction.amount),
            transaction.category
        ));
    } else {
        output::success(format!(
            "Recorded {} for {}.",
            context.money(transaction.amount),
            transaction.category
        ));
    }
    let wallet = context.manager.current_wallet()?;
    output::info(format!(
        "Remaining usable: {}",
        context.money(AnalysisService::remaining_usable(&wallet))
    ));
    Ok(())
}

fn cmd_check(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [amount, category] = args else {
        return Err(usage_error(CHECK_USAGE));
    };
    let candidate =
        TransactionCandidate::new(parse_amount(amount, "amount")?, *category, "check", "check");
    match context.manager.evaluate(&candidate)? {
        AdmissionDecision::Allowed => output::success("Allowed."),
        AdmissionDecision::RequiresBufferJustification(reason) => {
            output::warning(format!("Needs buffer justification ({reason})."))
        }
        AdmissionDecision::Rejected(reason) => output::error(format!("Rejected ({reason}).")),
    }
    Ok(())
}

fn cmd_lock(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let wallet = match args {
        [] => context.manager.toggle_lock()?,
        [flag] => match flag.to_lowercase().as_str() {
            "on" => context.manager.set_lock(true)?,
            "off" => context.manager.set_lock(false)?,
            _ => return Err(usage_error(LOCK_USAGE)),
        },
        _ => return Err(usage_error(LOCK_USAGE)),
    };
    if wallet.budget_locked {
        output::warning("Budget locked. Spending is blocked until you unlock it.");
    } else {
        output::success("Budget unlocked.");
    }
    Ok(())
}

fn cmd_status(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let wallet = context.manager.current_wallet()?;
    let summary = AnalysisService::wallet_summary(&wallet);
    output::section("Wallet");
    output::info(format!("  Daily budget : {}", context.money(summary.daily_budget)));
    output::info(format!("  Usable       : {}", context.money(summary.usable_amount)));
    output::info(format!(
        "  Spent        : {} ({:.1}%)",
        context.money(summary.total_spent),
        summary.spending_percentage
    ));
    output::info(format!(
        "  Remaining    : {}",
        context.money(summary.remaining_usable)
    ));
    output::info(format!(
        "  Buffer       : {} used of {} ({} left)",
        context.money(summary.buffer_used),
        context.money(summary.buffer),
        context.money(summary.buffer_remaining)
    ));
    output::info(format!("  Savings      : {}", context.money(summary.savings)));
    output::info(format!("  Rewards      : {}", summary.rewards));
    output::info(format!(
        "  Locked       : {}",
        if summary.budget_locked { "yes" } else { "no" }
    ));
    output::info(format!("  Transactions : {}", summary.transaction_count));
    if summary.spending_percentage >= 80.0 {
        output::warning("Spending is past 80% of the usable amount.");
    }
    let recent = AnalysisService::recent(&wallet, RECENT_TRANSACTIONS);
    if !recent.is_empty() {
        output::section("Recent");
        for transaction in recent {
            print_transaction(context, transaction);
        }
    }
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let wallet = context.manager.current_wallet()?;
    output::section("Categories");
    if wallet.categories.is_empty() {
        output::info("No categories.");
        return Ok(());
    }
    for category in wallet.categories.values() {
        let line = format!(
            "  {:<14} {} / {} (left {})",
            category.name,
            context.money(category.spent),
            context.money(category.limit),
            context.money(category.remaining())
        );
        if category.spent > category.limit {
            output::warning(line);
        } else {
            output::info(line);
        }
    }
    Ok(())
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage_error(CATEGORY_USAGE));
    };
    match (action.to_lowercase().as_str(), rest) {
        ("add", [name, limit]) => {
            context
                .manager
                .add_category(name, parse_amount(limit, "limit")?)?;
            output::success(format!("Category `{}` added.", name.trim()));
        }
        ("remove", [name]) => {
            context.manager.remove_category(name)?;
            output::success(format!("Category `{}` removed.", name.trim()));
        }
        ("limit", [name, limit]) => {
            context
                .manager
                .set_category_limit(name, parse_amount(limit, "limit")?)?;
            output::success(format!("Limit for `{}` updated.", name.trim()));
        }
        _ => return Err(CommandError::InvalidArguments(format!("usage: {CATEGORY_USAGE}"))),
    }
    Ok(())
}

fn cmd_transactions(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut category = None;
    let mut terms = Vec::new();
    let mut rest = args.iter();
    while let Some(arg) = rest.next() {
        if arg.eq_ignore_ascii_case("--category") {
            let Some(name) = rest.next() else {
                return Err(usage_error(TRANSACTIONS_USAGE));
            };
            category = Some(*name);
        } else {
            terms.push(*arg);
        }
    }
    let query = terms.join(" ");

    let wallet = context.manager.current_wallet()?;
    let matches = AnalysisService::transactions(&wallet, Some(&query), category);
    output::section("Transactions");
    if matches.is_empty() {
        output::info("No matching transactions.");
        return Ok(());
    }
    for transaction in &matches {
        print_transaction(context, transaction);
    }
    output::info(format!("{} shown of {}", matches.len(), wallet.transactions.len()));
    Ok(())
}

fn print_transaction(context: &ShellContext, transaction: &Transaction) {
    let line = format!(
        "  {}  {:>10}  {:<12} {} ({})",
        transaction.timestamp.format(TIMESTAMP_FORMAT),
        context.money(transaction.amount),
        transaction.category,
        transaction.recipient,
        transaction.description
    );
    match transaction.buffer_reason.as_deref() {
        Some(reason) => output::warning(format!("{line} [buffer: {reason}]")),
        None if transaction.used_buffer => output::warning(format!("{line} [buffer]")),
        None => output::info(line),
    }
}
