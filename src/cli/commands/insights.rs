use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::services::AnalysisService;

use super::CommandDefinition;

const DEFAULT_TOP: usize = 3;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "stats",
            "Show spending totals and top categories",
            "stats [n]",
            cmd_stats,
        ),
        CommandDefinition::new("monthly", "Show spend per month", "monthly", cmd_monthly),
        CommandDefinition::new(
            "suggest",
            "Show the savings and investment suggestion",
            "suggest",
            cmd_suggest,
        ),
    ]
}

fn cmd_stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let top = match args.first() {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| CommandError::InvalidArguments(format!("invalid count `{raw}`")))?,
        None => DEFAULT_TOP,
    };
    let wallet = context.manager.current_wallet()?;

    output::section("Stats");
    output::info(format!(
        "  Total spent  : {}",
        context.money(AnalysisService::total_spent(&wallet))
    ));
    output::info(format!(
        "  Savings rate : {:.1}%",
        AnalysisService::savings_rate(&wallet)
    ));

    let breakdown = AnalysisService::category_breakdown(&wallet);
    if breakdown.is_empty() {
        output::info("  No categories yet.");
        return Ok(());
    }
    output::info(format!("  Top {top} categories:"));
    for share in breakdown.iter().take(top) {
        output::info(format!(
            "    {:<14} {} ({:.1}% of spend, {:.1}% of limit)",
            share.name,
            context.money(share.spent),
            share.share_of_total,
            share.share_of_limit
        ));
    }
    Ok(())
}

fn cmd_monthly(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let wallet = context.manager.current_wallet()?;
    output::section("Monthly spend");
    for bucket in AnalysisService::monthly_aggregate(&wallet) {
        output::info(format!("  {} {}", bucket.label(), context.money(bucket.total)));
    }
    Ok(())
}

fn cmd_suggest(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let wallet = context.manager.current_wallet()?;
    output::section("Suggestion");
    output::info(AnalysisService::investment_suggestion_with_symbol(
        &wallet,
        &context.config.currency_symbol,
    ));
    Ok(())
}
