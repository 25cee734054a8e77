use std::io;

use strsim::levenshtein;

use crate::cli::commands::{self, CommandDefinition, CommandRegistry};
use crate::cli::output::{self, OutputPreferences};
use crate::config::{Config, ConfigManager};
use crate::core::wallet_manager::WalletManager;
use crate::errors::{BudgetError, CliError};
use crate::storage::JsonStorage;

const MAX_SUGGESTION_DISTANCE: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

/// State shared by every command handler during a shell session.
pub struct ShellContext {
    pub mode: CliMode,
    pub running: bool,
    pub config: Config,
    pub manager: WalletManager,
    pub(crate) registry: CommandRegistry,
    pub last_command: Option<String>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config = ConfigManager::new()?.load()?;
        let storage = JsonStorage::new(Some(config.resolve_data_dir()), None)?;
        let manager = WalletManager::from_config(Box::new(storage), &config);
        Ok(Self::with_manager(mode, config, manager))
    }

    pub fn with_manager(mode: CliMode, config: Config, manager: WalletManager) -> Self {
        let color_enabled = config.ui_color_enabled && mode == CliMode::Interactive;
        if !color_enabled {
            colored::control::set_override(false);
        }
        output::set_preferences(OutputPreferences { color_enabled });
        Self {
            mode,
            running: true,
            config,
            manager,
            registry: CommandRegistry::new(commands::all_definitions()),
            last_command: None,
        }
    }

    pub fn prompt(&self) -> String {
        match self.manager.load_user() {
            Ok(user) => format!("budget[{}]> ", user.profile.initials()),
            Err(_) => "budget> ".into(),
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    /// Formats an amount with the configured currency symbol, grouping
    /// digits the way the configured locale writes them.
    pub fn money(&self, amount: f64) -> String {
        format_money(amount, &self.config.currency_symbol, &self.config.locale)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.get(command).map(|entry| entry.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = closest_command(self.registry.names(), input) {
            output::hint(format!("Did you mean `{best}`?"));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(BudgetError::JustificationRequired(reason)) => {
                output::warning(format!(
                    "This spend needs buffer justification ({reason})."
                ));
                output::hint("Repeat the `spend` command with a reason at the end.");
                Ok(())
            }
            CommandError::Core(BudgetError::NotFound(record)) => {
                output::error(format!("Nothing stored for `{record}` yet."));
                output::hint("Run `signup`, `setup`, then `habits` to get started.");
                Ok(())
            }
            CommandError::Core(err) => {
                output::error(err);
                Ok(())
            }
            CommandError::Io(err) => Err(CliError::Io(err)),
        }
    }
}

pub(crate) fn closest_command<'a>(
    names: impl Iterator<Item = &'a str>,
    input: &str,
) -> Option<&'a str> {
    let needle = input.to_lowercase();
    names
        .map(|name| (levenshtein(name, &needle), name))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .map(|(_, name)| name)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Grouping {
    Plain,
    Thousands,
    /// Lakh and crore: `12,34,567`.
    Indian,
}

impl Grouping {
    fn for_locale(locale: &str) -> Self {
        let locale = locale.trim();
        if locale.is_empty()
            || locale.eq_ignore_ascii_case("c")
            || locale.eq_ignore_ascii_case("posix")
        {
            return Self::Plain;
        }
        match locale.rsplit(['-', '_']).next() {
            Some(region) if region.eq_ignore_ascii_case("in") => Self::Indian,
            _ => Self::Thousands,
        }
    }
}

pub(crate) fn format_money(amount: f64, symbol: &str, locale: &str) -> String {
    if !amount.is_finite() {
        return format!("{symbol}{amount}");
    }
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!(
        "{sign}{symbol}{}.{fraction}",
        group_digits(whole, Grouping::for_locale(locale))
    )
}

fn group_digits(digits: &str, grouping: Grouping) -> String {
    if grouping == Grouping::Plain {
        return digits.to_string();
    }
    let mut groups = Vec::new();
    let mut end = digits.len();
    let mut size = 3;
    while end > size {
        groups.push(&digits[end - size..end]);
        end -= size;
        if grouping == Grouping::Indian {
            size = 2;
        }
    }
    groups.push(&digits[..end]);
    groups.reverse();
    groups.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_pick_nearest_command() {
        let names = ["status", "spend", "stats", "suggest"];
        assert_eq!(closest_command(names.iter().copied(), "spnd"), Some("spend"));
        assert_eq!(closest_command(names.iter().copied(), "STATUS"), Some("status"));
        assert_eq!(closest_command(names.iter().copied(), "withdrawal"), None);
    }

    #[test]
    fn money_groups_digits_by_locale() {
        assert_eq!(format_money(1234567.5, "₹", "en-IN"), "₹12,34,567.50");
        assert_eq!(format_money(1234567.5, "$", "en-US"), "$1,234,567.50");
        assert_eq!(format_money(1234567.5, "₹", ""), "₹1234567.50");
        assert_eq!(format_money(40.0, "₹", "en-IN"), "₹40.00");
        assert_eq!(format_money(100000.0, "₹", "hi_IN"), "₹1,00,000.00");
        assert_eq!(format_money(-2500.0, "₹", "en-IN"), "-₹2,500.00");
        assert_eq!(format_money(-0.001, "₹", "en-IN"), "₹0.00");
    }
}
