use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::domain::{DailyHabits, ProfileEdit, UserProfile};

use super::{parse_amount, usage_error, CommandDefinition};

const SIGNUP_USAGE: &str = "signup <name> <email> [age] [contact]";
const SETUP_USAGE: &str = "setup <income> <monthly_budget>";
const HABITS_USAGE: &str = "habits <daily_spend> [name=amount ...]";
const PROFILE_USAGE: &str =
    "profile [name=..] [email=..] [age=..] [contact=..] [income=..] [budget=..]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("signup", "Create the user profile", SIGNUP_USAGE, cmd_signup),
        CommandDefinition::new(
            "setup",
            "Record income and monthly budget",
            SETUP_USAGE,
            cmd_setup,
        ),
        CommandDefinition::new(
            "habits",
            "Declare daily habits and derive the wallet",
            HABITS_USAGE,
            cmd_habits,
        ),
        CommandDefinition::new(
            "profile",
            "Show or edit the profile",
            PROFILE_USAGE,
            cmd_profile,
        ),
    ]
}

fn cmd_signup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (name, email) = match args {
        [name, email, ..] => (*name, *email),
        _ => return Err(usage_error(SIGNUP_USAGE)),
    };
    let mut profile = UserProfile::new(name, email);
    if let Some(age) = args.get(2) {
        profile.age = Some(parse_age(age)?);
    }
    profile.contact = args.get(3).map(|contact| contact.to_string());

    let record = context.manager.sign_up(profile)?;
    output::success(format!(
        "Welcome, {}! Next: `{SETUP_USAGE}`.",
        record.profile.name
    ));
    Ok(())
}

fn cmd_setup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [income, budget] = args else {
        return Err(usage_error(SETUP_USAGE));
    };
    let income = parse_amount(income, "income")?;
    let budget = parse_amount(budget, "monthly budget")?;
    let finances = context.manager.complete_setup(income, budget)?;
    output::success(format!(
        "Setup complete. Monthly budget {}.",
        context.money(finances.monthly_budget_amount)
    ));
    output::hint(format!("Next: `{HABITS_USAGE}`."));
    Ok(())
}

fn cmd_habits(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((daily, entries)) = args.split_first() else {
        return Err(usage_error(HABITS_USAGE));
    };
    let mut habits = DailyHabits::new(parse_amount(daily, "daily spend")?);
    for entry in entries {
        let (name, amount) = entry
            .split_once('=')
            .ok_or_else(|| usage_error(HABITS_USAGE))?;
        habits = habits.with_category(name, parse_amount(amount, "habit amount")?);
    }

    let wallet = context.manager.submit_daily_habits(&habits)?;
    output::success(format!(
        "Wallet ready: usable {}, buffer {}.",
        context.money(wallet.usable_amount),
        context.money(wallet.buffer)
    ));
    for category in wallet.categories.values() {
        output::info(format!(
            "  {:<14} {}",
            category.name,
            context.money(category.limit)
        ));
    }
    Ok(())
}

fn cmd_profile(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if !args.is_empty() {
        let edit = parse_profile_edit(args)?;
        context.manager.update_profile(&edit)?;
        output::success("Profile updated.");
    }

    let user = context.manager.load_user()?;
    output::section(format!("Profile ({})", user.profile.initials()));
    output::info(format!("  Name     : {}", user.profile.name));
    output::info(format!("  Email    : {}", user.profile.email));
    if let Some(age) = user.profile.age {
        output::info(format!("  Age      : {age}"));
    }
    if let Some(contact) = &user.profile.contact {
        output::info(format!("  Contact  : {contact}"));
    }
    if let Ok(finances) = context.manager.load_finances() {
        output::info(format!("  Income   : {}", context.money(finances.income)));
        output::info(format!(
            "  Monthly  : {}",
            context.money(finances.monthly_budget_amount)
        ));
        if let Some(daily) = finances.daily_budget {
            output::info(format!("  Daily    : {}", context.money(daily)));
        }
    }
    Ok(())
}

fn parse_profile_edit(args: &[&str]) -> Result<ProfileEdit, CommandError> {
    let mut edit = ProfileEdit::default();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| usage_error(PROFILE_USAGE))?;
        match key.trim().to_lowercase().as_str() {
            "name" => edit.name = Some(value.to_string()),
            "email" => edit.email = Some(value.to_string()),
            "age" => edit.age = Some(parse_age(value)?),
            "contact" => edit.contact = Some(value.to_string()),
            "income" => edit.income = Some(parse_amount(value, "income")?),
            "budget" => edit.monthly_budget_amount = Some(parse_amount(value, "monthly budget")?),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown profile field `{other}`"
                )))
            }
        }
    }
    Ok(edit)
}

fn parse_age(raw: &str) -> Result<u32, CommandError> {
    raw.trim()
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid age `{raw}`")))
}
