use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::{
    cli::core::{CommandError, ShellContext},
    cli::registry::CommandRegistry,
    errors::FinanceError,
    ledger::{parse_calendar_date, Transaction, DATE_FORMAT},
};

pub mod backup;
pub mod category;
pub mod config;
pub mod system;
pub mod transaction;
pub mod view;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let groups = [
        system::definitions(),
        transaction::definitions(),
        view::definitions(),
        backup::definitions(),
        category::definitions(),
        config::definitions(),
    ];
    for entry in groups.into_iter().flatten() {
        registry.register(entry);
    }
}

/// Positional arguments plus `--name value` options and bare `--flag`s.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    options: HashMap<&'a str, &'a str>,
    flags: HashSet<&'a str>,
}

impl<'a> ParsedArgs<'a> {
    /// Splits `args`; only names listed in `valued` or `flags` are accepted.
    pub fn parse(
        args: &[&'a str],
        valued: &[&str],
        flags: &[&str],
    ) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            if valued.contains(&name) {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("--{} needs a value", name))
                })?;
                parsed.options.insert(name, value);
            } else if flags.contains(&name) {
                parsed.flags.insert(name);
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{}`",
                    arg
                )));
            }
        }
        Ok(parsed)
    }

    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.options.get(name).copied()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>, CommandError> {
        self.value(name).map(parse_date).transpose()
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let amount: f64 = input.parse().map_err(|_| {
        CommandError::InvalidArguments(format!("invalid amount `{}`", input))
    })?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(CommandError::InvalidArguments(
            "amount must be a non-negative number".into(),
        ));
    }
    Ok(amount)
}

pub(crate) fn format_money(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", amount, currency)
}

pub(crate) fn format_percent(change: f64) -> String {
    format!("{:+.2}%", change)
}

pub(crate) fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Resolves an exact id, else a unique id prefix.
pub(crate) fn resolve_id(context: &ShellContext, input: &str) -> Result<String, CommandError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CommandError::InvalidArguments(
            "transaction id cannot be empty".into(),
        ));
    }
    if context.store.get(input).is_some() {
        return Ok(input.to_string());
    }
    let matches: Vec<&Transaction> = context
        .store
        .transactions()
        .iter()
        .filter(|txn| txn.id.starts_with(input))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(CommandError::Core(FinanceError::TransactionNotFound(
            input.to_string(),
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{}` matches {} transactions; use a longer id",
            input,
            matches.len()
        ))),
    }
}

/// Entry dates shown in tables: the calendar day when parseable, else raw.
pub(crate) fn display_date(txn: &Transaction) -> String {
    parse_calendar_date(&txn.date)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| txn.date.clone())
}
