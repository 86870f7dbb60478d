use chrono::Datelike;
use colored::Colorize;

use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table as output_table, section as output_section};
use crate::cli::registry::CommandEntry;

use super::{format_money, format_percent};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "dashboard",
            "Show totals and this month's running balance",
            "dashboard",
            cmd_dashboard,
        ),
        CommandEntry::new(
            "stats",
            "Compare this month with the previous one",
            "stats",
            cmd_stats,
        ),
    ]
}

fn cmd_dashboard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let currency = context.currency();
    let totals = context.store.totals();
    let month = context.store.current_month();

    output_section("Dashboard");
    io::print_info(format!("  Income   : {}", format_money(totals.income, currency)));
    io::print_info(format!("  Expenses : {}", format_money(totals.expense, currency)));
    io::print_info(format!("  Balance  : {}", signed_money(totals.balance, currency)));
    io::print_info(format!(
        "  {} : {}",
        month,
        signed_money(context.store.current_month_balance(), currency)
    ));

    if context.store.current_month_transactions().is_empty() {
        io::print_info(format!("No transactions in {}.", month));
        return Ok(());
    }

    let last_day = context.store.today().day();
    let rows: Vec<Vec<String>> = context
        .store
        .daily_balance_series()
        .into_iter()
        .filter(|point| point.day <= last_day)
        .map(|point| vec![format!("{}-{:02}", month, point.day), format_money(point.balance, currency)])
        .collect();
    output_section(format!("Running balance for {}", month));
    output_table(&["Day", "Balance"], &rows);
    Ok(())
}

fn cmd_stats(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let currency = context.currency();
    let cmp = context.store.month_comparison();

    output_section("Statistics");
    io::print_info(format!(
        "  Total balance  : {}",
        signed_money(context.store.total_balance(), currency)
    ));
    io::print_info(format!(
        "  {}        : {}",
        cmp.current,
        signed_money(cmp.current_month_balance, currency)
    ));
    io::print_info(format!(
        "  {}        : {}",
        cmp.previous,
        signed_money(cmp.previous_month_balance, currency)
    ));

    output_section(format!("{} vs {}", cmp.current, cmp.previous));
    if cmp.has_income_last_month {
        let text = format!("{} in income", format_percent(cmp.income_change));
        io::print_info(if cmp.income_change > 0.0 {
            text.green()
        } else {
            text.red()
        });
    } else {
        io::print_hint("Not enough data to compare income.");
    }
    if cmp.has_expense_last_month {
        let text = format!("{} in expenses", format_percent(cmp.expense_change));
        io::print_info(if cmp.expense_change > 0.0 {
            text.red()
        } else {
            text.green()
        });
    } else {
        io::print_hint("Not enough data to compare expenses.");
    }
    Ok(())
}

fn signed_money(amount: f64, currency: &str) -> String {
    let text = format_money(amount, currency);
    if amount >= 0.0 {
        format!("+{}", text).green().to_string()
    } else {
        text.red().to_string()
    }
}
