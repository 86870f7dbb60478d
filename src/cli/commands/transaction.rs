use chrono::NaiveDate;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table as output_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::errors::FinanceError;
use crate::ledger::{NewTransaction, Transaction, TransactionKind, TransactionPatch, DATE_FORMAT};

use super::{display_date, format_money, parse_amount, parse_date, resolve_id, short_id, ParsedArgs};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Record an income or expense",
            "add <income|expense> <amount> <category> [--date YYYY-MM-DD] [--note text] [--id id]",
            cmd_add,
        )
        .with_arguments(&["income", "expense"]),
        CommandEntry::new(
            "list",
            "List transactions, newest first",
            "list [all|month|previous|year] [--type income|expense]",
            cmd_list,
        )
        .with_arguments(&["all", "month", "previous", "year"]),
        CommandEntry::new("show", "Show one transaction", "show <id>", cmd_show),
        CommandEntry::new(
            "edit",
            "Change fields of a transaction",
            "edit <id> [--type t] [--amount n] [--category c] [--date d] [--note text] [--clear-note]",
            cmd_edit,
        ),
        CommandEntry::new(
            "remove",
            "Delete a transaction",
            "remove <id> [--yes]",
            cmd_remove,
        ),
        CommandEntry::new(
            "clear",
            "Delete every transaction",
            "clear [--yes]",
            cmd_clear,
        ),
        CommandEntry::new(
            "reload",
            "Re-read transactions from disk",
            "reload",
            cmd_reload,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["date", "note", "id"], &[])?;
    let [kind, amount, category] = parsed.positional.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: add <income|expense> <amount> <category> [--date YYYY-MM-DD] [--note text]"
                .into(),
        ));
    };

    let kind: TransactionKind = kind.parse().map_err(CommandError::from_core)?;
    let amount = parse_amount(amount)?;
    let category = validate_category(context, category)?;
    let today = context.store.today();
    let date = match parsed.value("date") {
        Some(raw) => validate_date(raw, today)?,
        None => today,
    };

    let mut draft = NewTransaction::new(kind, amount, category, date.format(DATE_FORMAT).to_string());
    if let Some(note) = parsed.value("note").map(str::trim).filter(|n| !n.is_empty()) {
        draft = draft.with_note(note);
    }
    if let Some(id) = parsed.value("id") {
        draft = draft.with_id(id);
    }

    let id = context.store.add(draft)?;
    io::print_success(format!(
        "Added {} of {} ({}).",
        kind,
        format_money(amount, context.currency()),
        short_id(&id)
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["type"], &[])?;
    let view = parsed.positional.first().copied().unwrap_or("all");
    let kind = parsed
        .value("type")
        .map(str::parse::<TransactionKind>)
        .transpose()
        .map_err(CommandError::from_core)?;

    let (title, items): (String, Vec<&Transaction>) = match view.to_ascii_lowercase().as_str() {
        "all" => ("All transactions".into(), context.store.transactions().iter().collect()),
        "month" => (
            format!("Transactions in {}", context.store.current_month()),
            context.store.current_month_transactions(),
        ),
        "previous" => (
            format!("Transactions in {}", context.store.current_month().previous()),
            context.store.previous_month_transactions(),
        ),
        "year" => (
            format!("Transactions in {}", context.store.current_month().year),
            context.store.current_year_transactions(),
        ),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown view `{}` (use all, month, previous or year)",
                other
            )))
        }
    };
    let items: Vec<&Transaction> = items
        .into_iter()
        .filter(|txn| kind.map_or(true, |kind| txn.kind == kind))
        .collect();

    output_section(title);
    if items.is_empty() {
        io::print_info("No transactions.");
        return Ok(());
    }

    let currency = context.currency();
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|txn| {
            vec![
                short_id(&txn.id),
                display_date(txn),
                txn.kind.to_string(),
                txn.category.clone(),
                format_money(txn.signed_amount(), currency),
                txn.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    output_table(&["ID", "Date", "Type", "Category", "Amount", "Note"], &rows);

    let net: f64 = items.iter().map(|txn| txn.signed_amount()).sum();
    io::print_info(format!(
        "{} entries, net {}",
        items.len(),
        format_money(net, currency)
    ));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [input] = args else {
        return Err(CommandError::InvalidArguments("usage: show <id>".into()));
    };
    let id = resolve_id(context, input)?;
    let txn = context
        .store
        .get(&id)
        .ok_or_else(|| CommandError::Core(FinanceError::TransactionNotFound(id.clone())))?;

    output_section(format!("Transaction {}", short_id(&txn.id)));
    io::print_info(format!("  Id       : {}", txn.id));
    io::print_info(format!("  Type     : {}", txn.kind));
    io::print_info(format!(
        "  Amount   : {}",
        format_money(txn.amount, context.currency())
    ));
    io::print_info(format!("  Category : {}", txn.category));
    io::print_info(format!("  Date     : {}", txn.date));
    io::print_info(format!(
        "  Note     : {}",
        txn.note.as_deref().unwrap_or("-")
    ));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["type", "amount", "category", "date", "note"],
        &["clear-note"],
    )?;
    let [input] = parsed.positional.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: edit <id> [--type t] [--amount n] [--category c] [--date d] [--note text]"
                .into(),
        ));
    };
    let id = resolve_id(context, input)?;
    let today = context.store.today();

    let mut patch = TransactionPatch::default();
    if let Some(kind) = parsed.value("type") {
        patch.kind = Some(kind.parse().map_err(CommandError::from_core)?);
    }
    if let Some(amount) = parsed.value("amount") {
        patch.amount = Some(parse_amount(amount)?);
    }
    if let Some(category) = parsed.value("category") {
        patch.category = Some(validate_category(context, category)?);
    }
    if let Some(date) = parsed.value("date") {
        patch.date = Some(validate_date(date, today)?.format(DATE_FORMAT).to_string());
    }
    if parsed.flag("clear-note") {
        patch.note = Some(None);
    } else if let Some(note) = parsed.value("note") {
        patch.note = Some(Some(note.trim().to_string()).filter(|n| !n.is_empty()));
    }
    if patch.is_empty() {
        return Err(CommandError::InvalidArguments("nothing to change".into()));
    }

    context.store.update(&id, &patch)?;
    io::print_success(format!("Updated {}.", short_id(&id)));
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    let [input] = parsed.positional.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: remove <id> [--yes]".into(),
        ));
    };
    let id = resolve_id(context, input)?;
    if !context.confirm(&format!("Delete transaction {}?", short_id(&id)), parsed.flag("yes"))? {
        io::print_info("Cancelled.");
        return Ok(());
    }
    let removed = context.store.remove(&id)?;
    io::print_success(format!("Removed {} transaction(s).", removed));
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    let count = context.store.len();
    if !context.confirm(
        &format!("Delete all {} transactions?", count),
        parsed.flag("yes"),
    )? {
        io::print_info("Cancelled.");
        return Ok(());
    }
    context.store.clear()?;
    io::print_success(format!("Cleared {} transactions.", count));
    Ok(())
}

fn cmd_reload(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.store.reload_from_storage();
    io::print_success(format!(
        "Reloaded {} transactions from storage.",
        context.store.len()
    ));
    Ok(())
}

fn validate_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, CommandError> {
    let date = parse_date(raw)?;
    if date > today {
        return Err(CommandError::InvalidArguments(format!(
            "date cannot be in the future ({})",
            raw
        )));
    }
    Ok(date)
}

fn validate_category(context: &ShellContext, raw: &str) -> Result<String, CommandError> {
    let category = raw.trim();
    if category.is_empty() {
        return Err(CommandError::InvalidArguments(
            "category cannot be empty".into(),
        ));
    }
    if !context.categories.contains(category) {
        io::print_warning(format!(
            "`{}` is not in the category list; see `category list`.",
            category
        ));
    }
    Ok(category.to_string())
}
