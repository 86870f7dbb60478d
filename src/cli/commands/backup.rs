use std::{fs, path::PathBuf};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::export::{render, BackupFilter, BackupKind, BackupPeriod, ExportFormat};

use super::ParsedArgs;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write a CSV or JSON backup without ids",
            "export <csv|json> [--type all|incomes|expenses] [--period all_time|last_week|last_month|last_year|custom] [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--output path] [--stdout]",
            cmd_export,
        )
        .with_arguments(&["csv", "json"]),
        CommandEntry::new(
            "dump",
            "Write the full collection as re-importable JSON",
            "dump [path]",
            cmd_dump,
        ),
        CommandEntry::new(
            "import",
            "Replace all transactions with a JSON dump",
            "import <path> [--yes]",
            cmd_import,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["type", "period", "from", "to", "output"],
        &["stdout"],
    )?;
    let [format] = parsed.positional.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: export <csv|json> [--type ..] [--period ..] [--output path]".into(),
        ));
    };
    let format: ExportFormat = format.parse().map_err(CommandError::from_core)?;
    let kind: BackupKind = parsed
        .value("type")
        .unwrap_or("all")
        .parse()
        .map_err(CommandError::from_core)?;
    let period = BackupPeriod::parse(
        parsed.value("period").unwrap_or("all_time"),
        parsed.date("from")?,
        parsed.date("to")?,
    )
    .map_err(CommandError::from_core)?;

    let filter = BackupFilter::new(kind, period);
    let selected = filter.select(context.store.transactions(), context.store.today());
    if selected.is_empty() {
        io::print_warning("No transactions found for the selected backup; nothing exported.");
        return Ok(());
    }

    let content = render(format, &selected)?;
    if parsed.flag("stdout") {
        print!("{}", content);
        return Ok(());
    }
    let path = parsed
        .value("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format.default_file_name()));
    fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), count = selected.len(), %format, "backup exported");
    io::print_success(format!(
        "Exported {} transactions to {}.",
        selected.len(),
        path.display()
    ));
    Ok(())
}

fn cmd_dump(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let json = context.store.export_serialized()?;
    match args {
        [] => {
            println!("{}", json);
            Ok(())
        }
        [path] => {
            fs::write(path, json)?;
            io::print_success(format!(
                "Wrote {} transactions to {}.",
                context.store.len(),
                path
            ));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments("usage: dump [path]".into())),
    }
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &[], &["yes"])?;
    let [path] = parsed.positional.as_slice() else {
        return Err(CommandError::InvalidArguments(
            "usage: import <path> [--yes]".into(),
        ));
    };
    let text = fs::read_to_string(path)?;
    if !context.store.is_empty()
        && !context.confirm(
            &format!("Replace {} existing transactions?", context.store.len()),
            parsed.flag("yes"),
        )?
    {
        io::print_info("Cancelled.");
        return Ok(());
    }

    match context.store.import_serialized(&text) {
        Ok(count) => {
            io::print_success(format!("Imported {} transactions.", count));
            Ok(())
        }
        Err(err) => Err(CommandError::Message(format!(
            "import rejected, nothing changed: {}",
            err
        ))),
    }
}
