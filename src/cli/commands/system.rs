use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::utils::{build_info, paths};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "version",
            "Show build metadata and where data lives",
            "version",
            cmd_version,
        ),
        CommandEntry::new(
            "help",
            "List commands or describe one",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("exit", "Leave the shell", "exit", cmd_exit),
    ]
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output_section(format!("Fintrack {}", meta.version));
    let rows = vec![
        vec!["build".into(), format!("{} ({})", meta.git_hash, meta.git_status)],
        vec!["built at".into(), meta.timestamp.to_string()],
        vec!["profile".into(), meta.profile.to_string()],
        vec!["data dir".into(), paths::app_data_dir().display().to_string()],
        vec!["storage key".into(), context.store.storage_key().to_string()],
        vec!["transactions".into(), context.store.len().to_string()],
        vec!["currency".into(), context.currency().to_string()],
    ];
    render_table(&["Field", "Value"], &rows);
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        Some(raw) => match context.command(&raw.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(raw),
        },
        None => help::print_overview(&context.registry),
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
