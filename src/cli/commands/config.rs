use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences",
        "config [show|set <currency|language> <value>]",
        cmd_config,
    )
    .with_arguments(&["show", "set"])]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            let config = context.config.config();
            output_section("Configuration");
            io::print_info(format!("  currency : {}", config.currency));
            io::print_info(format!("  language : {}", config.language));
            Ok(())
        }
        ["set", field, value] => {
            context
                .config
                .set_field(&field.to_ascii_lowercase(), value)
                .map_err(CommandError::from_core)?;
            let config = context.config.config();
            io::print_success(format!(
                "Saved: currency {}, language {}.",
                config.currency, config.language
            ));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: config [show|set <currency|language> <value>]".into(),
        )),
    }
}
