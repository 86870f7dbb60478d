use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "category",
        "Manage the category list",
        "category <list|add|remove> [name]",
        cmd_category,
    )
    .with_arguments(&["list", "add", "remove"])]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["list"] => {
            output_section("Categories");
            for name in context.categories.list() {
                io::print_info(format!("  {}", name));
            }
            Ok(())
        }
        ["add", name @ ..] if !name.is_empty() => {
            let name = name.join(" ");
            if context
                .categories
                .add(&name)
                .map_err(CommandError::from_core)?
            {
                io::print_success(format!("Category `{}` added.", name.trim()));
            } else {
                io::print_warning(format!("Category `{}` already exists.", name.trim()));
            }
            Ok(())
        }
        ["remove", name @ ..] if !name.is_empty() => {
            let name = name.join(" ");
            if context.categories.remove(&name)? {
                io::print_success(format!("Category `{}` removed.", name));
            } else {
                io::print_warning(format!("Category `{}` not found.", name));
            }
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: category <list|add|remove> [name]".into(),
        )),
    }
}
