use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::{CommandEntry, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    output_section("Available commands");
    let rows: Vec<Vec<String>> = registry
        .iter()
        .map(|entry| {
            vec![
                entry.name.to_string(),
                entry.arguments.join("|"),
                entry.description.to_string(),
            ]
        })
        .collect();
    render_table(&["Command", "Takes", "Description"], &rows);
    io::print_hint("Use `help <command>` for usage. Tab completes commands and their first word.");
}

pub fn print_command(entry: &CommandEntry) {
    output_section(format!("Help: {}", entry.name));
    io::print_info(entry.description);
    io::print_info(format!("Usage: {}", entry.usage));
    if !entry.arguments.is_empty() {
        io::print_info(format!("First argument: {}", entry.arguments.join(", ")));
    }
}
