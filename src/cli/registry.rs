use strsim::levenshtein;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Largest edit distance still offered as a "did you mean" suggestion.
const SUGGESTION_DISTANCE: usize = 3;

/// One shell command. `arguments` are the fixed words accepted in first
/// argument position (views, formats, subcommands); they feed completion and
/// help.
pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub arguments: &'static [&'static str],
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            arguments: &[],
            handler,
        }
    }

    pub fn with_arguments(mut self, arguments: &'static [&'static str]) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Commands kept in registration order; a later entry with the same name
/// replaces the earlier one in place.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: CommandEntry) {
        match self.entries.iter_mut().find(|known| known.name == entry.name) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Nearest command name to a mistyped `input`, if any is close enough.
    pub fn closest(&self, input: &str) -> Option<&'static str> {
        let input = input.to_lowercase();
        self.names()
            .map(|name| (levenshtein(name, &input), name))
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }

    pub fn completion_table(&self) -> CompletionTable {
        CompletionTable {
            commands: self
                .entries
                .iter()
                .map(|entry| (entry.name, entry.arguments))
                .collect(),
        }
    }
}

/// Owned snapshot of command names and their first-argument words, handed to
/// the line editor.
#[derive(Debug, Clone)]
pub struct CompletionTable {
    commands: Vec<(&'static str, &'static [&'static str])>,
}

impl CompletionTable {
    /// Candidates for the word under the cursor: command names for the first
    /// word, the command's argument words for the second (`help` completes
    /// command names), nothing afterwards.
    pub fn complete(&self, line: &str, pos: usize) -> (usize, Vec<&'static str>) {
        let prefix = line.get(..pos).unwrap_or(line);
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let needle = prefix[start..].to_ascii_lowercase();
        let before: Vec<&str> = prefix[..start].split_whitespace().collect();

        let words: Vec<&'static str> = match before.as_slice() {
            [] => self.commands.iter().map(|(name, _)| *name).collect(),
            [command] if command.eq_ignore_ascii_case("help") => {
                self.commands.iter().map(|(name, _)| *name).collect()
            }
            [command] => self
                .commands
                .iter()
                .find(|(name, _)| command.eq_ignore_ascii_case(name))
                .map(|(_, arguments)| arguments.to_vec())
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        let mut candidates: Vec<&'static str> = words
            .into_iter()
            .filter(|word| word.starts_with(&needle))
            .collect();
        candidates.sort_unstable();
        (start, candidates)
    }
}
