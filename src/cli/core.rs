//! Core CLI loop, dispatch, and shell context helpers.

use std::{io, sync::Arc};

use crate::{
    config::ConfigManager,
    core::{CategoryStore, Clock, SystemClock, TransactionStore},
    errors::FinanceError,
    storage::{JsonStorage, KeyValueStore},
};

use super::commands;
use super::io as cli_io;
use super::registry::{CommandEntry, CommandRegistry};
pub use super::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    /// Opens the session against the on-disk data directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let storage = JsonStorage::new_default()?;
        tracing::info!(root = %storage.base_dir().display(), "data directory opened");
        Ok(Self::with_backend(mode, Arc::new(storage), Arc::new(SystemClock)))
    }

    pub fn with_backend(
        mode: CliMode,
        backend: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        if mode == CliMode::Script {
            colored::control::set_override(false);
        }

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let store = TransactionStore::with_defaults(Arc::clone(&backend)).with_clock(clock);
        let categories = CategoryStore::open(Arc::clone(&backend));
        let config = ConfigManager::open(backend);

        Self {
            mode,
            registry,
            store,
            categories,
            config,
            last_command: None,
            running: true,
        }
    }

    pub(crate) fn prompt(&self) -> String {
        format!("fintrack [{}]> ", self.store.len())
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.get(command).map(|entry| entry.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }

        let raw = &tokens[0];
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.last_command = Some(line.trim().to_string());
        self.dispatch(&command, raw, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = self.registry.closest(input) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action("Exit shell?")?)
    }

    /// Asks before a destructive action; script mode requires `--yes` instead.
    pub(crate) fn confirm(&self, prompt: &str, assume_yes: bool) -> Result<bool, CommandError> {
        if assume_yes {
            return Ok(true);
        }
        match self.mode {
            CliMode::Interactive => cli_io::confirm_action(prompt),
            CliMode::Script => Err(CommandError::InvalidArguments(
                "confirmation required; pass --yes in script mode".into(),
            )),
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }
}

/// Splits a command line into shell words; unbalanced quotes are an argument
/// error rather than a silent skip.
pub(crate) fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    shell_words::split(line)
        .map_err(|err| CommandError::InvalidArguments(format!("cannot parse line: {}", err)))
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] FinanceError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    /// Input problems surface with a usage hint; everything else as-is.
    pub(crate) fn from_core(error: FinanceError) -> Self {
        match error {
            FinanceError::InvalidInput(message) => CommandError::InvalidArguments(message),
            other => CommandError::Core(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] FinanceError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    context: &mut ShellContext,
    lines: &[&str],
) -> Result<(), CliError> {
    for line in lines {
        match context.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}
