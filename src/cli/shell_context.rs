use crate::{
    config::ConfigManager,
    core::{CategoryStore, TransactionStore},
};

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Everything a command handler can reach. The store, categories and config
/// are owned here and handed to handlers by `&mut`, so one session never
/// holds two copies of the collection.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: TransactionStore,
    pub categories: CategoryStore,
    pub config: ConfigManager,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn currency(&self) -> &str {
        &self.config.config().currency
    }
}
