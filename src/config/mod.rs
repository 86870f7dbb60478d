use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::{
    errors::{FinanceError, Result},
    storage::KeyValueStore,
};

pub const CONFIG_KEY: &str = "fintrack-config";

/// User preferences used when presenting amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub currency: String,
    pub language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            language: "en".into(),
        }
    }
}

impl Config {
    /// Sets one field by name; used by the `config set` command.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(FinanceError::InvalidInput(format!(
                "`{}` cannot be empty",
                field
            )));
        }
        match field {
            "currency" => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(FinanceError::InvalidInput(format!(
                        "invalid currency code `{}` (use a 3-letter ISO code)",
                        value
                    )));
                }
                self.currency = value.to_ascii_uppercase();
            }
            "language" => self.language = value.to_ascii_lowercase(),
            other => {
                return Err(FinanceError::InvalidInput(format!(
                    "unknown config field `{}` (use currency or language)",
                    other
                )))
            }
        }
        Ok(())
    }
}

/// Loads and saves [`Config`] in its own persistence slot.
pub struct ConfigManager {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    config: Config,
}

impl ConfigManager {
    /// Reads the stored config. A missing or unreadable slot yields the
    /// defaults, which are written back immediately.
    pub fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        let key = CONFIG_KEY.to_string();
        let stored = match backend.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Config>(&raw) {
                Ok(config) => Some(config),
                Err(err) => {
                    warn!(%key, error = %err, "stored config unreadable; using defaults");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(%key, error = %err, "config slot unavailable; using defaults");
                None
            }
        };

        match stored {
            Some(config) => Self {
                backend,
                key,
                config,
            },
            None => {
                let manager = Self {
                    backend,
                    key,
                    config: Config::default(),
                };
                if let Err(err) = manager.save() {
                    warn!(key = %manager.key, error = %err, "failed to write default config");
                }
                manager
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn update(&mut self, config: Config) -> Result<()> {
        self.config = config;
        self.save()
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        let mut next = self.config.clone();
        next.set_field(field, value)?;
        self.update(next)
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.config)?;
        self.backend.set(&self.key, &json)
    }
}
