use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    errors::{FinanceError, Result},
    storage::KeyValueStore,
};

pub const CATEGORIES_KEY: &str = "fintrack-categories";

pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "salary",
    "freelance",
    "food",
    "transport",
    "entertainment",
    "utilities",
    "health",
    "other",
];

/// Persisted list of category names offered when entering transactions.
///
/// Transactions are not validated against it.
pub struct CategoryStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    categories: Vec<String>,
}

impl CategoryStore {
    /// Loads the list, seeding and persisting the defaults when the slot is
    /// missing, empty or unreadable.
    pub fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::open_with_key(backend, CATEGORIES_KEY)
    }

    pub fn open_with_key(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let stored = match backend.get(&key) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|err| {
                warn!(%key, error = %err, "stored categories unreadable; reseeding defaults");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%key, error = %err, "category slot unavailable; reseeding defaults");
                Vec::new()
            }
        };

        let mut store = Self {
            backend,
            key,
            categories: stored,
        };
        if store.categories.is_empty() {
            store.categories = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
            if let Err(err) = store.persist() {
                warn!(key = %store.key, error = %err, "failed to seed default categories");
            }
        }
        store
    }

    pub fn list(&self) -> &[String] {
        &self.categories
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// Appends `name`; returns `false` when it is already present.
    pub fn add(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FinanceError::InvalidInput(
                "category name cannot be empty".into(),
            ));
        }
        if self.contains(name) {
            return Ok(false);
        }
        self.categories.push(name.to_string());
        debug!(category = name, "category added");
        self.persist()?;
        Ok(true)
    }

    /// Removes `name`; returns `false` when it was not present.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let before = self.categories.len();
        self.categories.retain(|c| c != name);
        if self.categories.len() == before {
            return Ok(false);
        }
        debug!(category = name, "category removed");
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.categories)?;
        self.backend.set(&self.key, &json)
    }
}
