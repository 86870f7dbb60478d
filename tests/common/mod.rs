#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use fintrack_core::{
    core::{FixedClock, StoreOptions, TransactionStore},
    errors::{FinanceError, Result},
    ledger::{Transaction, TransactionKind},
    storage::{KeyValueStore, MemoryStorage},
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
}

pub fn income(id: &str, amount: f64, day: &str) -> Transaction {
    Transaction::new(id, TransactionKind::Income, amount, "salary", day)
}

pub fn expense(id: &str, amount: f64, day: &str) -> Transaction {
    Transaction::new(id, TransactionKind::Expense, amount, "food", day)
}

/// Store over `backend` whose "today" is pinned to `today`.
pub fn store_at(backend: &MemoryStorage, today: NaiveDate) -> TransactionStore {
    TransactionStore::new(Arc::new(backend.clone()), StoreOptions::default())
        .with_clock(Arc::new(FixedClock::new(today)))
}

pub fn seeded(items: &[Transaction]) -> MemoryStorage {
    let json = serde_json::to_string(items).expect("serialize seed");
    MemoryStorage::with_slot(fintrack_core::core::TRANSACTIONS_KEY, &json)
}

/// Serves reads from `inner` and fails every write, like a full disk.
#[derive(Debug, Clone, Default)]
pub struct ReadOnlyStorage {
    pub inner: MemoryStorage,
}

impl KeyValueStore for ReadOnlyStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        Err(FinanceError::Storage(format!("slot `{}` is read-only", key)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        Err(FinanceError::Storage(format!("slot `{}` is read-only", key)))
    }
}

pub fn read_only_store(
    items: &[Transaction],
    today: NaiveDate,
) -> (ReadOnlyStorage, TransactionStore) {
    let backend = ReadOnlyStorage {
        inner: seeded(items),
    };
    let store = TransactionStore::new(Arc::new(backend.clone()), StoreOptions::default())
        .with_clock(Arc::new(FixedClock::new(today)));
    (backend, store)
}
