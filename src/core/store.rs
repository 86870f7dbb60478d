//! The canonical, persisted, ordered transaction collection.

use std::{cmp::Ordering, fmt, sync::Arc};

use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    errors::{ImportError, Result},
    ledger::{generate_id, NewTransaction, Transaction, TransactionKind, TransactionPatch},
    storage::KeyValueStore,
};

use super::{
    clock::{Clock, SystemClock},
    period::MonthKey,
    summary::{self, DailyBalance, MonthComparison, Totals},
};

pub const TRANSACTIONS_KEY: &str = "fintrack-transactions";

pub type Comparator = Arc<dyn Fn(&Transaction, &Transaction) -> Ordering + Send + Sync>;
pub type PersistListener = Box<dyn Fn(&PersistEvent) + Send + Sync>;

/// Default ordering: most recent `date` first. Dates compare as strings.
pub fn date_descending(a: &Transaction, b: &Transaction) -> Ordering {
    b.date.cmp(&a.date)
}

/// Construction parameters for [`TransactionStore`].
#[derive(Clone)]
pub struct StoreOptions {
    pub storage_key: String,
    /// Used only when the slot is absent or unreadable; never written eagerly.
    pub initial: Vec<Transaction>,
    pub comparator: Comparator,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            storage_key: TRANSACTIONS_KEY.to_string(),
            initial: Vec::new(),
            comparator: Arc::new(date_descending),
        }
    }
}

impl StoreOptions {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_initial(mut self, initial: Vec<Transaction>) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&Transaction, &Transaction) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Arc::new(comparator);
        self
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("storage_key", &self.storage_key)
            .field("initial", &self.initial.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistAction {
    Written { count: usize },
    Removed,
}

/// Emitted to subscribers after the slot was successfully written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistEvent {
    pub key: String,
    pub revision: u64,
    pub action: PersistAction,
}

/// Owns the ordered transaction collection and mirrors it to one persistence
/// slot.
///
/// Construction reads the slot but never writes it. Each mutation updates
/// memory, re-sorts, then writes the whole collection synchronously. Several
/// stores bound to the same key are not kept in sync: the last writer wins.
/// Use [`TransactionStore::subscribe`] plus [`TransactionStore::reload_from_storage`]
/// when another instance must follow.
pub struct TransactionStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    initial: Vec<Transaction>,
    comparator: Comparator,
    clock: Arc<dyn Clock>,
    transactions: Vec<Transaction>,
    revision: u64,
    listeners: Vec<PersistListener>,
}

impl TransactionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, options: StoreOptions) -> Self {
        let mut store = Self {
            backend,
            key: options.storage_key,
            initial: options.initial,
            comparator: options.comparator,
            clock: Arc::new(SystemClock),
            transactions: Vec::new(),
            revision: 0,
            listeners: Vec::new(),
        };
        store.transactions = store.load_sorted();
        debug!(
            key = %store.key,
            count = store.transactions.len(),
            "transaction store hydrated"
        );
        store
    }

    pub fn with_defaults(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::new(backend, StoreOptions::default())
    }

    /// Replaces the clock used by month and year derived views.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    /// Incremented on every committed change, including reloads.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&PersistEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Inserts the transaction, generating an id when none is given, and
    /// returns the final id. Caller-supplied ids are not checked for
    /// uniqueness.
    pub fn add(&mut self, draft: NewTransaction) -> Result<String> {
        let id = draft.id.clone().unwrap_or_else(generate_id);
        self.transactions.push(draft.into_transaction(id.clone()));
        self.sort();
        debug!(%id, "transaction added");
        self.persist()?;
        Ok(id)
    }

    /// Removes every entry with `id` and returns how many were dropped.
    /// Removing an unknown id changes nothing and writes nothing.
    pub fn remove(&mut self, id: &str) -> Result<usize> {
        let before = self.transactions.len();
        self.transactions.retain(|txn| txn.id != id);
        let removed = before - self.transactions.len();
        if removed == 0 {
            return Ok(0);
        }
        debug!(%id, removed, "transaction removed");
        self.persist()?;
        Ok(removed)
    }

    /// Merges `patch` into every entry with `id`, then re-sorts. Returns
    /// whether anything matched.
    pub fn update(&mut self, id: &str, patch: &TransactionPatch) -> Result<bool> {
        let mut matched = false;
        for txn in self.transactions.iter_mut().filter(|txn| txn.id == id) {
            patch.apply(txn);
            matched = true;
        }
        if !matched {
            return Ok(false);
        }
        self.sort();
        debug!(%id, "transaction updated");
        self.persist()?;
        Ok(true)
    }

    /// Empties the collection and deletes the slot rather than writing `[]`.
    pub fn clear(&mut self) -> Result<()> {
        self.transactions.clear();
        self.revision += 1;
        if let Err(err) = self.backend.remove(&self.key) {
            warn!(key = %self.key, error = %err, "failed to remove transaction slot");
            return Err(err);
        }
        debug!(key = %self.key, "transaction slot cleared");
        self.notify(PersistAction::Removed);
        Ok(())
    }

    pub fn replace_all(&mut self, items: Vec<Transaction>) -> Result<()> {
        self.transactions = items;
        self.sort();
        debug!(count = self.transactions.len(), "transactions replaced");
        self.persist()
    }

    /// Discards the in-memory collection and re-reads the slot, falling back
    /// to the initial collection like construction does. Nothing is written.
    pub fn reload_from_storage(&mut self) {
        self.transactions = self.load_sorted();
        self.revision += 1;
        debug!(key = %self.key, count = self.transactions.len(), "transactions reloaded");
    }

    /// Pretty JSON of the full collection, ids included.
    pub fn export_serialized(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.transactions)?)
    }

    /// Validates every element and writes the sorted batch before swapping it
    /// in. Any failure, including a failed write, leaves the current
    /// collection untouched.
    pub fn import_serialized(&mut self, text: &str) -> Result<usize> {
        let mut items = parse_import(text)?;
        let comparator = &self.comparator;
        items.sort_by(|a, b| comparator(a, b));
        self.write_slot(&items)?;

        let count = items.len();
        self.transactions = items;
        self.revision += 1;
        debug!(count, "transactions imported");
        self.notify(PersistAction::Written { count });
        Ok(count)
    }

    /// Boolean form of [`TransactionStore::import_serialized`].
    pub fn import_serialized_ok(&mut self, text: &str) -> bool {
        match self.import_serialized(text) {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "import rejected");
                false
            }
        }
    }

    pub fn totals(&self) -> Totals {
        summary::totals(&self.transactions)
    }

    pub fn income_total(&self) -> f64 {
        summary::income_total(&self.transactions)
    }

    pub fn expense_total(&self) -> f64 {
        summary::expense_total(&self.transactions)
    }

    pub fn balance(&self) -> f64 {
        self.income_total() - self.expense_total()
    }

    /// Same value as [`TransactionStore::balance`], computed as a signed
    /// running sum.
    pub fn total_balance(&self) -> f64 {
        summary::signed_sum(&self.transactions)
    }

    pub fn current_month(&self) -> MonthKey {
        MonthKey::of(self.today())
    }

    pub fn current_month_transactions(&self) -> Vec<&Transaction> {
        summary::in_month(&self.transactions, self.current_month())
    }

    pub fn previous_month_transactions(&self) -> Vec<&Transaction> {
        summary::in_month(&self.transactions, self.current_month().previous())
    }

    pub fn current_year_transactions(&self) -> Vec<&Transaction> {
        summary::in_year(&self.transactions, self.today().year())
    }

    pub fn current_month_balance(&self) -> f64 {
        summary::signed_sum(self.current_month_transactions())
    }

    pub fn previous_month_balance(&self) -> f64 {
        summary::signed_sum(self.previous_month_transactions())
    }

    pub fn income_percentage_change(&self) -> f64 {
        self.month_comparison().income_change
    }

    pub fn expense_percentage_change(&self) -> f64 {
        self.month_comparison().expense_change
    }

    pub fn has_income_last_month(&self) -> bool {
        self.previous_month_transactions()
            .iter()
            .any(|txn| txn.kind == TransactionKind::Income)
    }

    pub fn has_expense_last_month(&self) -> bool {
        self.previous_month_transactions()
            .iter()
            .any(|txn| txn.kind == TransactionKind::Expense)
    }

    pub fn month_comparison(&self) -> MonthComparison {
        summary::compare_months(&self.transactions, self.today())
    }

    pub fn daily_balance_series(&self) -> Vec<DailyBalance> {
        summary::daily_balance_series(&self.transactions, self.current_month())
    }

    fn sort(&mut self) {
        let comparator = &self.comparator;
        self.transactions.sort_by(|a, b| comparator(a, b));
    }

    fn load_sorted(&self) -> Vec<Transaction> {
        let mut loaded = match self.backend.get(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Transaction>>(&raw) {
                Ok(items) => items,
                Err(err) => {
                    warn!(key = %self.key, error = %err, "stored transactions unreadable; using initial set");
                    self.initial.clone()
                }
            },
            Ok(None) => self.initial.clone(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "transaction slot unavailable; using initial set");
                self.initial.clone()
            }
        };
        let comparator = &self.comparator;
        loaded.sort_by(|a, b| comparator(a, b));
        loaded
    }

    fn persist(&mut self) -> Result<()> {
        self.revision += 1;
        self.write_slot(&self.transactions)?;
        self.notify(PersistAction::Written {
            count: self.transactions.len(),
        });
        Ok(())
    }

    fn write_slot(&self, items: &[Transaction]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.backend.set(&self.key, &json).map_err(|err| {
            warn!(key = %self.key, error = %err, "failed to persist transactions");
            err
        })
    }

    fn notify(&self, action: PersistAction) {
        if self.listeners.is_empty() {
            return;
        }
        let event = PersistEvent {
            key: self.key.clone(),
            revision: self.revision,
            action,
        };
        for listener in &self.listeners {
            listener(&event);
        }
    }
}

/// Parses and structurally validates an import payload.
///
/// Every element needs a string `id`, numeric `amount`, string `category`,
/// string `date` and a `type` of `income` or `expense`.
pub fn parse_import(text: &str) -> std::result::Result<Vec<Transaction>, ImportError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| ImportError::Syntax(err.to_string()))?;
    let Value::Array(elements) = value else {
        return Err(ImportError::NotAnArray);
    };

    let mut items = Vec::with_capacity(elements.len());
    for (index, mut element) in elements.into_iter().enumerate() {
        validate_element(&element).map_err(|reason| ImportError::InvalidElement {
            index,
            reason: reason.to_string(),
        })?;
        drop_foreign_note(&mut element);
        let txn = serde_json::from_value::<Transaction>(element).map_err(|err| {
            ImportError::InvalidElement {
                index,
                reason: err.to_string(),
            }
        })?;
        items.push(txn);
    }
    Ok(items)
}

/// `note` is optional free text; any other JSON type is discarded.
fn drop_foreign_note(element: &mut Value) {
    if let Value::Object(fields) = element {
        if fields.get("note").is_some_and(|note| !note.is_string()) {
            fields.remove("note");
        }
    }
}

fn validate_element(element: &Value) -> std::result::Result<(), &'static str> {
    let Value::Object(fields) = element else {
        return Err("not an object");
    };
    let is_string = |name: &str| fields.get(name).is_some_and(Value::is_string);
    if !is_string("id") {
        return Err("`id` must be a string");
    }
    if !fields.get("amount").is_some_and(Value::is_number) {
        return Err("`amount` must be a number");
    }
    if !is_string("category") {
        return Err("`category` must be a string");
    }
    if !is_string("date") {
        return Err("`date` must be a string");
    }
    match fields.get("type").and_then(Value::as_str) {
        Some("income") | Some("expense") => Ok(()),
        _ => Err("`type` must be `income` or `expense`"),
    }
}

