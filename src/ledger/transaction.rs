use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::FinanceError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single dated income or expense record.
///
/// `amount` is a magnitude; the sign applied in aggregates comes from `kind`.
/// `date` is kept as the ISO calendar string it was entered with so ordering
/// can compare it lexicographically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        kind: TransactionKind,
        amount: f64,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            category: category.into(),
            date: date.into(),
            note: None,
            kind,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Amount with the sign implied by the transaction kind.
    pub fn signed_amount(&self) -> f64 {
        self.kind.apply_sign(self.amount)
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Calendar date parsed from the leading `YYYY-MM-DD` of `date`.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }
}

/// Parses the calendar part of an ISO date string, ignoring any time suffix.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split('T').next()?;
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn apply_sign(&self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = FinanceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(FinanceError::InvalidInput(format!(
                "unknown transaction type `{}` (use income or expense)",
                other
            ))),
        }
    }
}

/// Input for [`crate::core::TransactionStore::add`]; the id is optional and
/// generated when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub amount: f64,
    pub category: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: f64,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            amount,
            category: category.into(),
            date: date.into(),
            note: None,
            kind,
        }
    }

    pub fn income(amount: f64, category: impl Into<String>, date: impl Into<String>) -> Self {
        Self::new(TransactionKind::Income, amount, category, date)
    }

    pub fn expense(amount: f64, category: impl Into<String>, date: impl Into<String>) -> Self {
        Self::new(TransactionKind::Expense, amount, category, date)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub(crate) fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            category: self.category,
            date: self.date,
            note: self.note,
            kind: self.kind,
        }
    }
}

/// Partial update merged into an existing transaction.
///
/// There is no `id` field: identifiers are immutable, and an `id` key in a
/// deserialized patch is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionPatch {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// `Some(None)` clears the note.
    #[serde(default, deserialize_with = "deserialize_note_patch")]
    pub note: Option<Option<String>>,
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionKind>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.note.is_none()
            && self.kind.is_none()
    }

    pub fn apply(&self, target: &mut Transaction) {
        if let Some(amount) = self.amount {
            target.amount = amount;
        }
        if let Some(category) = &self.category {
            target.category = category.clone();
        }
        if let Some(date) = &self.date {
            target.date = date.clone();
        }
        if let Some(note) = &self.note {
            target.note = note.clone();
        }
        if let Some(kind) = self.kind {
            target.kind = kind;
        }
    }
}

fn deserialize_note_patch<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
