//! Backup selection and rendering to CSV or JSON.
//!
//! Exported records never carry the transaction `id`; use
//! [`crate::core::TransactionStore::export_serialized`] for a reimportable dump.

use std::{fmt, str::FromStr};

use chrono::{Days, Months, NaiveDate};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;

use crate::{
    errors::{FinanceError, Result},
    ledger::{Transaction, TransactionKind},
};

pub const CSV_HEADERS: [&str; 5] = ["amount", "category", "date", "note", "type"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("transactions.{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = FinanceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(FinanceError::InvalidInput(format!(
                "unknown export format `{}` (use csv or json)",
                other
            ))),
        }
    }
}

/// Which transaction types a backup includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackupKind {
    #[default]
    All,
    Incomes,
    Expenses,
}

impl BackupKind {
    fn admits(&self, kind: TransactionKind) -> bool {
        match self {
            BackupKind::All => true,
            BackupKind::Incomes => kind == TransactionKind::Income,
            BackupKind::Expenses => kind == TransactionKind::Expense,
        }
    }
}

impl FromStr for BackupKind {
    type Err = FinanceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "all" => Ok(BackupKind::All),
            "incomes" | "income" => Ok(BackupKind::Incomes),
            "expenses" | "expense" => Ok(BackupKind::Expenses),
            other => Err(FinanceError::InvalidInput(format!(
                "unknown backup type `{}` (use all, incomes or expenses)",
                other
            ))),
        }
    }
}

/// Time window a backup covers, relative to today unless custom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackupPeriod {
    #[default]
    AllTime,
    LastWeek,
    LastMonth,
    LastYear,
    /// Both bounds inclusive.
    Custom { start: NaiveDate, end: NaiveDate },
}

impl BackupPeriod {
    /// Builds a period from its name; `custom` needs both bounds.
    pub fn parse(name: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "all_time" | "all" => Ok(BackupPeriod::AllTime),
            "last_week" => Ok(BackupPeriod::LastWeek),
            "last_month" => Ok(BackupPeriod::LastMonth),
            "last_year" => Ok(BackupPeriod::LastYear),
            "custom" => match (from, to) {
                (Some(start), Some(end)) => Ok(BackupPeriod::Custom { start, end }),
                _ => Err(FinanceError::InvalidInput(
                    "select a valid custom period (both --from and --to)".into(),
                )),
            },
            other => Err(FinanceError::InvalidInput(format!(
                "unknown period `{}` (use all_time, last_week, last_month, last_year or custom)",
                other
            ))),
        }
    }

    /// Earliest admitted date for the relative periods. Month arithmetic
    /// clamps to the end of shorter months.
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            BackupPeriod::AllTime => None,
            BackupPeriod::LastWeek => today.checked_sub_days(Days::new(7)),
            BackupPeriod::LastMonth => today.checked_sub_months(Months::new(1)),
            BackupPeriod::LastYear => today.checked_sub_months(Months::new(12)),
            BackupPeriod::Custom { start, .. } => Some(*start),
        }
    }

    fn admits(&self, txn: &Transaction, today: NaiveDate) -> bool {
        if *self == BackupPeriod::AllTime {
            return true;
        }
        let Some(date) = txn.calendar_date() else {
            return false;
        };
        match self {
            BackupPeriod::Custom { start, end } => date >= *start && date <= *end,
            _ => self.start_date(today).map_or(true, |start| date >= start),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackupFilter {
    pub kind: BackupKind,
    pub period: BackupPeriod,
}

impl BackupFilter {
    pub fn new(kind: BackupKind, period: BackupPeriod) -> Self {
        Self { kind, period }
    }

    pub fn select<'a>(&self, transactions: &'a [Transaction], today: NaiveDate) -> Vec<&'a Transaction> {
        transactions
            .iter()
            .filter(|txn| self.kind.admits(txn.kind) && self.period.admits(txn, today))
            .collect()
    }
}

#[derive(Serialize)]
struct ExportRecord<'a> {
    amount: f64,
    category: &'a str,
    date: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    #[serde(rename = "type")]
    kind: TransactionKind,
}

impl<'a> From<&'a Transaction> for ExportRecord<'a> {
    fn from(txn: &'a Transaction) -> Self {
        Self {
            amount: txn.amount,
            category: &txn.category,
            date: &txn.date,
            note: txn.note.as_deref(),
            kind: txn.kind,
        }
    }
}

/// CSV with a bare header row and every value quoted; quotes inside values
/// are written as `\"`.
pub fn to_csv(transactions: &[&Transaction]) -> Result<String> {
    let mut out = CSV_HEADERS.join(",");
    out.push('\n');

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .double_quote(false)
        .escape(b'\\')
        .from_writer(Vec::new());
    for txn in transactions {
        writer.write_record([
            txn.amount.to_string().as_str(),
            txn.category.as_str(),
            txn.date.as_str(),
            txn.note.as_deref().unwrap_or(""),
            txn.kind.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| FinanceError::Export(err.to_string()))?;
    let body = String::from_utf8(bytes).map_err(|err| FinanceError::Export(err.to_string()))?;
    out.push_str(&body);
    Ok(out)
}

/// Pretty-printed JSON array of records without ids.
pub fn to_json(transactions: &[&Transaction]) -> Result<String> {
    let records: Vec<ExportRecord<'_>> = transactions.iter().map(|txn| (*txn).into()).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

pub fn render(format: ExportFormat, transactions: &[&Transaction]) -> Result<String> {
    match format {
        ExportFormat::Csv => to_csv(transactions),
        ExportFormat::Json => to_json(transactions),
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
