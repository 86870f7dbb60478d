//! Aggregates derived from a transaction collection.
//!
//! Everything here is a pure function of its input; the store recomputes on
//! every access instead of caching.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::ledger::{Transaction, TransactionKind};

use super::period::MonthKey;

/// Returned by [`percentage_change`] when the previous total is zero and the
/// current one is positive.
pub const NO_BASELINE_GROWTH: f64 = 100.0;
/// Returned by [`percentage_change`] when both totals are zero or the current
/// one is not positive.
pub const NO_BASELINE_DECLINE: f64 = -100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let income = income_total(transactions);
    let expense = expense_total(transactions);
    Totals {
        income,
        expense,
        balance: income - expense,
    }
}

pub fn income_total(transactions: &[Transaction]) -> f64 {
    let mut income = 0.0;
    for txn in transactions {
        if txn.kind == TransactionKind::Income {
            income += txn.amount;
        }
    }
    income
}

/// Sum of expense amounts as a positive magnitude.
pub fn expense_total(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|txn| txn.kind == TransactionKind::Expense)
        .map(|txn| txn.amount)
        .sum()
}

/// Signed running sum: `+amount` for income, `-amount` for expense.
pub fn signed_sum<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> f64 {
    transactions
        .into_iter()
        .fold(0.0, |acc, txn| acc + txn.signed_amount())
}

pub fn kind_total<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    kind: TransactionKind,
) -> f64 {
    transactions
        .into_iter()
        .filter(|txn| txn.kind == kind)
        .map(|txn| txn.amount)
        .sum()
}

pub fn in_month(transactions: &[Transaction], month: MonthKey) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|txn| txn.calendar_date().is_some_and(|date| month.contains(date)))
        .collect()
}

pub fn in_year(transactions: &[Transaction], year: i32) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|txn| txn.calendar_date().is_some_and(|date| date.year() == year))
        .collect()
}

/// `(current - previous) / previous * 100`.
///
/// A zero previous total has no meaningful ratio; it maps to
/// [`NO_BASELINE_GROWTH`] when the current total is positive and to
/// [`NO_BASELINE_DECLINE`] otherwise, including when both are zero.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 {
            NO_BASELINE_GROWTH
        } else {
            NO_BASELINE_DECLINE
        };
    }
    (current - previous) / previous * 100.0
}

/// Month-over-month figures backing the statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthComparison {
    pub current: MonthKey,
    pub previous: MonthKey,
    pub current_month_balance: f64,
    pub previous_month_balance: f64,
    pub income_change: f64,
    pub expense_change: f64,
    pub has_income_last_month: bool,
    pub has_expense_last_month: bool,
}

pub fn compare_months(transactions: &[Transaction], today: NaiveDate) -> MonthComparison {
    let current = MonthKey::of(today);
    let previous = current.previous();
    let this_month = in_month(transactions, current);
    let last_month = in_month(transactions, previous);

    MonthComparison {
        current,
        previous,
        current_month_balance: signed_sum(this_month.iter().copied()),
        previous_month_balance: signed_sum(last_month.iter().copied()),
        income_change: percentage_change(
            kind_total(this_month.iter().copied(), TransactionKind::Income),
            kind_total(last_month.iter().copied(), TransactionKind::Income),
        ),
        expense_change: percentage_change(
            kind_total(this_month.iter().copied(), TransactionKind::Expense),
            kind_total(last_month.iter().copied(), TransactionKind::Expense),
        ),
        has_income_last_month: last_month.iter().any(|txn| txn.is_income()),
        has_expense_last_month: last_month.iter().any(|txn| txn.is_expense()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyBalance {
    pub day: u32,
    pub balance: f64,
}

/// Cumulative balance at the end of each day of `month`, counting only
/// entries dated inside that month.
pub fn daily_balance_series(transactions: &[Transaction], month: MonthKey) -> Vec<DailyBalance> {
    let entries = in_month(transactions, month);
    let mut running = 0.0;
    (1..=month.days_in_month())
        .map(|day| {
            running += signed_sum(
                entries
                    .iter()
                    .copied()
                    .filter(|txn| txn.calendar_date().is_some_and(|date| date.day() == day)),
            );
            DailyBalance {
                day,
                balance: running,
            }
        })
        .collect()
}
