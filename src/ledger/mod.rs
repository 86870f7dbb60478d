//! Transaction value types and their persisted JSON shape.

pub mod transaction;

pub use transaction::{
    generate_id, parse_calendar_date, NewTransaction, Transaction, TransactionKind,
    TransactionPatch, DATE_FORMAT,
};
