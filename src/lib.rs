#![doc(test(attr(deny(warnings))))]

//! Fintrack Core is a local-first personal finance tracker: an ordered,
//! persisted collection of income and expense entries, the aggregates the
//! dashboard and statistics views read from it, and CSV/JSON backups.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod export;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fintrack Core tracing initialized.");
    });
}
