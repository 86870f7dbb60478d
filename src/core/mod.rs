//! State management for the tracker: the transaction store, its derived
//! aggregates, and the category list.

pub mod categories;
pub mod clock;
pub mod period;
pub mod store;
pub mod summary;

pub use categories::{CategoryStore, CATEGORIES_KEY, DEFAULT_CATEGORIES};
pub use clock::{Clock, FixedClock, SystemClock};
pub use period::MonthKey;
pub use store::{
    date_descending, parse_import, Comparator, PersistAction, PersistEvent, StoreOptions,
    TransactionStore, TRANSACTIONS_KEY,
};
pub use summary::{DailyBalance, MonthComparison, Totals};
