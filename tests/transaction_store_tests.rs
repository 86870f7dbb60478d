mod common;

use std::sync::{Arc, Mutex};

use common::{date, expense, income, read_only_store, seeded, store_at};
use fintrack_core::{
    core::{PersistAction, StoreOptions, TransactionStore, TRANSACTIONS_KEY},
    errors::{FinanceError, ImportError},
    ledger::{NewTransaction, Transaction, TransactionKind, TransactionPatch},
    storage::{KeyValueStore, MemoryStorage},
};

fn is_sorted_descending(items: &[Transaction]) -> bool {
    items.windows(2).all(|pair| pair[0].date >= pair[1].date)
}

#[test]
fn construction_never_writes() {
    let backend = MemoryStorage::new();
    let store = TransactionStore::new(
        Arc::new(backend.clone()),
        StoreOptions::default().with_initial(vec![income("seed", 5.0, "2024-01-01")]),
    );
    assert_eq!(store.len(), 1);
    assert_eq!(backend.write_count(), 0);
    assert_eq!(backend.get(TRANSACTIONS_KEY).unwrap(), None);
}

#[test]
fn stored_collection_is_loaded_sorted() {
    let backend = seeded(&[
        income("a", 1.0, "2024-01-01"),
        expense("b", 2.0, "2024-03-01"),
        income("c", 3.0, "2024-02-01"),
    ]);
    let store = store_at(&backend, date(2024, 3, 10));
    let ids: Vec<&str> = store.transactions().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
}

#[test]
fn malformed_slot_falls_back_to_initial_without_writing() {
    let backend = MemoryStorage::with_slot(TRANSACTIONS_KEY, "{not json");
    let store = TransactionStore::new(
        Arc::new(backend.clone()),
        StoreOptions::default().with_initial(vec![income("seed", 5.0, "2024-01-01")]),
    );
    assert_eq!(store.transactions()[0].id, "seed");
    assert_eq!(backend.write_count(), 0);
    assert_eq!(
        backend.get(TRANSACTIONS_KEY).unwrap().as_deref(),
        Some("{not json")
    );
}

#[test]
fn reference_scenario_totals() {
    let backend = seeded(&[
        income("a", 1000.0, "2024-05-01"),
        expense("b", 200.0, "2024-05-15"),
    ]);
    let store = store_at(&backend, date(2024, 5, 20));
    assert_eq!(store.income_total(), 1000.0);
    assert_eq!(store.expense_total(), 200.0);
    assert_eq!(store.balance(), 800.0);
    assert_eq!(store.balance(), store.total_balance());
    assert_eq!(store.current_month_balance(), 800.0);
}

#[test]
fn balance_formulas_agree_on_mixed_sets() {
    let backend = MemoryStorage::new();
    let mut store = store_at(&backend, date(2024, 5, 20));
    let amounts = [0.0, 12.25, 3.5, 1000.0, 0.75, 42.0, 7.0];
    for (idx, amount) in amounts.iter().enumerate() {
        let day = format!("2024-05-{:02}", idx + 1);
        let draft = if idx % 2 == 0 {
            NewTransaction::income(*amount, "salary", day)
        } else {
            NewTransaction::expense(*amount, "food", day)
        };
        store.add(draft).unwrap();
        assert!((store.balance() - store.total_balance()).abs() < 1e-9);
    }
}

#[test]
fn add_inserts_one_entry_sorted_and_persists() {
    let backend = seeded(&[
        income("a", 10.0, "2024-05-01"),
        expense("b", 5.0, "2024-05-10"),
    ]);
    let mut store = store_at(&backend, date(2024, 5, 20));
    let id = store
        .add(NewTransaction::expense(3.0, "transport", "2024-05-05").with_note("bus"))
        .unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(store.transactions().iter().filter(|t| t.id == id).count(), 1);
    assert!(is_sorted_descending(store.transactions()));
    assert_eq!(store.transactions()[1].id, id);

    let reopened = store_at(&backend, date(2024, 5, 20));
    assert_eq!(reopened.get(&id).and_then(|t| t.note.as_deref()), Some("bus"));
}

#[test]
fn add_generates_distinct_ids() {
    let backend = MemoryStorage::new();
    let mut store = store_at(&backend, date(2024, 5, 20));
    let first = store.add(NewTransaction::income(1.0, "salary", "2024-05-01")).unwrap();
    let second = store.add(NewTransaction::income(1.0, "salary", "2024-05-01")).unwrap();
    assert_ne!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn remove_existing_and_missing_ids() {
    let backend = seeded(&[
        income("a", 10.0, "2024-05-01"),
        expense("b", 5.0, "2024-05-10"),
    ]);
    let mut store = store_at(&backend, date(2024, 5, 20));

    assert_eq!(store.remove("missing").unwrap(), 0);
    assert_eq!(store.len(), 2);
    assert_eq!(backend.write_count(), 0);

    assert_eq!(store.remove("a").unwrap(), 1);
    assert!(store.get("a").is_none());
    let reopened = store_at(&backend, date(2024, 5, 20));
    assert_eq!(reopened.len(), 1);
}

#[test]
fn update_changes_only_patched_fields_and_resorts() {
    let backend = seeded(&[
        income("a", 10.0, "2024-05-01"),
        expense("b", 5.0, "2024-05-10").with_note("lunch"),
    ]);
    let mut store = store_at(&backend, date(2024, 5, 20));

    let patch = TransactionPatch {
        date: Some("2024-04-01".into()),
        amount: Some(6.5),
        ..TransactionPatch::default()
    };
    assert!(store.update("b", &patch).unwrap());

    let updated = store.get("b").unwrap();
    assert_eq!(updated.amount, 6.5);
    assert_eq!(updated.category, "food");
    assert_eq!(updated.note.as_deref(), Some("lunch"));
    assert_eq!(updated.kind, TransactionKind::Expense);
    assert_eq!(store.transactions().last().map(|t| t.id.as_str()), Some("b"));

    assert!(!store.update("missing", &patch).unwrap());
}

#[test]
fn patch_with_id_key_cannot_rename() {
    let backend = seeded(&[income("a", 10.0, "2024-05-01")]);
    let mut store = store_at(&backend, date(2024, 5, 20));
    let patch: TransactionPatch =
        serde_json::from_str(r#"{"id":"hijack","category":"bonus","note":null}"#).unwrap();
    store.update("a", &patch).unwrap();
    assert!(store.get("hijack").is_none());
    assert_eq!(store.get("a").map(|t| t.category.as_str()), Some("bonus"));
}

#[test]
fn import_is_all_or_nothing() {
    let backend = seeded(&[income("a", 10.0, "2024-05-01")]);
    let mut store = store_at(&backend, date(2024, 5, 20));
    let writes_before = backend.write_count();

    let bad = r#"[
        {"id":"x","amount":1,"category":"food","date":"2024-05-02","type":"expense"},
        {"id":"y","amount":"2","category":"food","date":"2024-05-03","type":"expense"}
    ]"#;
    let err = store.import_serialized(bad).unwrap_err();
    assert!(matches!(
        err,
        FinanceError::Import(ImportError::InvalidElement { index: 1, .. })
    ));
    assert_eq!(store.len(), 1);
    assert_eq!(store.transactions()[0].id, "a");
    assert_eq!(backend.write_count(), writes_before);

    assert!(!store.import_serialized_ok("{\"id\":\"solo\"}"));
    assert!(!store.import_serialized_ok("not json"));
    assert!(!store.import_serialized_ok(
        r#"[{"id":"z","amount":1,"category":"food","date":"2024-05-02","type":"gift"}]"#
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn import_replaces_collection_and_sorts() {
    let backend = MemoryStorage::new();
    let mut store = store_at(&backend, date(2024, 5, 20));
    let payload = r#"[
        {"id":"x","amount":1,"category":"food","date":"2024-05-02","type":"expense"},
        {"id":"y","amount":2.5,"category":"salary","date":"2024-05-09","type":"income","note":"bonus"}
    ]"#;
    assert_eq!(store.import_serialized(payload).unwrap(), 2);
    assert_eq!(store.transactions()[0].id, "y");
    assert_eq!(store_at(&backend, date(2024, 5, 20)).len(), 2);
}

#[test]
fn export_then_import_round_trips() {
    let items = [
        income("a", 1000.0, "2024-05-01"),
        expense("b", 200.0, "2024-05-15").with_note("groceries"),
    ];
    let source = store_at(&seeded(&items), date(2024, 5, 20));
    let dump = source.export_serialized().unwrap();

    let mut target = store_at(&MemoryStorage::new(), date(2024, 5, 20));
    assert!(target.import_serialized_ok(&dump));
    assert_eq!(target.transactions(), source.transactions());
}

#[test]
fn clear_removes_the_slot() {
    let backend = seeded(&[income("a", 10.0, "2024-05-01")]);
    let mut store = store_at(&backend, date(2024, 5, 20));
    store.clear().unwrap();
    assert!(store.is_empty());
    assert_eq!(backend.get(TRANSACTIONS_KEY).unwrap(), None);

    let fresh = store_at(&backend, date(2024, 5, 20));
    assert!(fresh.is_empty());
}

#[test]
fn custom_key_and_comparator_are_honoured() {
    let backend = MemoryStorage::new();
    let options = StoreOptions::default()
        .with_storage_key("ledger-b")
        .with_comparator(|a: &Transaction, b: &Transaction| {
            a.amount
                .partial_cmp(&b.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    let mut store = TransactionStore::new(Arc::new(backend.clone()), options);
    store.add(NewTransaction::income(30.0, "salary", "2024-05-01")).unwrap();
    store.add(NewTransaction::income(10.0, "salary", "2024-05-02")).unwrap();
    let amounts: Vec<f64> = store.transactions().iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![10.0, 30.0]);
    assert!(backend.contains("ledger-b").unwrap());
    assert!(!backend.contains(TRANSACTIONS_KEY).unwrap());
}

#[test]
fn percentage_change_sentinels_through_the_store() {
    let backend = seeded(&[income("a", 50.0, "2024-05-03")]);
    let store = store_at(&backend, date(2024, 5, 20));
    assert_eq!(store.income_percentage_change(), 100.0);
    assert_eq!(store.expense_percentage_change(), -100.0);
    assert!(!store.has_income_last_month());
    assert!(!store.has_expense_last_month());
}

#[test]
fn january_compares_against_previous_december() {
    let backend = seeded(&[
        income("dec", 200.0, "2024-12-10"),
        expense("dec-x", 50.0, "2024-12-11"),
        income("jan", 300.0, "2025-01-04"),
        expense("future-dec", 999.0, "2025-12-01"),
    ]);
    let store = store_at(&backend, date(2025, 1, 15));
    let previous: Vec<&str> = store
        .previous_month_transactions()
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(previous, vec!["dec-x", "dec"]);
    assert_eq!(store.previous_month_balance(), 150.0);
    assert_eq!(store.income_percentage_change(), 50.0);
    assert!(store.has_expense_last_month());
    assert_eq!(store.current_year_transactions().len(), 2);
}

#[test]
fn two_instances_last_writer_wins() {
    let backend = MemoryStorage::new();
    let mut first = store_at(&backend, date(2024, 5, 20));
    let mut second = store_at(&backend, date(2024, 5, 20));

    first.add(NewTransaction::income(1.0, "salary", "2024-05-01").with_id("one")).unwrap();
    second.add(NewTransaction::income(2.0, "salary", "2024-05-02").with_id("two")).unwrap();

    let reopened = store_at(&backend, date(2024, 5, 20));
    assert!(reopened.get("one").is_none());
    assert!(reopened.get("two").is_some());

    first.reload_from_storage();
    assert!(first.get("one").is_none());
    assert!(first.get("two").is_some());
}

#[test]
fn subscribers_see_each_successful_persist() {
    let backend = MemoryStorage::new();
    let mut store = store_at(&backend, date(2024, 5, 20));
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    store.add(NewTransaction::income(1.0, "salary", "2024-05-01").with_id("a")).unwrap();
    store.remove("missing").unwrap();
    store.clear().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, PersistAction::Written { count: 1 });
    assert_eq!(events[1].action, PersistAction::Removed);
    assert!(events[1].revision > events[0].revision);
    assert_eq!(events[0].key, TRANSACTIONS_KEY);
}

#[test]
fn duplicate_ids_are_removed_and_patched_together() {
    let backend = seeded(&[
        income("dup", 10.0, "2024-05-01"),
        expense("dup", 5.0, "2024-05-10"),
        income("other", 1.0, "2024-05-03"),
    ]);
    let mut store = store_at(&backend, date(2024, 5, 20));

    let patch = TransactionPatch {
        category: Some("shared".into()),
        ..TransactionPatch::default()
    };
    assert!(store.update("dup", &patch).unwrap());
    let patched: Vec<&str> = store
        .transactions()
        .iter()
        .filter(|t| t.id == "dup")
        .map(|t| t.category.as_str())
        .collect();
    assert_eq!(patched, vec!["shared", "shared"]);
    assert_eq!(store.get("other").map(|t| t.category.as_str()), Some("salary"));

    assert_eq!(store.remove("dup").unwrap(), 2);
    assert_eq!(store.len(), 1);
    assert_eq!(store_at(&backend, date(2024, 5, 20)).len(), 1);
}

#[test]
fn failed_import_write_keeps_previous_collection() {
    let (backend, mut store) =
        read_only_store(&[income("a", 10.0, "2024-05-01")], date(2024, 5, 20));
    let revision = store.revision();
    let notified = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&notified);
    store.subscribe(move |_| *sink.lock().unwrap() += 1);

    let payload =
        r#"[{"id":"x","amount":1,"category":"food","date":"2024-05-02","type":"expense"}]"#;
    let err = store.import_serialized(payload).unwrap_err();
    assert!(matches!(err, FinanceError::Storage(_)));
    assert!(!store.import_serialized_ok(payload));

    let ids: Vec<&str> = store.transactions().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);
    assert_eq!(store.revision(), revision);
    assert_eq!(*notified.lock().unwrap(), 0);
    assert!(backend.get(TRANSACTIONS_KEY).unwrap().unwrap().contains("\"a\""));
}

#[test]
fn failed_add_is_committed_in_memory_only() {
    let (backend, mut store) =
        read_only_store(&[income("a", 10.0, "2024-05-01")], date(2024, 5, 20));
    let result = store.add(NewTransaction::expense(4.0, "food", "2024-05-02").with_id("b"));
    assert!(matches!(result, Err(FinanceError::Storage(_))));
    assert_eq!(store.len(), 2);
    assert!(store.get("b").is_some());

    let on_disk: Vec<Transaction> =
        serde_json::from_str(&backend.get(TRANSACTIONS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(on_disk.len(), 1);
}

#[test]
fn failed_clear_empties_memory_but_keeps_the_slot() {
    let (backend, mut store) =
        read_only_store(&[income("a", 10.0, "2024-05-01")], date(2024, 5, 20));
    assert!(store.clear().is_err());
    assert!(store.is_empty());
    assert!(backend.contains(TRANSACTIONS_KEY).unwrap());
    assert_eq!(store_at(&backend.inner, date(2024, 5, 20)).len(), 1);
}

#[test]
fn import_drops_notes_that_are_not_text() {
    let backend = MemoryStorage::new();
    let mut store = store_at(&backend, date(2024, 5, 20));
    let payload = r#"[
        {"id":"x","amount":1,"category":"food","date":"2024-05-02","type":"expense","note":42},
        {"id":"y","amount":2,"category":"food","date":"2024-05-01","type":"expense","note":"kept"},
        {"id":"z","amount":3,"category":"food","date":"2024-04-30","type":"expense","note":null}
    ]"#;
    assert_eq!(store.import_serialized(payload).unwrap(), 3);
    assert_eq!(store.get("x").and_then(|t| t.note.as_deref()), None);
    assert_eq!(store.get("y").and_then(|t| t.note.as_deref()), Some("kept"));
    assert_eq!(store.get("z").and_then(|t| t.note.as_deref()), None);
}
