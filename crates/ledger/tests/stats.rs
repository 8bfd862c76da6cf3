use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Europe::Moscow;
use uuid::Uuid;

use ledger::{
    Amount, DateRange, ExpenseDraft, ExpenseKind, Ledger, LedgerError, MemorySheets, SheetStore,
    StatsScope, UserId,
};

fn ledger_with_store() -> (Ledger, Arc<MemorySheets>) {
    let store = Arc::new(MemorySheets::new());
    (Ledger::new(store.clone(), Moscow), store)
}

fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
    DateRange {
        start: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
        end: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
    }
}

fn amount(text: &str) -> Amount {
    text.parse().unwrap()
}

fn personal_row(date: &str, category: &str, amount: &str) -> Vec<String> {
    vec![
        Uuid::new_v4().to_string(),
        date.to_string(),
        category.to_string(),
        amount.to_string(),
        String::new(),
        "Личная".to_string(),
        String::new(),
    ]
}

fn family_row(date: &str, category: &str, amount: &str, owner: u64) -> Vec<String> {
    vec![
        Uuid::new_v4().to_string(),
        date.to_string(),
        category.to_string(),
        amount.to_string(),
        String::new(),
        "Семейная".to_string(),
        owner.to_string(),
        String::new(),
    ]
}

#[tokio::test]
async fn window_bounds_are_inclusive() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    for date in [
        "2026-07-31 23:59:59",
        "2026-08-01 00:00:00",
        "2026-08-31 23:59:59",
        "2026-09-01 00:00:00",
    ] {
        let row = personal_row(date, "🛒 Продукты", "10.00");
        store.append_row("42", &row).await.unwrap();
    }

    let totals = ledger
        .aggregate(UserId(42), StatsScope::Personal, range((2026, 8, 1), (2026, 8, 31)))
        .await
        .unwrap();

    assert_eq!(totals.total, amount("20.00"));
}

#[tokio::test]
async fn totals_follow_the_category_order() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    // Appended out of order on purpose.
    for (category, sum) in [
        ("🚗 Транспорт", "30"),
        ("🍔 Еда вне дома", "100.25"),
        ("🚗 Транспорт", "20.50"),
        ("🛒 Продукты", "150.50"),
    ] {
        let row = personal_row("2026-08-10 12:00:00", category, sum);
        store.append_row("42", &row).await.unwrap();
    }

    let totals = ledger
        .aggregate(UserId(42), StatsScope::Personal, range((2026, 8, 1), (2026, 8, 31)))
        .await
        .unwrap();

    assert_eq!(
        totals.by_category,
        vec![
            ("🍔 Еда вне дома".to_string(), amount("100.25")),
            ("🛒 Продукты".to_string(), amount("150.50")),
            ("🚗 Транспорт".to_string(), amount("50.50")),
        ]
    );
    assert_eq!(totals.total, amount("301.25"));
}

#[tokio::test]
async fn unknown_labels_trail_the_fixed_set() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    for (category, sum) in [("Старая категория", "5"), ("🛒 Продукты", "10")] {
        let row = personal_row("2026-08-10 12:00:00", category, sum);
        store.append_row("42", &row).await.unwrap();
    }

    let totals = ledger
        .aggregate(UserId(42), StatsScope::Personal, range((2026, 8, 1), (2026, 8, 31)))
        .await
        .unwrap();

    assert_eq!(
        totals.by_category,
        vec![
            ("🛒 Продукты".to_string(), amount("10.00")),
            ("Старая категория".to_string(), amount("5.00")),
        ]
    );
}

#[tokio::test]
async fn empty_window_reports_no_data() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    let row = personal_row("2026-07-10 12:00:00", "🛒 Продукты", "10");
    store.append_row("42", &row).await.unwrap();

    let totals = ledger
        .aggregate(UserId(42), StatsScope::Personal, range((2026, 8, 1), (2026, 8, 31)))
        .await
        .unwrap();
    assert!(totals.is_empty());
    assert_eq!(totals.total, Amount::ZERO);
}

#[tokio::test]
async fn family_scope_needs_a_membership() {
    let (ledger, _store) = ledger_with_store();

    let err = ledger
        .aggregate(UserId(42), StatsScope::Family, range((2026, 8, 1), (2026, 8, 31)))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NoFamily);
}

#[tokio::test]
async fn both_scope_merges_personal_and_family() {
    let (ledger, store) = ledger_with_store();

    let family_id = ledger.create_family(UserId(42)).await.unwrap();
    ledger.ensure_user(UserId(42)).await.unwrap();

    let row = personal_row("2026-08-10 12:00:00", "🛒 Продукты", "100");
    store.append_row("42", &row).await.unwrap();
    let row = family_row("2026-08-11 12:00:00", "🛒 Продукты", "50", 42);
    store.append_row(family_id.as_str(), &row).await.unwrap();

    let window = range((2026, 8, 1), (2026, 8, 31));
    let both = ledger
        .aggregate(UserId(42), StatsScope::Both, window)
        .await
        .unwrap();
    assert_eq!(both.total, amount("150.00"));

    let family_only = ledger
        .aggregate(UserId(42), StatsScope::Family, window)
        .await
        .unwrap();
    assert_eq!(family_only.total, amount("50.00"));
}

#[tokio::test]
async fn both_scope_without_membership_is_personal_only() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    let row = personal_row("2026-08-10 12:00:00", "🛒 Продукты", "100");
    store.append_row("42", &row).await.unwrap();

    let totals = ledger
        .aggregate(UserId(42), StatsScope::Both, range((2026, 8, 1), (2026, 8, 31)))
        .await
        .unwrap();
    assert_eq!(totals.total, amount("100.00"));
}

#[tokio::test]
async fn personal_scope_skips_rows_of_other_kinds() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    let row = personal_row("2026-08-10 12:00:00", "🛒 Продукты", "100");
    store.append_row("42", &row).await.unwrap();
    // Legacy sheets can hold family rows; personal reports ignore them.
    let mut row = personal_row("2026-08-10 13:00:00", "🛒 Продукты", "999");
    row[5] = "Семейная".to_string();
    store.append_row("42", &row).await.unwrap();

    let totals = ledger
        .aggregate(UserId(42), StatsScope::Personal, range((2026, 8, 1), (2026, 8, 31)))
        .await
        .unwrap();
    assert_eq!(totals.total, amount("100.00"));
}

#[tokio::test]
async fn malformed_amount_fails_the_whole_report() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    let row = personal_row("2026-08-10 12:00:00", "🛒 Продукты", "100");
    store.append_row("42", &row).await.unwrap();
    let row = personal_row("2026-08-11 12:00:00", "🛒 Продукты", "not-a-number");
    store.append_row("42", &row).await.unwrap();

    let err = ledger
        .aggregate(UserId(42), StatsScope::Personal, range((2026, 8, 1), (2026, 8, 31)))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::MalformedRow { .. }));
}

#[tokio::test]
async fn draft_appends_feed_the_current_month() {
    let (ledger, _store) = ledger_with_store();

    ledger
        .append_expense(
            UserId(42),
            ExpenseDraft {
                kind: ExpenseKind::Personal,
                category: "🛒 Продукты".to_string(),
                amount: amount("150.50"),
                comment: String::new(),
            },
        )
        .await
        .unwrap();

    let window = DateRange::month_of(ledger.today());
    let totals = ledger
        .aggregate(UserId(42), StatsScope::Personal, window)
        .await
        .unwrap();
    assert_eq!(totals.total, amount("150.50"));
}
