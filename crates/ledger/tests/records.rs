use std::collections::HashSet;
use std::sync::Arc;

use chrono_tz::Europe::Moscow;
use uuid::Uuid;

use ledger::{
    ExpenseDraft, ExpenseField, ExpenseKind, Ledger, LedgerError, MemorySheets, SheetStore, UserId,
};

fn ledger_with_store() -> (Ledger, Arc<MemorySheets>) {
    let store = Arc::new(MemorySheets::new());
    (Ledger::new(store.clone(), Moscow), store)
}

fn draft(kind: ExpenseKind, category: &str, amount: &str, comment: &str) -> ExpenseDraft {
    ExpenseDraft {
        kind,
        category: category.to_string(),
        amount: amount.parse().unwrap(),
        comment: comment.to_string(),
    }
}

fn raw_personal_row(id: Uuid, date: &str, category: &str, amount: &str) -> Vec<String> {
    vec![
        id.to_string(),
        date.to_string(),
        category.to_string(),
        amount.to_string(),
        String::new(),
        "Личная".to_string(),
        String::new(),
    ]
}

#[tokio::test]
async fn append_personal_lands_in_the_user_sheet() {
    let (ledger, store) = ledger_with_store();

    let expense = ledger
        .append_expense(
            UserId(42),
            draft(ExpenseKind::Personal, "🛒 Продукты", "150.50", "groceries"),
        )
        .await
        .unwrap();

    let rows = store.rows("42").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], expense.id.to_string());
    assert_eq!(rows[0][2], "🛒 Продукты");
    assert_eq!(rows[0][3], "150.50");
    assert_eq!(rows[0][5], "Личная");
    assert_eq!(rows[0][6], "groceries");

    let recent = ledger.list_recent(UserId(42), 5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0], expense);
}

#[tokio::test]
async fn expense_ids_are_unique() {
    let (ledger, _store) = ledger_with_store();

    let mut seen = HashSet::new();
    for _ in 0..20 {
        let expense = ledger
            .append_expense(
                UserId(42),
                draft(ExpenseKind::Personal, "💼 Прочее", "1", ""),
            )
            .await
            .unwrap();
        assert!(seen.insert(expense.id));
    }
}

#[tokio::test]
async fn family_append_needs_a_membership() {
    let (ledger, _store) = ledger_with_store();

    let err = ledger
        .append_expense(
            UserId(42),
            draft(ExpenseKind::Family, "🛒 Продукты", "99", ""),
        )
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NoFamily);
}

#[tokio::test]
async fn family_append_is_visible_to_every_member() {
    let (ledger, store) = ledger_with_store();

    let family_id = ledger.create_family(UserId(42)).await.unwrap();
    ledger.join_family(UserId(7), &family_id).await.unwrap();

    let expense = ledger
        .append_expense(
            UserId(42),
            draft(ExpenseKind::Family, "🍔 Еда вне дома", "400", "dinner"),
        )
        .await
        .unwrap();
    assert_eq!(expense.owner, Some(UserId(42)));

    let rows = store.rows(family_id.as_str()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][6], "42");

    let recent = ledger.list_recent(UserId(7), 5).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, expense.id);
    assert_eq!(recent[0].kind, ExpenseKind::Family);
}

#[tokio::test]
async fn list_recent_sorts_newest_first_and_truncates() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    for day in 1..=7 {
        let row = raw_personal_row(
            Uuid::new_v4(),
            &format!("2026-08-{day:02} 12:00:00"),
            "💼 Прочее",
            "10.00",
        );
        store.append_row("42", &row).await.unwrap();
    }

    let recent = ledger.list_recent(UserId(42), 5).await.unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].recorded_at.to_string(), "2026-08-07 12:00:00");
    assert_eq!(recent[4].recorded_at.to_string(), "2026-08-03 12:00:00");
}

#[tokio::test]
async fn rows_without_id_are_invisible_to_listing() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    // A pre-migration row: blank id, still well formed otherwise.
    let mut row = raw_personal_row(Uuid::new_v4(), "2026-08-01 09:00:00", "💼 Прочее", "5");
    row[0] = String::new();
    store.append_row("42", &row).await.unwrap();

    assert!(ledger.list_recent(UserId(42), 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_probes_personal_then_family() {
    let (ledger, store) = ledger_with_store();

    let family_id = ledger.create_family(UserId(42)).await.unwrap();
    let personal = ledger
        .append_expense(UserId(42), draft(ExpenseKind::Personal, "💼 Прочее", "1", ""))
        .await
        .unwrap();
    let family = ledger
        .append_expense(UserId(42), draft(ExpenseKind::Family, "💼 Прочее", "2", ""))
        .await
        .unwrap();

    let kind = ledger.delete_expense(UserId(42), personal.id).await.unwrap();
    assert_eq!(kind, ExpenseKind::Personal);
    assert!(store.rows("42").await.unwrap().is_empty());

    let kind = ledger.delete_expense(UserId(42), family.id).await.unwrap();
    assert_eq!(kind, ExpenseKind::Family);
    assert!(store.rows(family_id.as_str()).await.unwrap().is_empty());

    // Deleting the same id again reports it missing.
    let err = ledger
        .delete_expense(UserId(42), personal.id)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NotFound(personal.id.to_string()));
}

#[tokio::test]
async fn update_field_targets_the_row_by_id() {
    let (ledger, store) = ledger_with_store();

    let first = ledger
        .append_expense(UserId(42), draft(ExpenseKind::Personal, "💼 Прочее", "1", "a"))
        .await
        .unwrap();
    let second = ledger
        .append_expense(UserId(42), draft(ExpenseKind::Personal, "💼 Прочее", "2", "b"))
        .await
        .unwrap();

    // Shift the remaining row up; the edit still finds it by id.
    ledger.delete_expense(UserId(42), first.id).await.unwrap();
    ledger
        .update_field(UserId(42), second.id, ExpenseField::Comment, "updated")
        .await
        .unwrap();

    let rows = store.rows("42").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][6], "updated");
}

#[tokio::test]
async fn update_field_validates_the_value() {
    let (ledger, store) = ledger_with_store();

    let expense = ledger
        .append_expense(UserId(42), draft(ExpenseKind::Personal, "💼 Прочее", "1", ""))
        .await
        .unwrap();

    let err = ledger
        .update_field(UserId(42), expense.id, ExpenseField::Category, "Еда")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));

    let err = ledger
        .update_field(UserId(42), expense.id, ExpenseField::Amount, "abc")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));

    // The amount is stored canonically.
    ledger
        .update_field(UserId(42), expense.id, ExpenseField::Amount, "3,5")
        .await
        .unwrap();
    assert_eq!(store.rows("42").await.unwrap()[0][3], "3.50");
}

#[tokio::test]
async fn update_field_does_not_touch_family_rows() {
    let (ledger, _store) = ledger_with_store();

    ledger.create_family(UserId(42)).await.unwrap();
    let family = ledger
        .append_expense(UserId(42), draft(ExpenseKind::Family, "💼 Прочее", "2", ""))
        .await
        .unwrap();

    let err = ledger
        .update_field(UserId(42), family.id, ExpenseField::Comment, "nope")
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NotFound(family.id.to_string()));
}

#[tokio::test]
async fn has_expense_on_checks_the_personal_sheet() {
    let (ledger, store) = ledger_with_store();
    ledger.ensure_user(UserId(42)).await.unwrap();

    let today = ledger.today();
    assert!(!ledger.has_expense_on(UserId(42), today).await.unwrap());

    let row = raw_personal_row(Uuid::new_v4(), "2026-08-01 10:00:00", "💼 Прочее", "5");
    store.append_row("42", &row).await.unwrap();
    ledger
        .append_expense(UserId(42), draft(ExpenseKind::Personal, "💼 Прочее", "5", ""))
        .await
        .unwrap();

    assert!(ledger.has_expense_on(UserId(42), today).await.unwrap());
}
