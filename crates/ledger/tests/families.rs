use std::sync::Arc;

use chrono_tz::Europe::Moscow;

use ledger::{FamilyId, Ledger, LedgerError, MemorySheets, SheetStore, UserId};

fn ledger_with_store() -> (Ledger, Arc<MemorySheets>) {
    let store = Arc::new(MemorySheets::new());
    (Ledger::new(store.clone(), Moscow), store)
}

#[tokio::test]
async fn create_family_provisions_sheet_and_membership() {
    let (ledger, store) = ledger_with_store();

    let family_id = ledger.create_family(UserId(42)).await.unwrap();
    assert!(family_id.as_str().starts_with("family-"));

    let titles = store.sheet_titles().await.unwrap();
    assert!(titles.iter().any(|t| t == family_id.as_str()));
    assert!(titles.iter().any(|t| t == "families_list"));

    let memberships = store.rows("families_list").await.unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0][0], family_id.as_str());
    assert_eq!(memberships[0][1], "42");
    assert_eq!(memberships[0][2], "creator");

    assert_eq!(ledger.family_of(UserId(42)).await.unwrap(), Some(family_id));
}

#[tokio::test]
async fn one_family_per_user() {
    let (ledger, _store) = ledger_with_store();

    let family_id = ledger.create_family(UserId(42)).await.unwrap();

    // The creator cannot found or join a second family.
    let err = ledger.create_family(UserId(42)).await.unwrap_err();
    assert_eq!(err, LedgerError::AlreadyMember);
    let err = ledger
        .join_family(UserId(42), &family_id)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::AlreadyMember);

    // A joined member cannot create a family of their own.
    ledger.join_family(UserId(7), &family_id).await.unwrap();
    let err = ledger.create_family(UserId(7)).await.unwrap_err();
    assert_eq!(err, LedgerError::AlreadyMember);
}

#[tokio::test]
async fn join_unknown_family_fails() {
    let (ledger, _store) = ledger_with_store();

    let bogus = FamilyId::from_input("family-zzzzzz").unwrap();
    let err = ledger.join_family(UserId(7), &bogus).await.unwrap_err();
    assert_eq!(err, LedgerError::NotFound("family-zzzzzz".to_string()));
}

#[tokio::test]
async fn joined_member_shares_the_family() {
    let (ledger, store) = ledger_with_store();

    let family_id = ledger.create_family(UserId(42)).await.unwrap();
    ledger.join_family(UserId(7), &family_id).await.unwrap();

    assert_eq!(
        ledger.family_of(UserId(7)).await.unwrap(),
        Some(family_id.clone())
    );

    let memberships = store.rows("families_list").await.unwrap();
    assert_eq!(memberships.len(), 2);
    assert_eq!(memberships[1], vec![family_id.to_string(), "7".to_string(), "member".to_string()]);
}

#[tokio::test]
async fn family_of_is_none_without_membership() {
    let (ledger, _store) = ledger_with_store();
    assert_eq!(ledger.family_of(UserId(42)).await.unwrap(), None);
}
