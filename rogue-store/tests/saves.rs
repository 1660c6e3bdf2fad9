mod common;

use common::TestStore;
use rogue_store::{ErrorKind, SessionSlot};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires database"]
async fn system_save_upsert_and_delete() {
    let db = TestStore::new().await;
    let id = db.account("cynthia").await;
    let saves = db.store.saves();

    assert_eq!(saves.read_system(id).await.unwrap_err().kind(), ErrorKind::NotFound);

    saves.write_system(id, b"first").await.unwrap();
    let first = saves.read_system(id).await.unwrap();
    saves.write_system(id, b"second").await.unwrap();
    let second = saves.read_system(id).await.unwrap();
    assert_eq!(second.data, b"second");
    assert!(second.timestamp >= first.timestamp);

    saves.delete_system(id).await.unwrap();
    saves.delete_system(id).await.unwrap();
    assert_eq!(saves.read_system(id).await.unwrap_err().kind(), ErrorKind::NotFound);

    let err = saves.write_system(Uuid::new_v4(), b"orphan").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn session_slots_are_independent() {
    let db = TestStore::new().await;
    let id = db.account("steven").await;
    let saves = db.store.saves();
    let slot = |n| SessionSlot::new(n).unwrap();

    saves.write_session(id, slot(4), &[4, 4]).await.unwrap();
    saves.write_session(id, slot(0), &[0]).await.unwrap();
    assert_eq!(saves.session_slots(id).await.unwrap(), vec![slot(0), slot(4)]);
    assert_eq!(saves.read_session(id, slot(4)).await.unwrap().data, vec![4, 4]);
    assert_eq!(saves.read_session(id, slot(2)).await.unwrap_err().kind(), ErrorKind::NotFound);

    saves.delete_session(id, slot(0)).await.unwrap();
    assert_eq!(saves.session_slots(id).await.unwrap(), vec![slot(4)]);

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn account_deletion_cascades() {
    let db = TestStore::new().await;
    let id = db.account("wallace").await;
    db.store.saves().write_system(id, b"blob").await.unwrap();
    db.store.sessions().issue("wallace").await.unwrap();

    sqlx::query("DELETE FROM accounts WHERE uuid = $1")
        .bind(id)
        .execute(db.pool())
        .await
        .unwrap();

    let left: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM system_save_data) + (SELECT COUNT(*) FROM sessions)",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(left, 0);

    db.teardown().await;
}
