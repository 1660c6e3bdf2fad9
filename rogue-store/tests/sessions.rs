mod common;

use common::TestStore;
use rogue_store::{ErrorKind, SessionToken};

#[tokio::test]
#[ignore = "requires database"]
async fn new_session_deactivates_previous() {
    let db = TestStore::new().await;
    let id = db.account("red").await;
    let sessions = db.store.sessions();

    let first = sessions.issue("red").await.unwrap();
    let second = sessions.issue("red").await.unwrap();

    assert!(!sessions.is_active(&first).await.unwrap());
    assert!(sessions.is_active(&second).await.unwrap());
    assert_eq!(sessions.resolve_account(&second).await.unwrap(), id);
    assert!(db.store.accounts().get(id).await.unwrap().last_logged_in.is_some());

    // Reconciliation flips the active session back
    sessions.activate(&first).await.unwrap();
    assert!(sessions.is_active(&first).await.unwrap());
    assert!(!sessions.is_active(&second).await.unwrap());

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn concurrent_logins_leave_one_active() {
    let db = TestStore::new().await;
    let id = db.account("blue").await;

    let sessions = db.store.sessions();
    let (a, b) = tokio::join!(sessions.issue("blue"), sessions.issue("blue"));
    a.unwrap();
    b.unwrap();

    let active: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE uuid = $1 AND active")
            .bind(id)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(active, 1);

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn unknown_and_expired_tokens() {
    let db = TestStore::new().await;
    db.account("leaf").await;
    let sessions = db.store.sessions();

    let stranger = SessionToken::generate();
    assert_eq!(sessions.is_active(&stranger).await.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(sessions.resolve_account(&stranger).await.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(sessions.activate(&stranger).await.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(sessions.issue("nobody").await.unwrap_err().kind(), ErrorKind::NotFound);

    let token = sessions.issue("leaf").await.unwrap();
    sqlx::query("UPDATE sessions SET expire = NOW() - INTERVAL '1 minute' WHERE token = $1")
        .bind(token.as_bytes())
        .execute(db.pool())
        .await
        .unwrap();
    assert_eq!(sessions.resolve_account(&token).await.unwrap_err().kind(), ErrorKind::Expired);

    assert_eq!(sessions.purge_expired().await.unwrap(), 1);
    assert_eq!(sessions.is_active(&token).await.unwrap_err().kind(), ErrorKind::NotFound);

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn revoke_is_idempotent() {
    let db = TestStore::new().await;
    db.account("gold").await;
    let sessions = db.store.sessions();

    let token = sessions.issue("gold").await.unwrap();
    sessions.revoke(&token).await.unwrap();
    sessions.revoke(&token).await.unwrap();
    assert_eq!(sessions.is_active(&token).await.unwrap_err().kind(), ErrorKind::NotFound);

    db.teardown().await;
}
