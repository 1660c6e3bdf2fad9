mod common;

use chrono::NaiveDate;
use common::TestStore;
use rogue_store::{ErrorKind, Page, RankingCategory};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires database"]
async fn seed_registration_is_first_writer_wins() {
    let db = TestStore::new().await;
    let daily = db.store.daily();

    let (a, b) = tokio::join!(daily.register_seed("seed-a"), daily.register_seed("seed-a"));
    assert_ne!(a.unwrap(), b.unwrap());
    assert!(!daily.register_seed("seed-a").await.unwrap());

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_runs WHERE seed = 'seed-a'")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let kept_today: bool = sqlx::query_scalar(
        "SELECT date = timezone('UTC', now())::date FROM daily_runs WHERE seed = 'seed-a'",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert!(kept_today);

    assert_eq!(daily.register_seed("").await.unwrap_err().kind(), ErrorKind::InvalidArgument);

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn score_and_wave_grow_independently() {
    let db = TestStore::new().await;
    let id = db.account("ethan").await;
    let daily = db.store.daily();

    let today: NaiveDate = sqlx::query_scalar("SELECT timezone('UTC', now())::date")
        .fetch_one(db.pool())
        .await
        .unwrap();

    daily.record_run(id, 100, 5).await.unwrap();
    let first = daily.daily_run(id, today).await.unwrap();
    daily.record_run(id, 80, 10).await.unwrap();

    let run = daily.daily_run(id, today).await.unwrap().unwrap();
    assert_eq!((run.score, run.wave), (100, 10));
    // No improvement in score, so the achievement time stays put
    assert_eq!(Some(run.timestamp), first.map(|r| r.timestamp));

    daily.record_run(id, 150, 1).await.unwrap();
    let run = daily.daily_run(id, today).await.unwrap().unwrap();
    assert_eq!((run.score, run.wave), (150, 10));

    let err = daily.record_run(Uuid::new_v4(), 1, 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn equal_scores_rank_earliest_first() {
    let db = TestStore::new().await;
    let early = db.account("lyra").await;
    let late = db.account("kris").await;
    let daily = db.store.daily();

    daily.register_seed("today").await.unwrap();
    daily.record_run(late, 500, 20).await.unwrap();
    daily.record_run(early, 500, 18).await.unwrap();

    sqlx::query("UPDATE account_daily_runs SET timestamp = NOW() - INTERVAL '1 hour' WHERE uuid = $1")
        .bind(early)
        .execute(db.pool())
        .await
        .unwrap();

    let board = daily.rankings(RankingCategory::Daily, Page::FIRST).await.unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!((board[0].rank, board[0].username.as_str()), (1, "lyra"));
    assert_eq!((board[1].rank, board[1].username.as_str()), (2, "kris"));
    assert_eq!(board[0].wave, 18);

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn page_count_and_paging() {
    let db = TestStore::new().await;
    let daily = db.store.daily();

    assert_eq!(daily.page_count(RankingCategory::Daily).await.unwrap(), 0);

    daily.register_seed("busy-day").await.unwrap();
    for n in 0..23 {
        let id = db.account(&format!("player{n:02}")).await;
        daily.record_run(id, 1000 - n, 1).await.unwrap();
    }

    assert_eq!(daily.page_count(RankingCategory::Daily).await.unwrap(), 3);
    assert_eq!(daily.page_count(RankingCategory::Weekly).await.unwrap(), 3);

    let third = daily.rankings(RankingCategory::Daily, Page::new(3).unwrap()).await.unwrap();
    assert_eq!(third.len(), 3);
    assert_eq!(third[0].rank, 21);
    assert_eq!(third[0].username, "player20");

    let beyond = daily.rankings(RankingCategory::Daily, Page::new(4).unwrap()).await.unwrap();
    assert!(beyond.is_empty());

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn unseeded_days_and_banned_accounts_are_excluded() {
    let db = TestStore::new().await;
    let honest = db.account("silver").await;
    let cheat = db.account("archer").await;
    let daily = db.store.daily();

    daily.record_run(honest, 300, 12).await.unwrap();
    daily.record_run(cheat, 9999, 200).await.unwrap();

    // No seed registered for today yet
    assert!(daily.rankings(RankingCategory::Daily, Page::FIRST).await.unwrap().is_empty());
    assert_eq!(daily.page_count(RankingCategory::Daily).await.unwrap(), 0);

    daily.register_seed("late-seed").await.unwrap();
    db.store.accounts().set_banned(cheat, true).await.unwrap();

    let board = daily.rankings(RankingCategory::Daily, Page::FIRST).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].username, "silver");
    assert_eq!(daily.page_count(RankingCategory::Daily).await.unwrap(), 1);

    let weekly = daily.rankings(RankingCategory::Weekly, Page::FIRST).await.unwrap();
    assert_eq!(weekly.len(), 1);

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn weekly_board_sums_scores() {
    let db = TestStore::new().await;
    let steady = db.account("hilbert").await;
    let burst = db.account("hilda").await;
    let daily = db.store.daily();

    daily.register_seed("week-seed").await.unwrap();
    daily.record_run(steady, 400, 30).await.unwrap();
    daily.record_run(burst, 600, 40).await.unwrap();

    // An earlier day this week, only when today is not Sunday
    let week_start_offset: i32 = sqlx::query_scalar(
        "SELECT EXTRACT(DOW FROM timezone('UTC', now())::date)::int",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    if week_start_offset > 0 {
        sqlx::query(
            "INSERT INTO daily_runs (seed, date) VALUES ('yesterday', timezone('UTC', now())::date - 1)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            r#"
            INSERT INTO account_daily_runs (uuid, date, score, wave, timestamp)
            VALUES ($1, timezone('UTC', now())::date - 1, 300, 25, NOW() - INTERVAL '1 day')
            "#,
        )
        .bind(steady)
        .execute(db.pool())
        .await
        .unwrap();
    }

    let board = daily.rankings(RankingCategory::Weekly, Page::FIRST).await.unwrap();
    assert_eq!(board.len(), 2);
    assert!(board.iter().all(|r| r.wave == 0));

    if week_start_offset > 0 {
        assert_eq!(board[0].username, "hilbert");
        assert_eq!(board[0].score, 700);
    } else {
        assert_eq!(board[0].username, "hilda");
        assert_eq!(board[0].score, 600);
    }

    db.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn weekly_ties_go_to_earliest_run_then_username() {
    let db = TestStore::new().await;
    // Alphabetical order is the reverse of achievement order
    let early = db.account("zinnia").await;
    let late = db.account("anabel").await;
    let daily = db.store.daily();

    daily.register_seed("tie-week").await.unwrap();
    daily.record_run(early, 500, 10).await.unwrap();
    daily.record_run(late, 500, 12).await.unwrap();

    let backdate = |id: Uuid, hours: i32| {
        sqlx::query(
            "UPDATE account_daily_runs SET timestamp = NOW() - make_interval(hours => $2) WHERE uuid = $1",
        )
        .bind(id)
        .bind(hours)
        .execute(db.pool())
    };
    backdate(early, 3).await.unwrap();
    backdate(late, 1).await.unwrap();

    let board = daily.rankings(RankingCategory::Weekly, Page::FIRST).await.unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!((board[0].rank, board[0].username.as_str(), board[0].score), (1, "zinnia", 500));
    assert_eq!((board[1].rank, board[1].username.as_str(), board[1].score), (2, "anabel", 500));

    // Same sum and same earliest run: shared rank, listed by username
    sqlx::query("UPDATE account_daily_runs SET timestamp = '2000-01-01T00:00:00Z'")
        .execute(db.pool())
        .await
        .unwrap();
    let board = daily.rankings(RankingCategory::Weekly, Page::FIRST).await.unwrap();
    assert_eq!((board[0].rank, board[0].username.as_str()), (1, "anabel"));
    assert_eq!((board[1].rank, board[1].username.as_str()), (1, "zinnia"));

    db.teardown().await;
}
