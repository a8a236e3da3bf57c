//! Membership and cost contracts against `PostgreSQL`.
//!
//! These tests require a database reachable through
//! `STACKWISE_TEST_DATABASE_URL`. Each test creates its own catalog rows and
//! a random user, so they can share one database.
//!
//! Run with: cargo test -p stackwise-integration-tests -- --include-ignored

use rust_decimal::Decimal;
use stackwise_core::{ProductId, ServingsPerDay, UserId};
use stackwise_integration_tests::PgContext;
use stackwise_tracker::TrackerError;
use stackwise_tracker::auth::CurrentUser;
use stackwise_tracker::cost;
use stackwise_tracker::membership::RegisterOutcome;
use stackwise_tracker::profile::ProfileUpdate;
use stackwise_tracker::regimen::RemoveOutcome;

#[tokio::test]
#[ignore = "Requires PostgreSQL (STACKWISE_TEST_DATABASE_URL)"]
async fn test_pg_add_twice_is_idempotent() {
    let ctx = PgContext::connect().await;
    let supplement = ctx.insert_supplement("Magnesium").await;
    let product = ctx
        .insert_product("Glycinate", supplement, Decimal::new(18, 0), Some(120))
        .await;
    let user = UserId::random();

    let first = ctx.regimen.add_entry(user, product, None).await.expect("first add");
    assert!(matches!(first, RegisterOutcome::Accepted(_)));
    let second = ctx.regimen.add_entry(user, product, None).await.expect("second add");
    assert_eq!(second, RegisterOutcome::AlreadyExists);

    let items = ctx.regimen.list_entries(user).await.expect("list");
    assert_eq!(items.len(), 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STACKWISE_TEST_DATABASE_URL)"]
async fn test_pg_unknown_product_is_invalid_input() {
    let ctx = PgContext::connect().await;
    let user = UserId::random();

    let err = ctx
        .regimen
        .add_entry(user, ProductId::new(i32::MAX), None)
        .await
        .expect_err("foreign key should reject the insert");
    assert!(matches!(err, TrackerError::InvalidInput(_)), "{err:?}");
    assert!(ctx.regimen.list_entries(user).await.expect("list").is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STACKWISE_TEST_DATABASE_URL)"]
async fn test_pg_racing_adds_persist_one_entry() {
    let ctx = PgContext::connect().await;
    let supplement = ctx.insert_supplement("Zinc").await;
    let product = ctx
        .insert_product("Picolinate", supplement, Decimal::new(9, 0), Some(60))
        .await;
    let user = UserId::random();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let regimen = ctx.regimen.clone();
            tokio::spawn(async move { regimen.add_entry(user, product, None).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        let outcome = handle.await.expect("task panicked").expect("add failed");
        assert!(outcome.is_member(), "unexpected outcome {outcome:?}");
        if matches!(outcome, RegisterOutcome::Accepted(_)) {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(ctx.regimen.list_entries(user).await.expect("list").len(), 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STACKWISE_TEST_DATABASE_URL)"]
async fn test_pg_cost_and_zero_servings() {
    let ctx = PgContext::connect().await;
    let supplement = ctx.insert_supplement("Omega-3").await;
    let fish_oil = ctx
        .insert_product("Fish Oil", supplement, Decimal::new(30, 0), Some(60))
        .await;
    let broken = ctx
        .insert_product("Krill Oil", supplement, Decimal::new(40, 0), Some(0))
        .await;
    let user = UserId::random();

    let two = ServingsPerDay::new(Decimal::TWO).expect("dose");
    ctx.regimen.add_entry(user, fish_oil, Some(two)).await.expect("add fish");
    ctx.regimen.add_entry(user, broken, None).await.expect("add krill");

    let summary = cost::aggregate(&ctx.regimen.list_entries(user).await.expect("list"));
    assert_eq!(summary.monthly_cost, Decimal::new(30_437, 3));
    assert_eq!(summary.distinct_supplement_count, 1);
    assert_eq!(summary.flagged().count(), 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STACKWISE_TEST_DATABASE_URL)"]
async fn test_pg_remove_entry() {
    let ctx = PgContext::connect().await;
    let supplement = ctx.insert_supplement("Vitamin C").await;
    let product = ctx
        .insert_product("Ascorbic Acid", supplement, Decimal::new(8, 0), Some(100))
        .await;
    let user = UserId::random();

    ctx.regimen.add_entry(user, product, None).await.expect("add");
    assert_eq!(
        ctx.regimen.remove_entry(user, product).await.expect("remove"),
        RemoveOutcome::Removed
    );
    assert_eq!(
        ctx.regimen.remove_entry(user, product).await.expect("remove again"),
        RemoveOutcome::NotFound
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (STACKWISE_TEST_DATABASE_URL)"]
async fn test_pg_profile_upsert_is_idempotent() {
    let ctx = PgContext::connect().await;
    let user = CurrentUser::new(UserId::random());
    let update = ProfileUpdate {
        feet: Some(6),
        inches: Some(1),
        weight_lbs: Some(Decimal::new(190, 0)),
        ..ProfileUpdate::default()
    };

    let first = ctx
        .profiles
        .update_profile(&user, update.clone())
        .await
        .expect("first upsert");
    let second = ctx
        .profiles
        .update_profile(&user, update)
        .await
        .expect("second upsert");
    assert_eq!(first, second);

    let loaded = ctx.profiles.load_profile(&user).await.expect("load");
    assert_eq!(loaded.height, first.height);
}
