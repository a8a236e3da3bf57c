//! Membership contracts: idempotent adds and racing adds.

use rust_decimal::Decimal;
use stackwise_core::{ProductId, ServingsPerDay, UserId};
use stackwise_integration_tests::MemoryContext;
use stackwise_tracker::TrackerError;
use stackwise_tracker::membership::RegisterOutcome;
use stackwise_tracker::regimen::RemoveOutcome;

#[tokio::test]
async fn test_add_twice_is_idempotent() {
    let ctx = MemoryContext::new();
    let user = UserId::random();

    let first = ctx
        .regimen
        .add_entry(user, ctx.fish_oil, None)
        .await
        .expect("first add");
    assert!(matches!(first, RegisterOutcome::Accepted(_)));

    let second = ctx
        .regimen
        .add_entry(user, ctx.fish_oil, Some(ServingsPerDay::new(Decimal::TWO).expect("dose")))
        .await
        .expect("second add");
    assert_eq!(second, RegisterOutcome::AlreadyExists);
    assert_eq!(ctx.store.entry_count(user), 1);

    // The first dose is kept.
    let items = ctx.regimen.list_entries(user).await.expect("list");
    assert_eq!(items[0].servings_per_day, ServingsPerDay::default());
}

#[tokio::test]
async fn test_racing_adds_persist_one_entry() {
    let ctx = MemoryContext::new();
    let user = UserId::random();

    // Both lookups miss, as they would when two clients check before either
    // has inserted.
    ctx.store.set_stale_reads(true);
    let (a, b) = tokio::join!(
        ctx.regimen.add_entry(user, ctx.fish_oil, None),
        ctx.regimen.add_entry(user, ctx.fish_oil, None),
    );
    let outcomes = [a.expect("first racer"), b.expect("second racer")];

    let accepted = outcomes
        .iter()
        .filter(|o| matches!(o, RegisterOutcome::Accepted(_)))
        .count();
    let already = outcomes
        .iter()
        .filter(|o| **o == RegisterOutcome::AlreadyExists)
        .count();
    assert_eq!((accepted, already), (1, 1));
    assert_eq!(ctx.store.entry_count(user), 1);
}

#[tokio::test]
async fn test_many_spawned_adds_persist_one_entry() {
    let ctx = MemoryContext::new();
    let user = UserId::random();
    ctx.store.set_stale_reads(true);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let regimen = ctx.regimen.clone();
            let product = ctx.algae_oil;
            tokio::spawn(async move { regimen.add_entry(user, product, None).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        let outcome = handle.await.expect("task panicked").expect("add failed");
        assert!(outcome.is_member());
        if matches!(outcome, RegisterOutcome::Accepted(_)) {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(ctx.store.entry_count(user), 1);
}

#[tokio::test]
async fn test_users_do_not_share_entries() {
    let ctx = MemoryContext::new();
    let alice = UserId::random();
    let bob = UserId::random();

    ctx.regimen.add_entry(alice, ctx.fish_oil, None).await.expect("alice add");
    let outcome = ctx.regimen.add_entry(bob, ctx.fish_oil, None).await.expect("bob add");

    assert!(matches!(outcome, RegisterOutcome::Accepted(_)));
    assert_eq!(ctx.store.entry_count(alice), 1);
    assert_eq!(ctx.store.entry_count(bob), 1);
}

#[tokio::test]
async fn test_denied_add_is_typed_outcome() {
    let ctx = MemoryContext::new();
    let user = UserId::random();
    ctx.store.deny_writes_for(user);

    let outcome = ctx
        .regimen
        .add_entry(user, ctx.fish_oil, None)
        .await
        .expect("denial is not an error");
    assert!(matches!(outcome, RegisterOutcome::Denied { .. }));
    assert_eq!(ctx.store.entry_count(user), 0);
}

#[tokio::test]
async fn test_connectivity_failure_propagates_without_writing() {
    let ctx = MemoryContext::new();
    let user = UserId::random();
    ctx.store.set_offline(true);

    let err = ctx
        .regimen
        .add_entry(user, ctx.fish_oil, None)
        .await
        .expect_err("offline store");
    assert!(err.is_retryable());

    ctx.store.set_offline(false);
    assert_eq!(ctx.store.entry_count(user), 0);
}

#[tokio::test]
async fn test_invalid_servings_input_never_writes() {
    let ctx = MemoryContext::new();
    let user = UserId::random();

    let err = ctx
        .regimen
        .add_entry_from_input(user, ctx.fish_oil, "a few")
        .await
        .expect_err("non-numeric dose");
    assert!(matches!(err, TrackerError::InvalidInput(_)));

    let err = ctx
        .regimen
        .add_entry_from_input(user, ctx.fish_oil, "250")
        .await
        .expect_err("dose above the upper bound");
    assert!(matches!(err, TrackerError::InvalidInput(_)));
    assert_eq!(ctx.store.entry_count(user), 0);

    let outcome = ctx
        .regimen
        .add_entry_from_input(user, ctx.fish_oil, " 1.5 ")
        .await
        .expect("valid dose");
    let RegisterOutcome::Accepted(entry) = &outcome else {
        panic!("expected Accepted, got {outcome:?}");
    };
    assert_eq!(entry.servings_per_day.get(), Decimal::new(15, 1));
}

#[tokio::test]
async fn test_unknown_product_never_writes() {
    let ctx = MemoryContext::new();
    let user = UserId::random();

    let err = ctx
        .regimen
        .add_entry(user, ProductId::new(404), None)
        .await
        .expect_err("product is not in the catalog");
    assert!(matches!(err, TrackerError::InvalidInput(_)));
    assert_eq!(ctx.store.entry_count(user), 0);
}

#[tokio::test]
async fn test_remove_then_add_again() {
    let ctx = MemoryContext::new();
    let user = UserId::random();
    ctx.regimen.add_entry(user, ctx.fish_oil, None).await.expect("add");

    let removed = ctx.regimen.remove_entry(user, ctx.fish_oil).await.expect("remove");
    assert_eq!(removed, RemoveOutcome::Removed);

    let outcome = ctx.regimen.add_entry(user, ctx.fish_oil, None).await.expect("re-add");
    assert!(matches!(outcome, RegisterOutcome::Accepted(_)));
}
