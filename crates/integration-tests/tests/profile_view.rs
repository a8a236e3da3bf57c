//! Profile view assembly and presentation-unit conversion.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use stackwise_core::{Centimeters, FeetInches, Gender, Kilograms, UserId};
use stackwise_integration_tests::MemoryContext;
use stackwise_tracker::auth::CurrentUser;
use stackwise_tracker::profile::{DEFAULT_AVATAR_URL, ProfileUpdate};

#[test]
fn test_height_round_trip_within_tolerance() {
    let stored = Centimeters::new(Decimal::new(18288, 2)).expect("height");
    let presented = stored.to_feet_inches().expect("presentable");
    assert_eq!(presented, FeetInches { feet: 6, inches: 0 });

    let back = presented.to_centimeters();
    assert!((back.get() - stored.get()).abs() <= Decimal::ONE);
}

#[test]
fn test_weight_presented_in_whole_pounds() {
    let weight = Kilograms::new(Decimal::new(80, 0)).expect("weight");
    // 80 * 2.20462 = 176.3696
    assert_eq!(weight.to_pounds().get(), Decimal::new(176, 0));
}

#[tokio::test]
async fn test_view_for_user_with_regimen_and_profile() {
    let ctx = MemoryContext::new();
    let user = CurrentUser {
        email: Some("sam@example.com".to_string()),
        display_name: Some("Sam".to_string()),
        ..CurrentUser::new(UserId::random())
    };

    ctx.regimen.add_entry(user.id, ctx.fish_oil, None).await.expect("add fish");
    ctx.regimen.add_entry(user.id, ctx.algae_oil, None).await.expect("add algae");
    ctx.profiles
        .update_profile(
            &user,
            ProfileUpdate {
                date_of_birth: NaiveDate::from_ymd_opt(1991, 7, 14),
                gender: Some(Gender::Other),
                feet: Some(5),
                inches: Some(11),
                weight_lbs: Some(Decimal::new(172, 0)),
            },
        )
        .await
        .expect("update profile");

    let view = ctx.profiles.build_profile_view(&user).await.expect("view");
    assert_eq!(view.user.display_name, "Sam");
    assert_eq!(view.user.avatar_url, DEFAULT_AVATAR_URL);
    assert_eq!(view.entries.len(), 2);
    assert_eq!(view.distinct_supplement_count, 1);
    assert_eq!(view.demographics.height, Some(FeetInches { feet: 5, inches: 11 }));
    assert_eq!(
        view.demographics.weight.map(|w| w.get()),
        Some(Decimal::new(172, 0))
    );
    assert_eq!(view.demographics.gender, Some(Gender::Other));
}

#[tokio::test]
async fn test_stored_profile_uses_canonical_units() {
    let ctx = MemoryContext::new();
    let user = CurrentUser::new(UserId::random());

    let saved = ctx
        .profiles
        .update_profile(
            &user,
            ProfileUpdate {
                feet: Some(6),
                ..ProfileUpdate::default()
            },
        )
        .await
        .expect("update profile");

    // Zero inches still records the height.
    assert_eq!(
        saved.height.map(|h| h.get()),
        Some(Decimal::new(18288, 2))
    );
}

#[tokio::test]
async fn test_invalid_measurements_rejected() {
    let ctx = MemoryContext::new();
    let user = CurrentUser::new(UserId::random());

    for update in [
        ProfileUpdate {
            feet: Some(5),
            inches: Some(12),
            ..ProfileUpdate::default()
        },
        ProfileUpdate {
            weight_lbs: Some(Decimal::ZERO),
            ..ProfileUpdate::default()
        },
    ] {
        assert!(ctx.profiles.update_profile(&user, update).await.is_err());
    }
    let profile = ctx.profiles.load_profile(&user).await.expect("load");
    assert!(profile.height.is_none());
    assert!(profile.weight.is_none());
}
