use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use common::{clock::FixedClock, error::AppError};
use entitlement::MemoryPersistence;
use friends::FriendRecord;
use session::{SessionSettings, UserSession};

fn friend(n: usize) -> FriendRecord {
    FriendRecord {
        id: format!("friend-{}", n),
        name: format!("Friend {}", n),
        avatar_ref: Some(format!("avatars/{}.png", n)),
        is_online: n % 2 == 0,
        last_seen_at: None,
    }
}

#[test]
fn free_user_upgrades_to_grow_past_the_limit() {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    let mut session = UserSession::open(
        Box::new(MemoryPersistence::new()),
        Arc::new(clock.clone()),
        SessionSettings {
            free_friend_limit: 5,
            daily_bonus_coins: 5,
        },
    )
    .unwrap();

    for n in 0..5 {
        session.add_friend(friend(n)).unwrap();
    }

    // 6th friend hits the free cap; the caller would show the paywall here
    assert!(!session.can_add_friend());
    let err = session.add_friend(friend(5)).unwrap_err();
    assert!(matches!(err, AppError::UpgradeRequired(_)));

    let ent = session.commit_purchase("monthly").unwrap();
    assert_eq!(
        ent.expires_at,
        Some(Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap())
    );
    assert!(session.is_entitled());

    session.add_friend(friend(5)).unwrap();
    for n in 6..20 {
        session.add_friend(friend(n)).unwrap();
    }
    assert_eq!(session.friends_overview().count, 20);

    // lapse: nobody is evicted, growth stops, removal still works
    clock.advance(Duration::days(40));
    assert!(!session.is_entitled());
    assert_eq!(session.friends_overview().count, 20);
    assert!(matches!(
        session.add_friend(friend(99)),
        Err(AppError::UpgradeRequired(_))
    ));
    session.remove_friend("friend-0").unwrap();
    assert_eq!(session.friends_overview().count, 19);
    assert_eq!(session.friends_overview().remaining_free_slots, Some(0));
}

#[test]
fn feature_gate_tracks_the_purchase() {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
    let mut session = UserSession::open(
        Box::new(MemoryPersistence::new()),
        Arc::new(clock.clone()),
        SessionSettings::default(),
    )
    .unwrap();

    assert!(!session.evaluate_feature("gender-filter").unwrap().is_allowed());
    assert!(matches!(
        session.evaluate_feature("unknown-feature"),
        Err(AppError::UnknownFeature(_))
    ));

    session.commit_purchase("weekly").unwrap();
    assert!(session.evaluate_feature("gender-filter").unwrap().is_allowed());
    assert!(session.evaluate_feature("unlimited-time").unwrap().is_allowed());

    clock.advance(Duration::days(7));
    assert!(!session.evaluate_feature("gender-filter").unwrap().is_allowed());

    assert!(matches!(
        session.commit_purchase("quarterly"),
        Err(AppError::InvalidPlan(_))
    ));
}
