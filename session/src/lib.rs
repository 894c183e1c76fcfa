//! Per-user policy service.
//!
//! One [`UserSession`] owns a user's entitlement, friend list, wallet and
//! match preference, and is handed its clock and persistence when built.
//! Callers ask it before acting instead of reading shared premium state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{clock::Clock, error::Res};
use entitlement::{Entitlement, EntitlementPersistence, EntitlementStatus, EntitlementStore};
use friends::{CapacityPolicy, FriendList, FriendRecord, format_last_seen};
use gate::{Decision, GenderPreference, select_gender};
use serde::Serialize;
use wallet::{BonusDecision, BonusOutcome, Wallet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub free_friend_limit: usize,
    pub daily_bonus_coins: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            free_friend_limit: 5,
            daily_bonus_coins: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendView {
    #[serde(flatten)]
    pub record: FriendRecord,
    pub last_seen: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendsOverview {
    pub friends: Vec<FriendView>,
    pub count: usize,
    pub online_count: usize,
    pub free_limit: usize,
    /// `None` while entitled, the cap does not apply then.
    pub remaining_free_slots: Option<usize>,
    pub can_add_more: bool,
}

pub struct UserSession {
    entitlement: EntitlementStore,
    friends: FriendList,
    wallet: Wallet,
    gender: GenderPreference,
    policy: CapacityPolicy,
    daily_bonus_coins: u64,
    clock: Arc<dyn Clock>,
}

impl UserSession {
    pub fn open(
        persistence: Box<dyn EntitlementPersistence>,
        clock: Arc<dyn Clock>,
        settings: SessionSettings,
    ) -> Res<Self> {
        Ok(Self {
            entitlement: EntitlementStore::open(persistence)?,
            friends: FriendList::new(),
            wallet: Wallet::default(),
            gender: GenderPreference::default(),
            policy: CapacityPolicy::new(settings.free_friend_limit),
            daily_bonus_coins: settings.daily_bonus_coins,
            clock,
        })
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// True when nothing but the entitlement was ever touched, so dropping the
    /// session loses no state that lives only in memory.
    pub fn is_untouched(&self) -> bool {
        self.friends.is_empty()
            && self.wallet == Wallet::default()
            && self.gender == GenderPreference::Any
    }

    // === ENTITLEMENT ===

    pub fn is_entitled(&self) -> bool {
        self.entitlement.is_entitled(self.now())
    }

    pub fn entitlement(&self) -> Entitlement {
        self.entitlement.current()
    }

    pub fn entitlement_status(&self) -> EntitlementStatus {
        self.entitlement.status(self.now())
    }

    /// Call only once the payment is settled.
    pub fn commit_purchase(&mut self, plan_id: &str) -> Res<Entitlement> {
        let now = self.now();
        let entitlement = self.entitlement.commit_purchase(plan_id, now)?;
        log::info!("Premium {} active until {:?}", plan_id, entitlement.expires_at);
        Ok(entitlement)
    }

    pub fn logout(&mut self) -> Res<()> {
        self.gender = GenderPreference::Any;
        self.entitlement.clear()
    }

    // === FRIENDS ===

    pub fn can_add_friend(&self) -> bool {
        self.policy.can_add(self.friends.len(), self.is_entitled())
    }

    pub fn add_friend(&mut self, friend: FriendRecord) -> Res<()> {
        let entitled = self.is_entitled();
        self.friends.add(friend, entitled, &self.policy)
    }

    pub fn remove_friend(&mut self, id: &str) -> Res<FriendRecord> {
        let removed = self.friends.remove(id)?;
        log::debug!("Removed friend {}, {} left", removed.id, self.friends.len());
        Ok(removed)
    }

    pub fn set_presence(&mut self, id: &str, is_online: bool) -> Res<FriendRecord> {
        let now = self.now();
        self.friends.set_presence(id, is_online, now).cloned()
    }

    pub fn friends_overview(&self) -> FriendsOverview {
        let now = self.now();
        let entitled = self.entitlement.is_entitled(now);
        let count = self.friends.len();

        FriendsOverview {
            friends: self
                .friends
                .iter()
                .map(|f| FriendView {
                    record: f.clone(),
                    last_seen: format_last_seen(f.last_seen_at, now),
                })
                .collect(),
            count,
            online_count: self.friends.online_count(),
            free_limit: self.policy.free_limit,
            remaining_free_slots: (!entitled).then(|| self.policy.remaining(count)),
            can_add_more: self.policy.can_add(count, entitled),
        }
    }

    // === FEATURES ===

    pub fn evaluate_feature(&self, request: &str) -> Res<Decision> {
        gate::evaluate(request, self.is_entitled())
    }

    /// Stores the preference only when it is allowed.
    pub fn select_gender(&mut self, preference: GenderPreference) -> Decision {
        let decision = select_gender(preference, self.is_entitled());
        if decision.is_allowed() {
            self.gender = preference;
        }
        decision
    }

    /// The preference matching should use right now. A lapsed premium falls back to `Any`.
    pub fn effective_gender(&self) -> GenderPreference {
        if select_gender(self.gender, self.is_entitled()).is_allowed() {
            self.gender
        } else {
            GenderPreference::Any
        }
    }

    // === WALLET ===

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn daily_bonus_available(&self) -> bool {
        self.wallet.can_claim_daily_bonus(self.now().date_naive())
    }

    pub fn resolve_daily_bonus(&mut self, decision: BonusDecision) -> Res<BonusOutcome> {
        let today = self.now().date_naive();
        self.wallet
            .resolve_daily_bonus(decision, today, self.daily_bonus_coins)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use common::{clock::FixedClock, error::AppError};
    use entitlement::MemoryPersistence;

    use super::*;

    fn session_at(now: DateTime<Utc>) -> (UserSession, FixedClock) {
        let clock = FixedClock::new(now);
        let session = UserSession::open(
            Box::new(MemoryPersistence::new()),
            Arc::new(clock.clone()),
            SessionSettings::default(),
        )
        .unwrap();
        (session, clock)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn friend(id: &str) -> FriendRecord {
        FriendRecord {
            id: id.to_string(),
            name: id.to_uppercase(),
            avatar_ref: None,
            is_online: false,
            last_seen_at: None,
        }
    }

    #[test]
    fn gender_preference_requires_premium() {
        let (mut session, _) = session_at(t0());

        assert!(!session.select_gender(GenderPreference::Female).is_allowed());
        assert_eq!(session.effective_gender(), GenderPreference::Any);

        session.commit_purchase("weekly").unwrap();
        assert!(session.select_gender(GenderPreference::Female).is_allowed());
        assert_eq!(session.effective_gender(), GenderPreference::Female);
    }

    #[test]
    fn lapsed_premium_falls_back_to_any_gender() {
        let (mut session, clock) = session_at(t0());
        session.commit_purchase("weekly").unwrap();
        session.select_gender(GenderPreference::Male);

        clock.advance(Duration::days(8));
        assert_eq!(session.effective_gender(), GenderPreference::Any);
        assert!(!session.evaluate_feature("voice-only").unwrap().is_allowed());
    }

    #[test]
    fn overview_hides_remaining_slots_while_entitled() {
        let (mut session, _) = session_at(t0());
        session.add_friend(friend("a")).unwrap();

        let overview = session.friends_overview();
        assert_eq!(overview.remaining_free_slots, Some(4));
        assert!(overview.can_add_more);

        session.commit_purchase("monthly").unwrap();
        assert_eq!(session.friends_overview().remaining_free_slots, None);
    }

    #[test]
    fn presence_updates_last_seen_label() {
        let (mut session, clock) = session_at(t0());
        session.add_friend(friend("a")).unwrap();
        session.set_presence("a", true).unwrap();
        session.set_presence("a", false).unwrap();

        clock.advance(Duration::minutes(90));
        let overview = session.friends_overview();
        assert_eq!(overview.friends[0].last_seen, "1h ago");
        assert_eq!(overview.online_count, 0);
    }

    #[test]
    fn overview_serializes_flat_friend_entries() {
        let (mut session, _) = session_at(t0());
        session.add_friend(friend("a")).unwrap();

        let json = serde_json::to_value(session.friends_overview()).unwrap();
        assert_eq!(json["friends"][0]["id"], "a");
        assert_eq!(json["friends"][0]["lastSeen"], "");
        assert_eq!(json["remainingFreeSlots"], 4);
        assert_eq!(json["canAddMore"], true);
    }

    #[test]
    fn daily_bonus_resets_with_the_calendar_day() {
        let (mut session, clock) = session_at(t0());
        assert!(session.daily_bonus_available());

        session.resolve_daily_bonus(BonusDecision::Accept).unwrap();
        assert!(!session.daily_bonus_available());
        assert!(matches!(
            session.resolve_daily_bonus(BonusDecision::Accept),
            Err(AppError::Conflict(_))
        ));

        clock.advance(Duration::hours(12));
        assert!(session.daily_bonus_available());
        session.resolve_daily_bonus(BonusDecision::Accept).unwrap();
        assert_eq!(session.wallet().coins(), 10);
    }

    #[test]
    fn any_local_change_marks_the_session_touched() {
        let (mut session, _) = session_at(t0());
        assert!(session.is_untouched());

        session.commit_purchase("weekly").unwrap();
        assert!(session.is_untouched());

        session.resolve_daily_bonus(BonusDecision::Decline).unwrap();
        assert!(session.is_untouched());
        session.resolve_daily_bonus(BonusDecision::Accept).unwrap();
        assert!(!session.is_untouched());

        let (mut other, _) = session_at(t0());
        other.add_friend(friend("a")).unwrap();
        assert!(!other.is_untouched());
    }

    #[test]
    fn logout_drops_premium_and_preference() {
        let (mut session, _) = session_at(t0());
        session.commit_purchase("monthly").unwrap();
        session.select_gender(GenderPreference::Female);

        session.logout().unwrap();
        assert!(!session.is_entitled());
        assert_eq!(session.entitlement(), Entitlement::free());
        assert_eq!(session.effective_gender(), GenderPreference::Any);
    }
}
