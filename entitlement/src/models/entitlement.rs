use chrono::{DateTime, Utc};
use common::error::Res;
use serde::{Deserialize, Serialize};

use super::plan::PlanOffer;

/// Premium status of one account. Always replaced as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub is_premium: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Read-only view of an entitlement at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum EntitlementStatus {
    Free,
    #[serde(rename_all = "camelCase")]
    Active { expires_at: Option<DateTime<Utc>> },
    #[serde(rename_all = "camelCase")]
    Expired { expired_at: DateTime<Utc> },
}

impl Entitlement {
    pub fn free() -> Self {
        Self::default()
    }

    /// Entitlement granted by buying `plan` at `now`.
    pub fn purchased(plan: &PlanOffer, now: DateTime<Utc>) -> Res<Self> {
        Ok(Self {
            is_premium: true,
            expires_at: Some(plan.expiry_from(now)?),
        })
    }

    /// Premium and not past its expiry. Expiry is exclusive: at `expires_at` the grant is over.
    pub fn is_entitled(&self, now: DateTime<Utc>) -> bool {
        self.is_premium && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    pub fn status(&self, now: DateTime<Utc>) -> EntitlementStatus {
        match (self.is_premium, self.expires_at) {
            (false, _) => EntitlementStatus::Free,
            (true, Some(expired_at)) if expired_at <= now => {
                EntitlementStatus::Expired { expired_at }
            }
            (true, expires_at) => EntitlementStatus::Active { expires_at },
        }
    }
}

impl EntitlementStatus {
    pub fn is_enabled(&self) -> bool {
        matches!(self, EntitlementStatus::Active { .. })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::plan::PlanId;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    }

    fn premium_until(expires_at: DateTime<Utc>) -> Entitlement {
        Entitlement {
            is_premium: true,
            expires_at: Some(expires_at),
        }
    }

    #[test]
    fn non_premium_is_never_entitled() {
        let samples = [
            Entitlement::free(),
            Entitlement {
                is_premium: false,
                expires_at: Some(t0() + Duration::days(365)),
            },
        ];
        for ent in samples {
            for offset in [-10_000, -1, 0, 1, 10_000] {
                assert!(!ent.is_entitled(t0() + Duration::hours(offset)));
            }
        }
    }

    #[test]
    fn premium_without_expiry_never_lapses() {
        let ent = Entitlement {
            is_premium: true,
            expires_at: None,
        };
        assert!(ent.is_entitled(t0() + Duration::days(10_000)));
        assert_eq!(ent.status(t0()), EntitlementStatus::Active { expires_at: None });
    }

    #[test]
    fn validity_is_monotonic_up_to_expiry() {
        let expires_at = t0() + Duration::days(7);
        let ent = premium_until(expires_at);

        let mut was_entitled = false;
        for hour in 0..(7 * 24) {
            let now = t0() + Duration::hours(hour);
            let entitled = ent.is_entitled(now);
            if was_entitled {
                assert!(entitled, "lapsed early at {}", now);
            }
            was_entitled = entitled;
        }
        assert!(was_entitled);
    }

    #[test]
    fn hard_cutoff_after_expiry() {
        let expires_at = t0() + Duration::days(7);
        let ent = premium_until(expires_at);

        assert!(ent.is_entitled(expires_at - Duration::seconds(1)));
        assert!(!ent.is_entitled(expires_at));
        assert!(!ent.is_entitled(expires_at + Duration::seconds(1)));
        assert!(!ent.is_entitled(expires_at + Duration::days(400)));
    }

    #[test]
    fn checking_expiry_does_not_change_the_record() {
        let ent = premium_until(t0());
        let before = ent;
        let _ = ent.is_entitled(t0() + Duration::days(1));
        let _ = ent.status(t0() + Duration::days(1));
        assert_eq!(ent, before);
    }

    #[test]
    fn status_reports_expiry() {
        let ent = premium_until(t0());
        assert_eq!(
            ent.status(t0() - Duration::minutes(1)),
            EntitlementStatus::Active {
                expires_at: Some(t0())
            }
        );
        assert_eq!(
            ent.status(t0() + Duration::minutes(1)),
            EntitlementStatus::Expired { expired_at: t0() }
        );
        assert!(!Entitlement::free().status(t0()).is_enabled());
    }

    #[test]
    fn purchase_sets_both_fields() {
        let ent = Entitlement::purchased(PlanId::Weekly.offer(), t0()).unwrap();
        assert_eq!(ent, premium_until(t0() + Duration::days(7)));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(premium_until(t0())).unwrap();
        assert_eq!(json["isPremium"], true);
        assert_eq!(json["expiresAt"], "2024-01-15T09:00:00Z");

        let status = serde_json::to_value(Entitlement::free().status(t0())).unwrap();
        assert_eq!(status["status"], "free");
    }
}
