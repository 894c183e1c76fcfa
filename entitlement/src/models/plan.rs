use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

/// Closed set of purchasable plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Weekly,
    Monthly,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Weekly => "weekly",
            PlanId::Monthly => "monthly",
        }
    }

    pub fn offer(&self) -> &'static PlanOffer {
        match self {
            PlanId::Weekly => &CATALOG[0],
            PlanId::Monthly => &CATALOG[1],
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = AppError;

    fn from_str(s: &str) -> Res<Self> {
        match s {
            "weekly" => Ok(PlanId::Weekly),
            "monthly" => Ok(PlanId::Monthly),
            other => Err(AppError::InvalidPlan(other.to_string())),
        }
    }
}

/// Calendar offset a plan grants from the moment of purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "unit", content = "amount", rename_all = "lowercase")]
pub enum DurationPolicy {
    Days(u32),
    /// Same day of month. A day the target month lacks rolls over into the
    /// following month, so Jan 31 plus one month is Mar 2 in a leap year.
    Months(u32),
}

impl DurationPolicy {
    pub fn apply(&self, from: DateTime<Utc>) -> Res<DateTime<Utc>> {
        let expires_at = match *self {
            DurationPolicy::Days(days) => from.checked_add_signed(Duration::days(days.into())),
            DurationPolicy::Months(months) => from
                .with_day(1)
                .and_then(|first| first.checked_add_months(Months::new(months)))
                .and_then(|d| d.checked_add_signed(Duration::days(i64::from(from.day()) - 1))),
        };
        expires_at.ok_or_else(|| {
            AppError::Internal(format!("Expiry out of range applying {:?} to {}", self, from))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOffer {
    pub id: PlanId,
    pub name: &'static str,
    pub price_minor_units: i64,
    pub currency: &'static str,
    pub duration_policy: DurationPolicy,
    pub popular: bool,
    pub savings: Option<&'static str>,
}

pub const CATALOG: [PlanOffer; 2] = [
    PlanOffer {
        id: PlanId::Weekly,
        name: "Weekly Premium",
        price_minor_units: 9900,
        currency: "INR",
        duration_policy: DurationPolicy::Days(7),
        popular: false,
        savings: None,
    },
    PlanOffer {
        id: PlanId::Monthly,
        name: "Monthly Premium",
        price_minor_units: 29900,
        currency: "INR",
        duration_policy: DurationPolicy::Months(1),
        popular: true,
        savings: Some("Save ₹97!"),
    },
];

impl PlanOffer {
    pub fn catalog() -> &'static [PlanOffer] {
        &CATALOG
    }

    /// Looks a plan up by its wire id.
    pub fn find(id: &str) -> Res<&'static PlanOffer> {
        id.parse::<PlanId>().map(|id| id.offer())
    }

    pub fn expiry_from(&self, now: DateTime<Utc>) -> Res<DateTime<Utc>> {
        self.duration_policy.apply(now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 30, 0).unwrap()
    }

    #[test]
    fn catalog_entries_match_their_ids() {
        for offer in PlanOffer::catalog() {
            assert_eq!(offer.id.offer(), offer);
            assert_eq!(PlanOffer::find(offer.id.as_str()).unwrap(), offer);
        }
    }

    #[test]
    fn unknown_plan_is_invalid() {
        let err = PlanOffer::find("yearly").unwrap_err();
        assert!(matches!(err, AppError::InvalidPlan(id) if id == "yearly"));
        assert!(PlanOffer::find("Weekly").is_err());
    }

    #[test]
    fn weekly_adds_seven_days() {
        let offer = PlanOffer::find("weekly").unwrap();
        assert_eq!(offer.expiry_from(at(2024, 1, 28)).unwrap(), at(2024, 2, 4));
    }

    #[test]
    fn monthly_keeps_day_of_month() {
        let offer = PlanOffer::find("monthly").unwrap();
        assert_eq!(offer.expiry_from(at(2024, 1, 15)).unwrap(), at(2024, 2, 15));
        assert_eq!(offer.expiry_from(at(2024, 12, 10)).unwrap(), at(2025, 1, 10));
    }

    #[test]
    fn monthly_rolls_missing_days_into_next_month() {
        let offer = PlanOffer::find("monthly").unwrap();
        // leap year
        assert_eq!(offer.expiry_from(at(2024, 1, 29)).unwrap(), at(2024, 2, 29));
        assert_eq!(offer.expiry_from(at(2024, 1, 30)).unwrap(), at(2024, 3, 1));
        assert_eq!(offer.expiry_from(at(2024, 1, 31)).unwrap(), at(2024, 3, 2));
        assert_eq!(offer.expiry_from(at(2023, 1, 29)).unwrap(), at(2023, 3, 1));
        assert_eq!(offer.expiry_from(at(2023, 1, 31)).unwrap(), at(2023, 3, 3));
        assert_eq!(offer.expiry_from(at(2024, 3, 31)).unwrap(), at(2024, 5, 1));
    }

    #[test]
    fn plan_ids_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&PlanId::Monthly).unwrap(), "\"monthly\"");
        let offer = serde_json::to_value(PlanId::Weekly.offer()).unwrap();
        assert_eq!(offer["priceMinorUnits"], 9900);
        assert_eq!(offer["durationPolicy"]["unit"], "days");
    }
}
