use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use entitlement::{PlanId, PlanOffer};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const METADATA_USER_ID: &str = "user_id";
pub const METADATA_PLAN_ID: &str = "plan_id";

/// What the payment provider is asked to charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount_minor_units: i64,
    pub currency: String,
    pub plan_id: PlanId,
}

impl From<&PlanOffer> for PaymentRequest {
    fn from(plan: &PlanOffer) -> Self {
        PaymentRequest {
            amount_minor_units: plan.price_minor_units,
            currency: plan.currency.to_string(),
            plan_id: plan.id,
        }
    }
}

/// Provider-side proof that a plan was paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub token: String,
    pub plan_id: PlanId,
    pub user_id: Uuid,
    /// When the provider opened the checkout.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Confirmed(PaymentConfirmation),
    /// The provider could not be reached or is not configured.
    ProviderUnavailable(String),
}

impl PaymentConfirmation {
    /// Builds a confirmation from a completed checkout.
    ///
    /// The session must be paid, carry our user and plan metadata, and charge
    /// exactly the catalog price of that plan.
    pub fn from_checkout(
        token: &str,
        metadata: Option<&HashMap<String, String>>,
        paid: bool,
        amount_total: Option<i64>,
        created: i64,
    ) -> Res<Self> {
        if !paid {
            return Err(AppError::PaymentUnverified(format!(
                "Checkout {} is not paid",
                token
            )));
        }
        let metadata = metadata.ok_or_else(|| {
            AppError::PaymentUnverified(format!("Checkout {} has no metadata", token))
        })?;

        let user_id = metadata
            .get(METADATA_USER_ID)
            .ok_or_else(|| {
                AppError::PaymentUnverified(format!("Checkout {} has no user id", token))
            })?
            .parse::<Uuid>()
            .map_err(|e| AppError::PaymentUnverified(format!("Bad user id on {}: {}", token, e)))?;

        let plan = PlanOffer::find(metadata.get(METADATA_PLAN_ID).map_or("", String::as_str))?;

        if amount_total != Some(plan.price_minor_units) {
            return Err(AppError::PaymentUnverified(format!(
                "Checkout {} charged {:?}, {} costs {}",
                token, amount_total, plan.id, plan.price_minor_units
            )));
        }

        let created_at = DateTime::from_timestamp(created, 0).ok_or_else(|| {
            AppError::PaymentUnverified(format!("Checkout {} has a bad creation time", token))
        })?;

        Ok(PaymentConfirmation {
            token: token.to_string(),
            plan_id: plan.id,
            user_id,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-15T10:00:00Z
    const CREATED: i64 = 1_705_312_800;

    fn metadata(user_id: &str, plan_id: &str) -> HashMap<String, String> {
        HashMap::from([
            (METADATA_USER_ID.to_string(), user_id.to_string()),
            (METADATA_PLAN_ID.to_string(), plan_id.to_string()),
        ])
    }

    #[test]
    fn request_mirrors_catalog_price() {
        let req = PaymentRequest::from(PlanId::Monthly.offer());
        assert_eq!(req.amount_minor_units, 29900);
        assert_eq!(req.currency, "INR");
        assert_eq!(req.plan_id, PlanId::Monthly);
    }

    #[test]
    fn paid_checkout_confirms() {
        let user_id = Uuid::new_v4();
        let meta = metadata(&user_id.to_string(), "weekly");

        let c = PaymentConfirmation::from_checkout(
            "cs_1",
            Some(&meta),
            true,
            Some(9900),
            CREATED,
        )
        .unwrap();
        assert_eq!(c.user_id, user_id);
        assert_eq!(c.plan_id, PlanId::Weekly);
        assert_eq!(c.token, "cs_1");
        assert_eq!(c.created_at.timestamp(), CREATED);
    }

    #[test]
    fn unpaid_or_mispriced_checkout_is_unverified() {
        let meta = metadata(&Uuid::new_v4().to_string(), "monthly");

        let unpaid = PaymentConfirmation::from_checkout(
            "cs_1",
            Some(&meta),
            false,
            Some(29900),
            CREATED,
        );
        assert!(matches!(unpaid, Err(AppError::PaymentUnverified(_))));

        let cheap = PaymentConfirmation::from_checkout(
            "cs_1",
            Some(&meta),
            true,
            Some(9900),
            CREATED,
        );
        assert!(matches!(cheap, Err(AppError::PaymentUnverified(_))));

        let bare = PaymentConfirmation::from_checkout(
            "cs_1",
            None,
            true,
            Some(29900),
            CREATED,
        );
        assert!(matches!(bare, Err(AppError::PaymentUnverified(_))));
    }

    #[test]
    fn unknown_plan_in_metadata_is_invalid_plan() {
        let meta = metadata(&Uuid::new_v4().to_string(), "lifetime");
        let err = PaymentConfirmation::from_checkout(
            "cs_1",
            Some(&meta),
            true,
            Some(1),
            CREATED,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidPlan(_)));
    }
}
