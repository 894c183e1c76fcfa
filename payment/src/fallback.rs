use common::{
    env_config::PaymentFallback,
    error::{AppError, Res},
};
use entitlement::PlanId;

use crate::models::payment::PaymentOutcome;

/// Decides which plan, if any, a payment outcome entitles.
///
/// A confirmed payment always wins. When the provider is unavailable the
/// configured fallback decides; `OptimisticGrant` hands out premium without
/// proof of payment and is logged every time it does.
pub fn settle(outcome: PaymentOutcome, fallback: PaymentFallback, requested: PlanId) -> Res<PlanId> {
    match outcome {
        PaymentOutcome::Confirmed(confirmation) => {
            if confirmation.plan_id != requested {
                log::warn!(
                    "Payment {} confirmed {} while {} was requested",
                    confirmation.token,
                    confirmation.plan_id,
                    requested
                );
            }
            Ok(confirmation.plan_id)
        }
        PaymentOutcome::ProviderUnavailable(reason) => match fallback {
            PaymentFallback::Deny => Err(AppError::PaymentUnverified(reason)),
            PaymentFallback::OptimisticGrant => {
                log::warn!(
                    "Granting {} without payment confirmation: {}",
                    requested,
                    reason
                );
                Ok(requested)
            }
        },
    }
}
