use actix_web::{Responder, get};
use common::{error::Res, http::Success};
use entitlement::PlanOffer;

use crate::dtos::sub::PlansResponse;

/// Lists the purchasable plans with their prices and durations.
///
/// # Output
/// - Success: `{ "plans": [ { "id": "weekly", "priceMinorUnits": 9900, ... }, ... ] }`
///
/// # Frontend Example
/// ```javascript
/// const { plans } = await (await fetch('/api/plans')).json();
/// const popular = plans.find(p => p.popular);
/// ```
#[get("")]
pub async fn get_plans() -> Res<impl Responder> {
    Success::ok(PlansResponse {
        plans: PlanOffer::catalog(),
    })
}
