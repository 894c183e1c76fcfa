use entitlement::{EntitlementStatus, PlanOffer};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct PlansResponse {
    pub plans: &'static [PlanOffer],
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub plan_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CheckoutResponse {
    /// Continue on the provider's hosted page.
    #[serde(rename_all = "camelCase")]
    Redirect { url: String, session_id: String },
    /// Provider unavailable and the fallback granted the plan right away.
    Granted { entitlement: EntitlementStatus },
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub checkout_session_id: Option<String>,
    pub plan_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementResponse {
    pub is_entitled: bool,
    pub entitlement: EntitlementStatus,
}
