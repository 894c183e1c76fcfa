use actix_web::{Responder, get, post, web};
use common::{
    error::{AppError, Res},
    http::Success,
    jwt::AuthUser,
};
use entitlement::{PlanId, PlanOffer};
use payment::{CheckoutStart, PaymentOutcome, settle};

use crate::{
    dtos::sub::{CheckoutRequest, CheckoutResponse, ConfirmRequest, EntitlementResponse},
    state::AppState,
};

fn entitlement_response(state: &AppState, user: &AuthUser) -> Res<EntitlementResponse> {
    state.with_session(user.user_id, |s| {
        Ok(EntitlementResponse {
            is_entitled: s.is_entitled(),
            entitlement: s.entitlement_status(),
        })
    })
}

/// Current premium status of the signed-in user.
///
/// # Output
/// - `{ "isEntitled": true, "entitlement": { "status": "active", "expiresAt": "..." } }`
/// - `{ "isEntitled": false, "entitlement": { "status": "expired", "expiredAt": "..." } }`
/// - `{ "isEntitled": false, "entitlement": { "status": "free" } }`
#[get("/entitlement")]
pub async fn get_entitlement(user: AuthUser, state: web::Data<AppState>) -> Res<impl Responder> {
    Success::ok(entitlement_response(&state, &user)?)
}

/// Starts a purchase of `plan_id`.
///
/// # Input
/// - `plan_id`: "weekly" or "monthly"
/// - `success_url`, `cancel_url`: where the provider sends the user back.
///   Append `?session_id={CHECKOUT_SESSION_ID}` to the success url to get the id
///   needed by `/me/confirm`.
///
/// # Output
/// - `{ "kind": "redirect", "url": "https://checkout.stripe.com/...", "sessionId": "cs_..." }`
/// - `{ "kind": "granted", "entitlement": { ... } }` only when the provider is
///   unavailable and PAYMENT_FALLBACK=optimistic-grant
/// - Error: 400 for an unknown plan, 402 when the provider is unavailable and
///   the fallback denies
///
/// # Frontend Example
/// ```javascript
/// const res = await fetch('/api/me/checkout', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json', 'Authorization': `Bearer ${token}` },
///   body: JSON.stringify({
///     plan_id: 'monthly',
///     success_url: `${location.origin}/premium?session_id={CHECKOUT_SESSION_ID}`,
///     cancel_url: `${location.origin}/premium`
///   })
/// });
/// const body = await res.json();
/// if (body.kind === 'redirect') window.location.href = body.url;
/// ```
#[post("/checkout")]
pub async fn post_checkout(
    user: AuthUser,
    req: web::Json<CheckoutRequest>,
    state: web::Data<AppState>,
) -> Res<impl Responder> {
    let plan = PlanOffer::find(&req.plan_id)?;

    let start = state
        .checkout
        .begin(user.user_id, plan, &req.success_url, &req.cancel_url)
        .await?;

    let response = match start {
        CheckoutStart::Redirect { session_id, url } => {
            log::info!("Checkout {} started for {}", session_id, user.user_id);
            CheckoutResponse::Redirect { url, session_id }
        }
        CheckoutStart::ProviderUnavailable(reason) => {
            let granted = settle(
                PaymentOutcome::ProviderUnavailable(reason),
                state.fallback,
                plan.id,
            )?;
            let entitlement = state.with_session(user.user_id, |s| {
                s.commit_purchase(granted.as_str())?;
                Ok(s.entitlement_status())
            })?;
            CheckoutResponse::Granted { entitlement }
        }
    };

    Success::ok(response)
}

/// Confirms a finished checkout from the app side, after the provider redirects back.
///
/// Premium is granted only for a session the provider reports as paid, for this
/// user and at the catalog price. A checkout already applied by the webhook
/// returns the current status unchanged.
///
/// # Input
/// - `checkout_session_id`: the `session_id` from the success url
/// - `plan_id`: the plan the user picked
///
/// # Output
/// - Success: same body as `GET /me/entitlement`
/// - Error: 402 when the payment cannot be verified
#[post("/confirm")]
pub async fn post_confirm(
    user: AuthUser,
    req: web::Json<ConfirmRequest>,
    state: web::Data<AppState>,
) -> Res<impl Responder> {
    let requested: PlanId = req.plan_id.parse()?;

    let outcome = match (&req.checkout_session_id, state.checkout.is_available()) {
        (Some(id), _) => state.checkout.verify(id).await?,
        (None, false) => {
            PaymentOutcome::ProviderUnavailable("Payment provider is not configured".to_string())
        }
        (None, true) => {
            return Err(AppError::BadRequest(
                "checkout_session_id is required".to_string(),
            ));
        }
    };

    match outcome {
        PaymentOutcome::Confirmed(confirmation) => {
            state.redeem_for(user.user_id, &confirmation)?;
        }
        unavailable => {
            let granted = settle(unavailable, state.fallback, requested)?;
            state.with_session(user.user_id, |s| s.commit_purchase(granted.as_str()))?;
        }
    }

    Success::ok(entitlement_response(&state, &user)?)
}

/// Logs the user out of premium.
///
/// Revokes the stored entitlement record, which is the server's only copy of
/// the purchase, and resets the match preference. A later login starts free;
/// premium comes back only through a new purchase. Friends and wallet are kept.
#[post("/logout")]
pub async fn post_logout(user: AuthUser, state: web::Data<AppState>) -> Res<impl Responder> {
    state.with_session(user.user_id, |s| s.logout())?;
    log::info!("User {} logged out", user.user_id);
    Success::no_content()
}
