use actix_web::{HttpRequest, Responder, post, web};
use common::{
    error::{AppError, Res},
    http::Success,
};
use payment::{PaymentConfirmation, services::webhook};

use crate::state::AppState;

/// Handles Stripe webhook events and grants premium for verified checkouts.
///
/// # Input
/// - `payload`: raw event body, kept as a string so the signature can be checked
/// - `stripe-signature` header
///
/// # Output
/// - Success: 200 once the event is handled (also for events that need no action)
/// - Error: 400 for a missing or invalid signature, 500 when the grant could
///   not be stored. A checkout that does not match the catalog is logged and
///   acknowledged, so Stripe stops retrying it.
///
/// # Note
/// Called by Stripe, not by the app. Register `https://yourapp.com/api/pay/webhook`
/// for `checkout.session.completed` and `checkout.session.async_payment_succeeded`
/// and put the signing secret in STRIPE_WEBHOOK_SECRET.
#[post("/webhook")]
pub async fn post_webhook(
    payload: String,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Res<impl Responder> {
    let signature = match req.headers().get("stripe-signature") {
        Some(signature) => signature.to_str().unwrap_or(""),
        None => return Err(AppError::BadRequest("Stripe signature missing".to_string())),
    };

    let event = webhook::construct_event(&payload, signature, &state.webhook_secret)?;
    let event_id = event.id.to_string();
    if let Err(e) = acknowledge(&state, webhook::process_webhook_event(event)) {
        log::error!("Webhook {} failed, Stripe will retry: {}", event_id, e);
        return Err(e);
    }

    Success::ok("Webhook processed successfully")
}

/// Applies a processed event. Only errors worth a Stripe retry come back as `Err`;
/// a checkout that can never grant anything is logged and acknowledged.
pub(crate) fn acknowledge(
    state: &AppState,
    processed: Res<Option<PaymentConfirmation>>,
) -> Res<()> {
    let confirmation = match processed {
        Ok(Some(confirmation)) => confirmation,
        Ok(None) => return Ok(()),
        Err(e @ (AppError::PaymentUnverified(_) | AppError::InvalidPlan(_))) => {
            log::error!("Ignoring checkout that cannot be honoured: {}", e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match state.redeem(&confirmation) {
        Ok(entitlement) => {
            log::info!(
                "Granted {} to {} until {:?}",
                confirmation.plan_id.as_str(),
                confirmation.user_id,
                entitlement.expires_at
            );
            Ok(())
        }
        // the client confirmed first
        Err(AppError::Conflict(msg)) => {
            log::debug!("{}", msg);
            Ok(())
        }
        Err(e @ AppError::PaymentUnverified(_)) => {
            log::error!("Ignoring checkout that cannot be honoured: {}", e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
