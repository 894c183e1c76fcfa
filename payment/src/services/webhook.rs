use common::error::{AppError, Res};
use stripe::{Event, EventObject, EventType, Webhook};

use crate::{models::payment::PaymentConfirmation, services::checkout::confirmation_from_session};

/// Creates an event for the webhook based on the request payload and signature.
/// Requires a webhook secret key.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    match Webhook::construct_event(payload, signature, webhook_secret) {
        Ok(event) => Ok(event),
        Err(e) => {
            log::error!("Error constructing webhook event: {}", e);
            Err(AppError::BadRequest(format!("Webhook Error: {}", e)))
        }
    }
}

/// Extracts a payment confirmation from a webhook event.
/// Returns None for events that do not grant anything.
pub fn process_webhook_event(event: Event) -> Res<Option<PaymentConfirmation>> {
    log::info!("Processing webhook event: {}", event.type_);

    match event.type_ {
        EventType::CheckoutSessionCompleted
        | EventType::CheckoutSessionAsyncPaymentSucceeded => {
            if let EventObject::CheckoutSession(session) = event.data.object {
                log::info!("Checkout session completed: {}", session.id);
                // completed but still processing, e.g. bank transfers; the async success event follows
                if !matches!(
                    session.payment_status,
                    stripe::CheckoutSessionPaymentStatus::Paid
                ) {
                    log::info!("Checkout session {} awaiting payment", session.id);
                    return Ok(None);
                }
                return confirmation_from_session(&session).map(Some);
            }
            Ok(None)
        }
        EventType::CheckoutSessionExpired => {
            if let EventObject::CheckoutSession(session) = event.data.object {
                log::info!("Checkout session expired: {}", session.id);
            }
            Ok(None)
        }
        _ => {
            log::info!("Unhandled event type: {}", event.type_);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_payload_is_rejected() {
        let err = construct_event("{}", "t=1,v1=deadbeef", "whsec_test").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
