use std::collections::HashMap;

use common::error::{AppError, Res};
use entitlement::PlanOffer;
use stripe::{
    CheckoutSession, CheckoutSessionId, CheckoutSessionMode, CheckoutSessionPaymentStatus, Client,
    CreateCheckoutSession, Currency,
};
use uuid::Uuid;

use crate::models::payment::{
    METADATA_PLAN_ID, METADATA_USER_ID, PaymentConfirmation, PaymentOutcome, PaymentRequest,
};

/// Result of asking the provider to start a purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStart {
    /// Send the user to the hosted checkout page.
    Redirect { session_id: String, url: String },
    ProviderUnavailable(String),
}

/// Stripe Checkout as the payment collaborator. Without a client every
/// operation reports the provider as unavailable.
#[derive(Clone)]
pub struct StripeCheckout {
    client: Option<Client>,
}

impl StripeCheckout {
    pub fn new(client: Option<Client>) -> Self {
        Self { client }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// Creates a one-time checkout session for `plan` on behalf of `user_id`.
    /// Requires urls where the provider should redirect the user in the case of success or cancellation.
    pub async fn begin(
        &self,
        user_id: Uuid,
        plan: &PlanOffer,
        success_url: &str,
        cancel_url: &str,
    ) -> Res<CheckoutStart> {
        let Some(client) = &self.client else {
            return Ok(CheckoutStart::ProviderUnavailable(
                "Payment provider is not configured".to_string(),
            ));
        };

        let request = PaymentRequest::from(plan);
        let currency = request
            .currency
            .to_lowercase()
            .parse::<Currency>()
            .map_err(|_| AppError::Internal(format!("Unsupported currency {}", request.currency)))?;
        let user_id = user_id.to_string();

        let params = CreateCheckoutSession {
            line_items: Some(vec![stripe::CreateCheckoutSessionLineItems {
                price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                    currency,
                    product_data: Some(stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                        name: plan.name.to_string(),
                        ..Default::default()
                    }),
                    unit_amount: Some(request.amount_minor_units),
                    ..Default::default()
                }),
                quantity: Some(1),
                ..Default::default()
            }]),
            mode: Some(CheckoutSessionMode::Payment),
            success_url: Some(success_url),
            cancel_url: Some(cancel_url),
            client_reference_id: Some(user_id.as_str()),
            metadata: Some(HashMap::from([
                (METADATA_USER_ID.to_string(), user_id.clone()),
                (METADATA_PLAN_ID.to_string(), plan.id.to_string()),
            ])),
            ..Default::default()
        };

        let session = CheckoutSession::create(client, params)
            .await
            .map_err(AppError::from)?;
        log::info!("Checkout {} opened for {} ({})", session.id, user_id, plan.id);

        let url = session
            .url
            .ok_or_else(|| AppError::Internal(format!("Checkout {} has no url", session.id)))?;
        Ok(CheckoutStart::Redirect {
            session_id: session.id.to_string(),
            url,
        })
    }

    /// Asks Stripe directly whether a checkout session was paid.
    pub async fn verify(&self, checkout_session_id: &str) -> Res<PaymentOutcome> {
        let Some(client) = &self.client else {
            return Ok(PaymentOutcome::ProviderUnavailable(
                "Payment provider is not configured".to_string(),
            ));
        };

        let id = checkout_session_id
            .parse::<CheckoutSessionId>()
            .map_err(|e| AppError::BadRequest(format!("Invalid checkout session ID: {}", e)))?;
        let session = CheckoutSession::retrieve(client, &id, &[])
            .await
            .map_err(AppError::from)?;

        confirmation_from_session(&session).map(PaymentOutcome::Confirmed)
    }
}

pub(crate) fn confirmation_from_session(session: &CheckoutSession) -> Res<PaymentConfirmation> {
    PaymentConfirmation::from_checkout(
        session.id.as_str(),
        session.metadata.as_ref(),
        matches!(session.payment_status, CheckoutSessionPaymentStatus::Paid),
        session.amount_total,
        session.created,
    )
}
