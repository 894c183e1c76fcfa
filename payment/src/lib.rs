pub mod fallback;
pub mod ledger;

pub mod services {
    pub mod checkout;
    pub mod webhook;
}

pub mod models {
    pub mod payment;
}

pub use fallback::settle;
pub use ledger::RedemptionLedger;
pub use models::payment::{PaymentConfirmation, PaymentOutcome, PaymentRequest};
pub use services::checkout::{CheckoutStart, StripeCheckout};
