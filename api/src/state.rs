use std::{path::PathBuf, sync::Arc};

use common::{
    clock::Clock,
    env_config::{Config, PaymentFallback},
    error::{AppError, Res},
};
use dashmap::DashMap;
use entitlement::{
    Entitlement, EntitlementPersistence, JsonFilePersistence, MemoryPersistence,
};
use payment::{PaymentConfirmation, RedemptionLedger, StripeCheckout};
use session::{SessionSettings, UserSession};
use uuid::Uuid;

const LEDGER_FILE: &str = "redeemed-checkouts.json";

/// Shared server state: one policy session per user, opened on first use.
pub struct AppState {
    sessions: DashMap<Uuid, UserSession>,
    ledger: RedemptionLedger,
    clock: Arc<dyn Clock>,
    settings: SessionSettings,
    data_dir: Option<PathBuf>,
    pub checkout: StripeCheckout,
    pub fallback: PaymentFallback,
    pub webhook_secret: String,
}

impl AppState {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Res<Self> {
        let data_dir = config.entitlement_data_dir.clone();
        let ledger = match &data_dir {
            Some(dir) => RedemptionLedger::open(dir.join(LEDGER_FILE))?,
            None => RedemptionLedger::in_memory(),
        };

        Ok(Self {
            sessions: DashMap::new(),
            ledger,
            clock,
            settings: SessionSettings {
                free_friend_limit: config.free_friend_limit,
                daily_bonus_coins: config.daily_bonus_coins,
            },
            data_dir,
            checkout: StripeCheckout::new(common::stripe::create_client(&config.stripe_secret_key)),
            fallback: config.payment_fallback,
            webhook_secret: config.stripe_webhook_secret.clone(),
        })
    }

    fn persistence_for(&self, user_id: Uuid) -> Box<dyn EntitlementPersistence> {
        match &self.data_dir {
            Some(dir) => Box::new(JsonFilePersistence::new(dir.join(format!("{}.json", user_id)))),
            None => Box::new(MemoryPersistence::new()),
        }
    }

    /// A session can be reopened later without loss when it holds nothing
    /// beyond an entitlement that is already on disk (or still free).
    fn can_drop(&self, session: &UserSession) -> bool {
        session.is_untouched()
            && (self.data_dir.is_some() || session.entitlement() == Entitlement::free())
    }

    /// Runs `f` against the user's session while holding that user's entry.
    /// Keep `f` synchronous; never await while inside it.
    pub fn with_session<T>(
        &self,
        user_id: Uuid,
        f: impl FnOnce(&mut UserSession) -> Res<T>,
    ) -> Res<T> {
        let result = {
            let mut session = self.sessions.entry(user_id).or_try_insert_with(|| {
                log::debug!("Opening session for {}", user_id);
                UserSession::open(self.persistence_for(user_id), self.clock.clone(), self.settings)
            })?;
            f(session.value_mut())
        };
        // the entry lock is released above; remove_if re-checks under its own lock
        self.sessions.remove_if(&user_id, |_, session| self.can_drop(session));
        result
    }

    /// Number of sessions currently held in memory.
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Commits a confirmed payment exactly once per checkout token, across restarts
    /// when a data directory is configured.
    pub fn redeem(&self, confirmation: &PaymentConfirmation) -> Res<Entitlement> {
        self.ledger.claim(confirmation, self.clock.now())?;

        let result = self.with_session(confirmation.user_id, |s| {
            s.commit_purchase(confirmation.plan_id.as_str())
        });
        if result.is_err() {
            // let a retry of the same token through
            if let Err(e) = self.ledger.release(&confirmation.token) {
                log::error!("Could not release checkout {}: {}", confirmation.token, e);
            }
        }
        result
    }

    /// Like [`redeem`](Self::redeem), for a confirmation the signed-in user presented.
    /// Returns the entitlement unchanged when the checkout was already applied.
    pub fn redeem_for(&self, user_id: Uuid, confirmation: &PaymentConfirmation) -> Res<Entitlement> {
        if confirmation.user_id != user_id {
            return Err(AppError::PaymentUnverified(format!(
                "Checkout {} belongs to another user",
                confirmation.token
            )));
        }
        match self.redeem(confirmation) {
            Err(AppError::Conflict(msg)) => {
                log::debug!("{}", msg);
                self.with_session(user_id, |s| Ok(s.entitlement()))
            }
            other => other,
        }
    }
}
