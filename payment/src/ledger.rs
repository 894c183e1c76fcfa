use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, Utc};
use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::payment::PaymentConfirmation;

/// How long after it was opened a paid checkout can still grant a plan.
/// Entries older than this are dropped from the ledger.
pub const REDEMPTION_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Checkout tokens that already granted a plan, optionally kept in a JSON file
/// so a restart does not make them redeemable again.
#[derive(Debug)]
pub struct RedemptionLedger {
    redeemed: Mutex<HashMap<String, Redemption>>,
    path: Option<PathBuf>,
}

impl RedemptionLedger {
    pub fn in_memory() -> Self {
        Self {
            redeemed: Mutex::new(HashMap::new()),
            path: None,
        }
    }

    /// Loads the ledger at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        let redeemed = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(AppError::from(e)),
        };
        log::debug!(
            "Loaded {} redeemed checkouts from {}",
            redeemed.len(),
            path.display()
        );
        Ok(Self {
            redeemed: Mutex::new(redeemed),
            path: Some(path),
        })
    }

    fn window() -> Duration {
        Duration::days(REDEMPTION_WINDOW_DAYS)
    }

    fn lock(&self) -> Res<MutexGuard<'_, HashMap<String, Redemption>>> {
        self.redeemed
            .lock()
            .map_err(|e| AppError::Internal(format!("Redemption ledger poisoned: {}", e)))
    }

    /// Marks the checkout as used.
    ///
    /// Fails with `Conflict` when the token was claimed before, and with
    /// `PaymentUnverified` when the checkout is older than the redemption window.
    pub fn claim(&self, confirmation: &PaymentConfirmation, now: DateTime<Utc>) -> Res<()> {
        let cutoff = now - Self::window();
        if confirmation.created_at < cutoff {
            return Err(AppError::PaymentUnverified(format!(
                "Checkout {} is older than {} days",
                confirmation.token, REDEMPTION_WINDOW_DAYS
            )));
        }

        let mut redeemed = self.lock()?;
        // anything opened before the cutoff is refused above, its entry is no longer needed
        redeemed.retain(|_, r| r.created_at >= cutoff);

        if let Some(previous) = redeemed.get(&confirmation.token) {
            return Err(AppError::Conflict(format!(
                "Checkout {} was already redeemed for {}",
                confirmation.token, previous.user_id
            )));
        }

        redeemed.insert(
            confirmation.token.clone(),
            Redemption {
                user_id: confirmation.user_id,
                created_at: confirmation.created_at,
            },
        );
        if let Err(e) = self.save(&redeemed) {
            redeemed.remove(&confirmation.token);
            return Err(e);
        }
        Ok(())
    }

    /// Forgets a claim whose grant could not be committed, so a retry can succeed.
    pub fn release(&self, token: &str) -> Res<()> {
        let mut redeemed = self.lock()?;
        if redeemed.remove(token).is_some() {
            self.save(&redeemed)?;
        }
        Ok(())
    }

    fn save(&self, redeemed: &HashMap<String, Redemption>) -> Res<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(redeemed)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
