use chrono::{DateTime, Utc};
use common::error::Res;

use crate::{
    models::{
        entitlement::{Entitlement, EntitlementStatus},
        plan::PlanOffer,
    },
    persistence::EntitlementPersistence,
};

/// Single source of truth for one account's premium status.
///
/// Reads are pure functions of the held record and the instant passed in.
/// The record only changes through [`commit_purchase`](Self::commit_purchase)
/// and [`clear`](Self::clear), each of which replaces it whole and persists it.
pub struct EntitlementStore {
    current: Entitlement,
    persistence: Box<dyn EntitlementPersistence>,
}

impl EntitlementStore {
    /// Loads the persisted record, starting free when there is none.
    pub fn open(persistence: Box<dyn EntitlementPersistence>) -> Res<Self> {
        let current = persistence.load()?.unwrap_or_default();
        Ok(Self {
            current,
            persistence,
        })
    }

    pub fn current(&self) -> Entitlement {
        self.current
    }

    pub fn is_entitled(&self, now: DateTime<Utc>) -> bool {
        self.current.is_entitled(now)
    }

    pub fn status(&self, now: DateTime<Utc>) -> EntitlementStatus {
        self.current.status(now)
    }

    /// Grants the plan starting at `now`. A renewal restarts from `now`, it does not stack.
    pub fn commit_purchase(&mut self, plan_id: &str, now: DateTime<Utc>) -> Res<Entitlement> {
        let plan = PlanOffer::find(plan_id)?;
        let next = Entitlement::purchased(plan, now)?;
        self.replace(next)?;
        log::info!(
            "Committed {} plan, premium until {:?}",
            plan.id,
            next.expires_at
        );
        Ok(next)
    }

    /// Back to free with no expiry, e.g. on logout.
    pub fn clear(&mut self) -> Res<()> {
        self.replace(Entitlement::free())
    }

    fn replace(&mut self, next: Entitlement) -> Res<()> {
        // persist first so a failed save leaves memory and storage in agreement
        self.persistence.save(&next)?;
        self.current = next;
        Ok(())
    }
}
