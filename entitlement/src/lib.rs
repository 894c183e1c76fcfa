pub mod persistence;
pub mod store;

pub mod models {
    pub mod entitlement;
    pub mod plan;
}

pub use models::entitlement::{Entitlement, EntitlementStatus};
pub use models::plan::{DurationPolicy, PlanId, PlanOffer};
pub use persistence::{EntitlementPersistence, JsonFilePersistence, MemoryPersistence};
pub use store::EntitlementStore;
