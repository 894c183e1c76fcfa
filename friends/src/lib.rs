pub mod capacity;
pub mod presence;
pub mod roster;

pub use capacity::{CapacityPolicy, can_add_friend, remaining_free_slots};
pub use presence::format_last_seen;
pub use roster::{FriendList, FriendRecord};
