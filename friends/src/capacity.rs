//! Free-tier cap on friend-list growth.
//!
//! Only additions are ever checked. Losing premium never evicts anyone, it
//! just stops the list from growing past the free limit.

/// `true` when one more friend fits.
pub fn can_add_friend(current_count: usize, entitled: bool, free_limit: usize) -> bool {
    entitled || current_count < free_limit
}

/// Free slots left, floored at zero. Meaningless once entitled.
pub fn remaining_free_slots(current_count: usize, free_limit: usize) -> usize {
    free_limit.saturating_sub(current_count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPolicy {
    pub free_limit: usize,
}

impl CapacityPolicy {
    pub fn new(free_limit: usize) -> Self {
        Self { free_limit }
    }

    pub fn can_add(&self, current_count: usize, entitled: bool) -> bool {
        can_add_friend(current_count, entitled, self.free_limit)
    }

    pub fn remaining(&self, current_count: usize) -> usize {
        remaining_free_slots(current_count, self.free_limit)
    }
}
