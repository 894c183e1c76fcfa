use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRecord {
    pub id: String,
    pub name: String,
    pub avatar_ref: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Ordered friend list. Growth goes through the capacity policy, removal never does.
#[derive(Debug, Clone, Default)]
pub struct FriendList {
    friends: Vec<FriendRecord>,
}

impl FriendList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.friends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.friends.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FriendRecord> {
        self.friends.iter()
    }

    pub fn get(&self, id: &str) -> Option<&FriendRecord> {
        self.friends.iter().find(|f| f.id == id)
    }

    pub fn online_count(&self) -> usize {
        self.friends.iter().filter(|f| f.is_online).count()
    }

    pub fn add(
        &mut self,
        friend: FriendRecord,
        entitled: bool,
        policy: &CapacityPolicy,
    ) -> Res<()> {
        if self.get(&friend.id).is_some() {
            return Err(AppError::Conflict(format!(
                "{} is already in the friends list",
                friend.id
            )));
        }
        if !policy.can_add(self.len(), entitled) {
            log::debug!(
                "Friend add refused at {}/{} (free tier)",
                self.len(),
                policy.free_limit
            );
            return Err(AppError::UpgradeRequired(format!(
                "Free limit of {} friends reached",
                policy.free_limit
            )));
        }
        self.friends.push(friend);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Res<FriendRecord> {
        let pos = self
            .friends
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Friend {} not found", id)))?;
        Ok(self.friends.remove(pos))
    }

    /// Going offline stamps `last_seen_at`; coming online leaves the previous stamp.
    pub fn set_presence(&mut self, id: &str, is_online: bool, now: DateTime<Utc>) -> Res<&FriendRecord> {
        let friend = self
            .friends
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Friend {} not found", id)))?;

        if friend.is_online && !is_online {
            friend.last_seen_at = Some(now);
        }
        friend.is_online = is_online;
        Ok(friend)
    }
}
