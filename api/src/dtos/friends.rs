use chrono::{DateTime, Utc};
use friends::FriendRecord;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AddFriendRequest {
    pub id: String,
    pub name: String,
    pub avatar_ref: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl From<AddFriendRequest> for FriendRecord {
    fn from(req: AddFriendRequest) -> Self {
        FriendRecord {
            id: req.id,
            name: req.name,
            avatar_ref: req.avatar_ref,
            is_online: req.is_online,
            last_seen_at: req.last_seen_at,
        }
    }
}

#[derive(Deserialize)]
pub struct PresenceRequest {
    pub is_online: bool,
}
