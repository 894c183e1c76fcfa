use actix_web::{Responder, delete, get, post, put, web};
use common::{error::Res, http::Success, jwt::AuthUser};

use crate::{
    dtos::friends::{AddFriendRequest, PresenceRequest},
    state::AppState,
};

/// The friend list with online counts and how many free slots remain.
///
/// # Output
/// ```json
/// { "friends": [ { "id": "f1", "name": "Asha", "isOnline": false, "lastSeen": "5m ago", ... } ],
///   "count": 1, "onlineCount": 0, "freeLimit": 5, "remainingFreeSlots": 4, "canAddMore": true }
/// ```
/// `remainingFreeSlots` is null while premium is active.
#[get("/friends")]
pub async fn get_friends(user: AuthUser, state: web::Data<AppState>) -> Res<impl Responder> {
    Success::ok(state.with_session(user.user_id, |s| Ok(s.friends_overview()))?)
}

/// Adds a friend.
///
/// # Output
/// - Success: 201 with the updated overview
/// - Error: 402 when the free limit is reached (show the paywall), 409 for a
///   friend already on the list
#[post("/friends")]
pub async fn post_friend(
    user: AuthUser,
    req: web::Json<AddFriendRequest>,
    state: web::Data<AppState>,
) -> Res<impl Responder> {
    let overview = state.with_session(user.user_id, |s| {
        s.add_friend(req.into_inner().into())?;
        Ok(s.friends_overview())
    })?;
    Success::created(overview)
}

/// Removes a friend. Never blocked by the free limit.
#[delete("/friends/{id}")]
pub async fn delete_friend(
    user: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Res<impl Responder> {
    let id = path.into_inner();
    state.with_session(user.user_id, |s| s.remove_friend(&id))?;
    Success::no_content()
}

#[put("/friends/{id}/presence")]
pub async fn put_presence(
    user: AuthUser,
    path: web::Path<String>,
    req: web::Json<PresenceRequest>,
    state: web::Data<AppState>,
) -> Res<impl Responder> {
    let id = path.into_inner();
    let friend = state.with_session(user.user_id, |s| s.set_presence(&id, req.is_online))?;
    Success::ok(friend)
}
