use actix_web::{Responder, get, post, web};
use common::{error::Res, http::Success, jwt::AuthUser};

use crate::{
    dtos::wallet::{DailyBonusRequest, WalletResponse},
    state::AppState,
};

#[get("/wallet")]
pub async fn get_wallet(user: AuthUser, state: web::Data<AppState>) -> Res<impl Responder> {
    let wallet = state.with_session(user.user_id, |s| {
        Ok(WalletResponse {
            coins: s.wallet().coins(),
            daily_bonus_available: s.daily_bonus_available(),
            last_bonus_claimed_on: s.wallet().last_bonus_claimed_on(),
        })
    })?;
    Success::ok(wallet)
}

/// Records the user's answer to the daily bonus prompt.
///
/// # Input
/// - `{ "decision": "accept" | "decline" }`
///
/// # Output
/// - `{ "outcome": "credited", "amount": 5, "balance": 15 }`
/// - `{ "outcome": "declined", "balance": 10 }`
/// - Error: 409 when today's bonus was already claimed
#[post("/wallet/daily-bonus")]
pub async fn post_daily_bonus(
    user: AuthUser,
    req: web::Json<DailyBonusRequest>,
    state: web::Data<AppState>,
) -> Res<impl Responder> {
    let outcome = state.with_session(user.user_id, |s| s.resolve_daily_bonus(req.decision))?;
    Success::ok(outcome)
}
