use actix_web::{Responder, get, put, web};
use common::{error::Res, http::Success, jwt::AuthUser};
use gate::GenderPreference;

use crate::{
    dtos::features::{FeatureResponse, GenderRequest, GenderResponse},
    state::AppState,
};

/// Asks whether the user may use a premium feature.
///
/// # Output
/// - `{ "feature": "gender-filter", "decision": "allowed" }`
/// - `{ "feature": "gender-filter", "decision": "denied", "reason": "upgrade-required" }`
/// - Error: 400 for an unknown feature id
#[get("/features/{feature}")]
pub async fn get_feature(
    user: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Res<impl Responder> {
    let feature = path.into_inner();
    let decision = state.with_session(user.user_id, |s| s.evaluate_feature(&feature))?;
    Success::ok(FeatureResponse { feature, decision })
}

/// Sets the match gender preference. Anything but "any" needs premium; a
/// denied choice leaves the stored preference as it was.
///
/// # Input
/// - `{ "gender": "any" | "male" | "female" }`
#[put("/preferences/gender")]
pub async fn put_gender(
    user: AuthUser,
    req: web::Json<GenderRequest>,
    state: web::Data<AppState>,
) -> Res<impl Responder> {
    let preference: GenderPreference = req.gender.parse()?;
    let response = state.with_session(user.user_id, |s| {
        let decision = s.select_gender(preference);
        Ok(GenderResponse {
            decision,
            effective_gender: s.effective_gender(),
        })
    })?;
    Success::ok(response)
}
