use gate::{Decision, GenderPreference};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct FeatureResponse {
    pub feature: String,
    #[serde(flatten)]
    pub decision: Decision,
}

#[derive(Deserialize)]
pub struct GenderRequest {
    pub gender: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenderResponse {
    #[serde(flatten)]
    pub decision: Decision,
    pub effective_gender: GenderPreference,
}
