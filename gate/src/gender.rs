use std::str::FromStr;

use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

use crate::feature::{Decision, Feature, evaluate_feature};

/// Who a user wants to be matched with. `Any` is the free default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    #[default]
    Any,
    Male,
    Female,
}

impl GenderPreference {
    pub fn label(&self) -> &'static str {
        match self {
            GenderPreference::Any => "Anyone",
            GenderPreference::Male => "Male",
            GenderPreference::Female => "Female",
        }
    }
}

impl FromStr for GenderPreference {
    type Err = AppError;

    fn from_str(s: &str) -> Res<Self> {
        match s {
            "any" => Ok(GenderPreference::Any),
            "male" => Ok(GenderPreference::Male),
            "female" => Ok(GenderPreference::Female),
            other => Err(AppError::BadRequest(format!(
                "Unknown gender preference: {}",
                other
            ))),
        }
    }
}

/// Anything narrower than `Any` is the gender filter.
pub fn select_gender(preference: GenderPreference, entitled: bool) -> Decision {
    match preference {
        GenderPreference::Any => Decision::Allowed,
        GenderPreference::Male | GenderPreference::Female => {
            evaluate_feature(Feature::GenderFilter, entitled)
        }
    }
}
