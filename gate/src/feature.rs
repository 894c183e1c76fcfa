use std::{fmt, str::FromStr};

use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

/// Premium-only capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    GenderFilter,
    VoiceOnly,
    UnlimitedTime,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::GenderFilter, Feature::VoiceOnly, Feature::UnlimitedTime];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::GenderFilter => "gender-filter",
            Feature::VoiceOnly => "voice-only",
            Feature::UnlimitedTime => "unlimited-time",
        }
    }

    pub fn requires_premium(&self) -> bool {
        match self {
            Feature::GenderFilter | Feature::VoiceOnly | Feature::UnlimitedTime => true,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = AppError;

    fn from_str(s: &str) -> Res<Self> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| AppError::UnknownFeature(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenialReason {
    UpgradeRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "camelCase")]
pub enum Decision {
    Allowed,
    Denied { reason: DenialReason },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Pure decision; a denial only tells the caller to show the paywall.
pub fn evaluate_feature(feature: Feature, entitled: bool) -> Decision {
    if !feature.requires_premium() || entitled {
        Decision::Allowed
    } else {
        Decision::Denied {
            reason: DenialReason::UpgradeRequired,
        }
    }
}

/// Same as [`evaluate_feature`] for a wire id. Unknown ids are errors, not denials.
pub fn evaluate(request: &str, entitled: bool) -> Res<Decision> {
    let feature = request.parse::<Feature>()?;
    let decision = evaluate_feature(feature, entitled);
    log::debug!("Feature {} evaluated to {:?}", feature, decision);
    Ok(decision)
}
