pub mod feature;
pub mod gender;

pub use feature::{Decision, DenialReason, Feature, evaluate, evaluate_feature};
pub use gender::{GenderPreference, select_gender};
