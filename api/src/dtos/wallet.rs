use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wallet::BonusDecision;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub coins: u64,
    pub daily_bonus_available: bool,
    pub last_bonus_claimed_on: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct DailyBonusRequest {
    pub decision: BonusDecision,
}
