//! Coin balance and the once-a-day bonus.
//!
//! Claiming the bonus is an explicit user decision fed in as [`BonusDecision`],
//! so the rule does not depend on how the prompt is shown.

use chrono::NaiveDate;
use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusDecision {
    Accept,
    Decline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BonusOutcome {
    Credited { amount: u64, balance: u64 },
    Declined { balance: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    coins: u64,
    last_bonus_claimed_on: Option<NaiveDate>,
}

impl Wallet {
    pub fn new(coins: u64) -> Self {
        Self {
            coins,
            last_bonus_claimed_on: None,
        }
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn last_bonus_claimed_on(&self) -> Option<NaiveDate> {
        self.last_bonus_claimed_on
    }

    pub fn credit(&mut self, amount: u64) -> Res<u64> {
        self.coins = self
            .coins
            .checked_add(amount)
            .ok_or_else(|| AppError::BadRequest("Coin balance overflow".to_string()))?;
        Ok(self.coins)
    }

    pub fn can_claim_daily_bonus(&self, today: NaiveDate) -> bool {
        self.last_bonus_claimed_on.is_none_or(|last| last < today)
    }

    pub fn resolve_daily_bonus(
        &mut self,
        decision: BonusDecision,
        today: NaiveDate,
        amount: u64,
    ) -> Res<BonusOutcome> {
        match decision {
            BonusDecision::Decline => Ok(BonusOutcome::Declined {
                balance: self.coins,
            }),
            BonusDecision::Accept => {
                if !self.can_claim_daily_bonus(today) {
                    return Err(AppError::Conflict(format!(
                        "Daily bonus already claimed on {}",
                        today
                    )));
                }
                let balance = self.credit(amount)?;
                self.last_bonus_claimed_on = Some(today);
                log::info!("Daily bonus of {} coins credited, balance {}", amount, balance);
                Ok(BonusOutcome::Credited { amount, balance })
            }
        }
    }
}
