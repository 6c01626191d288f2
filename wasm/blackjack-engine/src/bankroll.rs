use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::{
    config::TableConfig,
    error::{EngineError, StoreError},
    game::Outcome,
    storage::Store,
};

pub const BANK_KEY: &str = "bank";
pub const BET_KEY: &str = "bet";
pub const WINS_KEY: &str = "wins";
pub const LOSSES_KEY: &str = "losses";

/// Money and win/loss record carried between rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bankroll {
    pub bank: i64,
    pub bet: i64,
    pub wins: u32,
    pub losses: u32,
}

fn read<T: DeserializeOwned>(store: &impl Store, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, %err, "ignoring corrupt stored value");
            #[cfg(target_arch = "wasm32")]
            web_sys::console::warn_1(
                &format!("ignoring corrupt stored value for {key}: {err}").into(),
            );
            None
        }
    }
}

fn write<T: Serialize>(store: &mut impl Store, key: &str, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|err| StoreError::Write {
        key: key.to_string(),
        reason: err.to_string(),
    })?;
    store.set(key, &raw)
}

impl Bankroll {
    pub fn fresh(config: &TableConfig) -> Self {
        Bankroll {
            bank: config.starting_bank,
            bet: config.default_bet,
            wins: 0,
            losses: 0,
        }
    }

    /// Missing, corrupt and non-positive values fall back to the defaults.
    pub fn load(store: &impl Store, config: &TableConfig) -> Self {
        let bank = read::<i64>(store, BANK_KEY)
            .filter(|bank| *bank > 0)
            .unwrap_or(config.starting_bank);
        let bet = read::<i64>(store, BET_KEY)
            .filter(|bet| *bet > 0 && *bet <= bank)
            .unwrap_or(config.default_bet)
            .min(bank);
        Bankroll {
            bank,
            bet,
            wins: read(store, WINS_KEY).unwrap_or(0),
            losses: read(store, LOSSES_KEY).unwrap_or(0),
        }
    }

    pub fn persist(&self, store: &mut impl Store) -> Result<(), StoreError> {
        write(store, BANK_KEY, &self.bank)?;
        write(store, BET_KEY, &self.bet)?;
        write(store, WINS_KEY, &self.wins)?;
        write(store, LOSSES_KEY, &self.losses)
    }

    pub fn settle(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => {
                self.bank += self.bet;
                self.wins += 1;
            }
            Outcome::Lose => {
                self.bank -= self.bet;
                self.losses += 1;
            }
            Outcome::Push => {}
        }
    }

    pub fn is_bankrupt(&self) -> bool {
        self.bank <= 0
    }

    /// Keeps the wager within the bank before a deal.
    pub fn clamp_bet(&mut self) {
        if self.bet > self.bank {
            self.bet = self.bank;
        }
    }

    pub fn set_bet(&mut self, bet: i64) -> Result<(), EngineError> {
        if bet <= 0 || bet > self.bank {
            return Err(EngineError::InvalidBet {
                bet,
                bank: self.bank,
            });
        }
        self.bet = bet;
        Ok(())
    }

    pub fn bet_options(&self, step: i64) -> Vec<i64> {
        if step <= 0 {
            return Vec::new();
        }
        (1..)
            .map(|n| n * step)
            .take_while(|amount| *amount <= self.bank)
            .collect()
    }

    pub fn reset_money(&mut self, config: &TableConfig) {
        self.bank = config.starting_bank;
        self.bet = config.default_bet;
    }

    pub fn reset_record(&mut self) {
        self.wins = 0;
        self.losses = 0;
    }
}
