use serde::Deserialize;

use crate::error::ConfigError;

fn default_starting_bank() -> i64 {
    1000
}

fn default_bet() -> i64 {
    100
}

fn default_bet_step() -> i64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    #[serde(default = "default_starting_bank")]
    pub starting_bank: i64,
    #[serde(default = "default_bet")]
    pub default_bet: i64,
    #[serde(default = "default_bet_step")]
    pub bet_step: i64,
    /// Fixed shuffle seed; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            starting_bank: default_starting_bank(),
            default_bet: default_bet(),
            bet_step: default_bet_step(),
            seed: None,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_bet <= 0 {
            return Err(ConfigError::NonPositiveBet(self.default_bet));
        }
        if self.bet_step <= 0 {
            return Err(ConfigError::NonPositiveStep(self.bet_step));
        }
        if self.starting_bank < self.default_bet {
            return Err(ConfigError::BankBelowBet {
                bank: self.starting_bank,
                bet: self.default_bet,
            });
        }
        Ok(())
    }
}
