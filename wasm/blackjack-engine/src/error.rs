use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("invalid rank {0}, expected 1..=13")]
    InvalidRank(u8),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("cannot deal zero cards")]
    ZeroDeal,
    #[error("deck exhausted: requested {requested}, {remaining} remaining")]
    Exhausted { requested: usize, remaining: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("round is already over")]
    RoundOver,
    #[error("round is still in progress")]
    RoundInProgress,
    #[error("hand has already been split")]
    AlreadySplit,
    #[error("hand is not a splitable pair")]
    NotSplitable,
    #[error("bank is exhausted, reset the bankroll")]
    Bankrupt,
    #[error("invalid bet {bet}, bank is {bank}")]
    InvalidBet { bet: i64, bank: i64 },
    #[error("deck error: {0}")]
    Deck(#[from] DeckError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("default bet must be positive, got {0}")]
    NonPositiveBet(i64),
    #[error("bet step must be positive, got {0}")]
    NonPositiveStep(i64),
    #[error("starting bank {bank} is below the default bet {bet}")]
    BankBelowBet { bank: i64, bet: i64 },
}
