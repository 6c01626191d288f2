use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CardError;

/// Unicode "playing card back"; every card glyph is an offset from it.
pub const CARD_BACK: char = '\u{1F0A0}';

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn name(&self) -> &'static str {
        match self {
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
        }
    }

    fn glyph_offset(&self) -> u32 {
        match self {
            Suit::Spades => 0,
            Suit::Hearts => 16,
            Suit::Diamonds => 32,
            Suit::Clubs => 48,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    suit: Suit,
    rank: u8,
}

impl Card {
    pub const RANKS: std::ops::RangeInclusive<u8> = 1..=13;

    pub fn new(suit: Suit, rank: u8) -> Result<Self, CardError> {
        if !Self::RANKS.contains(&rank) {
            return Err(CardError::InvalidRank(rank));
        }
        Ok(Card { suit, rank })
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn is_ace(&self) -> bool {
        self.rank == 1
    }

    pub fn is_face(&self) -> bool {
        self.rank > 10
    }

    /// Blackjack points: faces are 10, an Ace is 11 until a hand softens it.
    pub fn points(&self) -> u8 {
        if self.is_face() {
            10
        } else if self.is_ace() {
            11
        } else {
            self.rank
        }
    }

    pub fn rank_name(&self) -> String {
        match self.rank {
            1 => "A".to_string(),
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            rank => rank.to_string(),
        }
    }

    pub fn short_name(&self) -> String {
        format!("{}{}", self.suit.symbol(), self.rank_name())
    }

    pub fn glyph(&self) -> char {
        // The block carries a Knight between Jack and Queen.
        let knight = if self.rank >= 12 { 1 } else { 0 };
        let code = CARD_BACK as u32 + self.suit.glyph_offset() + self.rank as u32 + knight;
        char::from_u32(code).unwrap_or(CARD_BACK)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}
