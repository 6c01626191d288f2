use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

use crate::{
    card::{Card, Suit},
    error::DeckError,
};

pub const DECK_SIZE: usize = 52;

/// A single 52-card deck. Cards are dealt from the front.
#[derive(Clone)]
pub struct Deck {
    cards: Vec<Card>,
    rng: SmallRng,
}

impl Deck {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    fn with_rng(rng: SmallRng) -> Self {
        let mut deck = Deck {
            cards: Vec::with_capacity(DECK_SIZE),
            rng,
        };
        deck.reset();
        deck
    }

    /// A deck that deals `cards` in the given order. `reset` turns it back
    /// into a shuffled full deck.
    pub fn stacked(cards: Vec<Card>) -> Self {
        Deck {
            cards,
            rng: SmallRng::seed_from_u64(0),
        }
    }

    pub fn reset(&mut self) {
        self.cards.clear();
        for suit in Suit::ALL {
            for rank in Card::RANKS {
                if let Ok(card) = Card::new(suit, rank) {
                    self.cards.push(card);
                }
            }
        }
        self.shuffle();
    }

    /// Fisher-Yates from the back of the deck.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
    }

    pub fn deal(&mut self, count: usize) -> Result<Vec<Card>, DeckError> {
        if count == 0 {
            return Err(DeckError::ZeroDeal);
        }
        if count > self.cards.len() {
            return Err(DeckError::Exhausted {
                requested: count,
                remaining: self.cards.len(),
            });
        }
        Ok(self.cards.drain(..count).collect())
    }

    pub fn deal_card(&mut self) -> Result<Card, DeckError> {
        let mut dealt = self.deal(1)?;
        dealt.pop().ok_or(DeckError::Exhausted {
            requested: 1,
            remaining: 0,
        })
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
