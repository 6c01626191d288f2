use std::ops::Deref;

use serde::Serialize;
use tracing::debug;

use crate::{card::Card, deck::Deck, error::DeckError};

pub const BLACKJACK: u32 = 21;
pub const DEALER_STANDS_ON: u32 = 17;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandStatus {
    Live,
    Blackjack,
    Bust,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new(cards: Vec<Card>) -> Self {
        Hand { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn add_cards<I: IntoIterator<Item = Card>>(&mut self, cards: I) {
        self.cards.extend(cards);
    }

    pub fn empty(&mut self) {
        self.cards.clear();
    }

    /// Every card at its full points, so each Ace counts 11.
    pub fn hard_value(&self) -> u32 {
        self.cards.iter().map(|c| c.points() as u32).sum()
    }

    /// Every Ace counted as 1.
    pub fn soft_value(&self) -> u32 {
        self.cards
            .iter()
            .map(|c| if c.is_ace() { 1 } else { c.points() as u32 })
            .sum()
    }

    pub fn value(&self) -> u32 {
        let mut total = self.hard_value();
        if total > BLACKJACK {
            for card in &self.cards {
                if card.is_ace() {
                    total -= 10;
                }
                if total <= BLACKJACK {
                    break;
                }
            }
        }
        total
    }

    // Any 21 counts, not only a two-card natural.
    pub fn is_blackjack(&self) -> bool {
        self.value() == BLACKJACK
    }

    pub fn is_busted(&self) -> bool {
        self.value() > BLACKJACK
    }

    pub fn is_soft(&self) -> bool {
        let hard = self.hard_value();
        hard < BLACKJACK && hard != self.soft_value()
    }

    pub fn is_hard(&self) -> bool {
        !self.is_soft()
    }

    /// Exactly two cards of the same rank.
    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].rank() == self.cards[1].rank()
    }

    pub fn status(&self) -> HandStatus {
        if self.is_blackjack() {
            HandStatus::Blackjack
        } else if self.is_busted() {
            HandStatus::Bust
        } else {
            HandStatus::Live
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerHand {
    hand: Hand,
}

impl PlayerHand {
    pub fn new(cards: Vec<Card>) -> Self {
        PlayerHand { hand: Hand::new(cards) }
    }

    pub fn is_splitable(&self) -> bool {
        self.hand.is_pair()
    }

    pub fn add_cards<I: IntoIterator<Item = Card>>(&mut self, cards: I) {
        self.hand.add_cards(cards);
    }

    pub fn empty(&mut self) {
        self.hand.empty();
    }
}

impl Deref for PlayerHand {
    type Target = Hand;

    fn deref(&self) -> &Hand {
        &self.hand
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealerHand {
    hand: Hand,
}

impl DealerHand {
    pub fn new(cards: Vec<Card>) -> Self {
        DealerHand { hand: Hand::new(cards) }
    }

    pub fn add_cards<I: IntoIterator<Item = Card>>(&mut self, cards: I) {
        self.hand.add_cards(cards);
    }

    pub fn empty(&mut self) {
        self.hand.empty();
    }

    /// Draw until the hand reaches 17. Soft 17 stands.
    pub fn play(&mut self, deck: &mut Deck) -> Result<(), DeckError> {
        while self.hand.value() < DEALER_STANDS_ON {
            let card = deck.deal_card()?;
            debug!(card = %card, "dealer draws");
            self.hand.add_cards([card]);
        }
        Ok(())
    }

    /// The exposed card (the second one dealt) before the reveal.
    pub fn up_card(&self) -> Option<&Card> {
        self.hand.cards.get(1)
    }

    pub fn value_showing(&self) -> u32 {
        self.up_card().map(|c| c.points() as u32).unwrap_or(0)
    }
}

impl Deref for DealerHand {
    type Target = Hand;

    fn deref(&self) -> &Hand {
        &self.hand
    }
}
