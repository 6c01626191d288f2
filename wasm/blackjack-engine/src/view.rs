use serde::Serialize;

use crate::{
    card::{Card, CARD_BACK},
    game::{Outcome, Table},
    hand::{Hand, HandStatus},
    storage::Store,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "face", rename_all = "camelCase")]
pub enum CardView {
    Up {
        suit: String,
        rank: u8,
        name: String,
        glyph: String,
    },
    Down {
        glyph: String,
    },
}

impl CardView {
    fn up(card: &Card) -> Self {
        CardView::Up {
            suit: card.suit().name().to_string(),
            rank: card.rank(),
            name: card.short_name(),
            glyph: card.glyph().to_string(),
        }
    }

    fn down() -> Self {
        CardView::Down {
            glyph: CARD_BACK.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandView {
    pub cards: Vec<CardView>,
    pub points: u32,
    pub status: HandStatus,
    pub active: bool,
}

impl HandView {
    fn open(hand: &Hand, active: bool) -> Self {
        HandView {
            cards: hand.cards().iter().map(CardView::up).collect(),
            points: hand.value(),
            status: hand.status(),
            active,
        }
    }
}

/// Everything the page needs to draw the table after an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub player_hand: HandView,
    pub dealer_hand: HandView,
    pub split_hands: Vec<HandView>,
    pub active_split: Option<usize>,
    pub bank: i64,
    pub bet: i64,
    pub bet_options: Vec<i64>,
    pub wins: u32,
    pub losses: u32,
    pub is_over: bool,
    pub outcomes: Vec<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub bankrupt: bool,
    pub can_split: bool,
}

impl TableView {
    pub fn capture<S: Store>(table: &Table<S>) -> Self {
        let bankroll = table.bankroll();
        let active_split = table.split_slot().map(|slot| slot.index());
        TableView {
            player_hand: HandView::open(table.player_hand(), true),
            dealer_hand: dealer_view(table),
            split_hands: table
                .split_hands()
                .iter()
                .enumerate()
                .map(|(i, hand)| HandView::open(hand, Some(i) == active_split))
                .collect(),
            active_split,
            bank: bankroll.bank,
            bet: bankroll.bet,
            bet_options: bankroll.bet_options(table.config().bet_step),
            wins: bankroll.wins,
            losses: bankroll.losses,
            is_over: table.is_over(),
            outcomes: table.outcomes().to_vec(),
            summary: summarize(table.outcomes()),
            bankrupt: bankroll.is_bankrupt(),
            can_split: table.can_split(),
        }
    }
}

fn dealer_view<S: Store>(table: &Table<S>) -> HandView {
    let dealer = table.dealer_hand();
    if table.is_over() {
        return HandView::open(dealer, true);
    }
    // Hole card stays face down until the round is settled.
    let cards = dealer
        .cards()
        .iter()
        .enumerate()
        .map(|(i, card)| if i == 1 { CardView::up(card) } else { CardView::down() })
        .collect();
    HandView {
        cards,
        points: dealer.value_showing(),
        status: HandStatus::Live,
        active: false,
    }
}

fn summarize(outcomes: &[Outcome]) -> Option<String> {
    match outcomes {
        [] => None,
        [single] => Some(
            match single {
                Outcome::Win => "You win!",
                Outcome::Lose => "You lose!",
                Outcome::Push => "Push",
            }
            .to_string(),
        ),
        many => Some(
            many.iter()
                .enumerate()
                .map(|(i, outcome)| format!("Hand {}: {}", i + 1, outcome.past_tense()))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    }
}
