use serde::{Deserialize, Serialize};

use crate::hand::Hand;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Hit,
    Stand,
    Split,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::Split => "split",
        }
    }
}

/// Basic strategy for the active hand against the dealer's up-card points
/// (Ace = 11). Pair splitting is only considered when `can_split` is set.
pub fn suggest(hand: &Hand, dealer_up: u32, can_split: bool) -> Action {
    if can_split && hand.is_pair() {
        if let Some(action) = pair_action(hand.cards()[0].rank(), dealer_up) {
            return action;
        }
    }

    if hand.is_hard() {
        hard_action(hand.value(), dealer_up)
    } else {
        soft_action(hand.value(), dealer_up)
    }
}

fn pair_action(rank: u8, dealer: u32) -> Option<Action> {
    let action = match rank {
        1 | 8 => Action::Split,
        9 => {
            if dealer == 7 || dealer >= 10 {
                Action::Stand
            } else {
                Action::Split
            }
        }
        7 => {
            if dealer < 8 {
                Action::Split
            } else if dealer == 10 {
                Action::Stand
            } else {
                Action::Hit
            }
        }
        6 => split_or_hit(dealer <= 7),
        4 => split_or_hit((4..=6).contains(&dealer)),
        3 => split_or_hit(dealer <= 8),
        2 => split_or_hit(dealer <= 7),
        // Fives, tens and face pairs play as hard totals.
        _ => return None,
    };
    Some(action)
}

fn split_or_hit(split: bool) -> Action {
    if split {
        Action::Split
    } else {
        Action::Hit
    }
}

fn hard_action(total: u32, dealer: u32) -> Action {
    match total {
        17.. => Action::Stand,
        13..=16 if dealer > 6 => Action::Hit,
        13..=16 => Action::Stand,
        12 if (4..=6).contains(&dealer) => Action::Stand,
        _ => Action::Hit,
    }
}

fn soft_action(total: u32, dealer: u32) -> Action {
    match total {
        19.. => Action::Stand,
        18 if dealer == 9 || dealer == 10 => Action::Hit,
        18 => Action::Stand,
        _ => Action::Hit,
    }
}
