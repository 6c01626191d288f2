use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    bankroll::Bankroll,
    config::TableConfig,
    deck::Deck,
    error::{ConfigError, EngineError},
    hand::{DealerHand, Hand, PlayerHand},
    storage::Store,
    strategy::{self, Action},
    view::TableView,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Push,
}

impl Outcome {
    pub fn past_tense(&self) -> &'static str {
        match self {
            Outcome::Win => "won",
            Outcome::Lose => "lost",
            Outcome::Push => "pushed",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitSlot {
    First,
    Second,
}

impl SplitSlot {
    pub fn index(&self) -> usize {
        match self {
            SplitSlot::First => 0,
            SplitSlot::Second => 1,
        }
    }
}

/// Result of a finished hand against the dealer. A busted hand loses even
/// if the dealer busts as well.
pub fn determine_outcome(hand: &Hand, dealer: &Hand) -> Outcome {
    let player_value = hand.value();
    let dealer_value = dealer.value();
    if hand.is_busted() || (dealer_value > player_value && !dealer.is_busted()) {
        Outcome::Lose
    } else if dealer.is_busted() || player_value > dealer_value {
        Outcome::Win
    } else {
        Outcome::Push
    }
}

/// Round state taken before an action that deals, put back if the deck
/// runs out partway through.
struct Checkpoint {
    deck: Deck,
    player: PlayerHand,
    dealer: DealerHand,
    split_hands: Vec<Hand>,
    split_slot: Option<SplitSlot>,
    is_over: bool,
    outcomes: Vec<Outcome>,
    bankroll: Bankroll,
}

impl Checkpoint {
    fn save<S: Store>(table: &Table<S>) -> Self {
        Checkpoint {
            deck: table.deck.clone(),
            player: table.player.clone(),
            dealer: table.dealer.clone(),
            split_hands: table.split_hands.clone(),
            split_slot: table.split_slot,
            is_over: table.is_over,
            outcomes: table.outcomes.clone(),
            bankroll: table.bankroll.clone(),
        }
    }

    fn restore<S: Store>(self, table: &mut Table<S>) {
        table.deck = self.deck;
        table.player = self.player;
        table.dealer = self.dealer;
        table.split_hands = self.split_hands;
        table.split_slot = self.split_slot;
        table.is_over = self.is_over;
        table.outcomes = self.outcomes;
        table.bankroll = self.bankroll;
    }
}

/// One player against the dealer. Holds the round in progress and the
/// bankroll, and writes the bankroll to `store` after every settlement.
pub struct Table<S: Store> {
    config: TableConfig,
    store: S,
    deck: Deck,
    player: PlayerHand,
    dealer: DealerHand,
    split_hands: Vec<Hand>,
    split_slot: Option<SplitSlot>,
    is_over: bool,
    outcomes: Vec<Outcome>,
    bankroll: Bankroll,
}

impl<S: Store> Table<S> {
    pub fn new(config: TableConfig, store: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let deck = match config.seed {
            Some(seed) => Deck::new(seed),
            None => Deck::from_entropy(),
        };
        let bankroll = Bankroll::load(&store, &config);
        info!(bank = bankroll.bank, bet = bankroll.bet, "table opened");
        Ok(Table {
            config,
            store,
            deck,
            player: PlayerHand::default(),
            dealer: DealerHand::default(),
            split_hands: Vec::new(),
            split_slot: None,
            is_over: true,
            outcomes: Vec::new(),
            bankroll,
        })
    }

    pub fn start_round(&mut self) -> Result<(), EngineError> {
        self.check_can_deal()?;
        self.atomically(|table| {
            table.deck.reset();
            table.begin_round()
        })
    }

    /// Deal a round from a prepared deck instead of a fresh shuffle.
    pub fn start_round_with(&mut self, deck: Deck) -> Result<(), EngineError> {
        self.check_can_deal()?;
        self.atomically(|table| {
            table.deck = deck;
            table.begin_round()
        })
    }

    fn check_can_deal(&self) -> Result<(), EngineError> {
        if !self.is_over {
            return Err(EngineError::RoundInProgress);
        }
        if self.bankroll.is_bankrupt() {
            return Err(EngineError::Bankrupt);
        }
        Ok(())
    }

    fn begin_round(&mut self) -> Result<(), EngineError> {
        self.player.empty();
        self.dealer.empty();
        self.split_hands.clear();
        self.split_slot = None;
        self.outcomes.clear();
        self.bankroll.clamp_bet();

        for _ in 0..2 {
            self.player.add_cards(self.deck.deal(1)?);
            self.dealer.add_cards(self.deck.deal(1)?);
        }
        self.is_over = false;
        debug!(
            player = self.player.value(),
            showing = self.dealer.value_showing(),
            bet = self.bankroll.bet,
            "round dealt"
        );

        if self.player.is_blackjack() {
            self.end_round()?;
        }
        Ok(())
    }

    pub fn hit(&mut self) -> Result<(), EngineError> {
        self.check_live()?;
        self.atomically(|table| {
            table.player.add_cards(table.deck.deal(1)?);
            table.sync_split_hand();
            debug!(value = table.player.value(), "player hits");

            if table.player.is_busted() || table.player.is_blackjack() {
                return table.finish_hand();
            }
            Ok(())
        })
    }

    pub fn stand(&mut self) -> Result<(), EngineError> {
        self.check_live()?;
        self.atomically(|table| table.finish_hand())
    }

    pub fn split(&mut self) -> Result<(), EngineError> {
        self.check_live()?;
        if self.split_slot.is_some() {
            return Err(EngineError::AlreadySplit);
        }
        if !self.player.is_splitable() {
            return Err(EngineError::NotSplitable);
        }

        self.atomically(|table| {
            table.split_hands = table
                .player
                .cards()
                .iter()
                .map(|card| Hand::new(vec![*card]))
                .collect();
            info!(pair = %table.player.cards()[0], "hand split");
            table.play_split_hand(SplitSlot::First)
        })
    }

    /// Basic strategy advice for the active hand.
    pub fn suggestion(&self) -> Result<Action, EngineError> {
        self.check_live()?;
        let can_split = self.split_slot.is_none() && self.player.is_splitable();
        Ok(strategy::suggest(
            self.active_hand(),
            self.dealer.value_showing(),
            can_split,
        ))
    }

    pub fn reset_bankroll(&mut self) {
        self.bankroll.reset_money(&self.config);
        self.persist();
        self.player.empty();
        self.dealer.empty();
        self.split_hands.clear();
        self.split_slot = None;
        self.outcomes.clear();
        self.is_over = true;
        info!(bank = self.bankroll.bank, "bankroll reset");
    }

    pub fn reset_record(&mut self) {
        self.bankroll.reset_record();
        self.persist();
    }

    pub fn set_bet(&mut self, bet: i64) -> Result<(), EngineError> {
        if !self.is_over {
            return Err(EngineError::RoundInProgress);
        }
        self.bankroll.set_bet(bet)?;
        self.persist();
        Ok(())
    }

    pub fn view(&self) -> TableView {
        TableView::capture(self)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn bankroll(&self) -> &Bankroll {
        &self.bankroll
    }

    pub fn player_hand(&self) -> &PlayerHand {
        &self.player
    }

    pub fn dealer_hand(&self) -> &DealerHand {
        &self.dealer
    }

    pub fn split_hands(&self) -> &[Hand] {
        &self.split_hands
    }

    pub fn split_slot(&self) -> Option<SplitSlot> {
        self.split_slot
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    /// One outcome per settled hand, two after a split.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn can_split(&self) -> bool {
        !self.is_over && self.split_slot.is_none() && self.player.is_splitable()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn active_hand(&self) -> &Hand {
        match self.split_slot {
            Some(slot) => &self.split_hands[slot.index()],
            None => &*self.player,
        }
    }

    /// Runs `action`, undoing every change to the round if it fails.
    fn atomically<F>(&mut self, action: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut Self) -> Result<(), EngineError>,
    {
        let checkpoint = Checkpoint::save(self);
        let result = action(self);
        if let Err(err) = &result {
            warn!(%err, "action rolled back");
            checkpoint.restore(self);
        }
        result
    }

    fn check_live(&self) -> Result<(), EngineError> {
        if self.is_over {
            return Err(EngineError::RoundOver);
        }
        Ok(())
    }

    fn finish_hand(&mut self) -> Result<(), EngineError> {
        if self.split_slot == Some(SplitSlot::First) {
            return self.play_split_hand(SplitSlot::Second);
        }
        self.end_round()
    }

    fn play_split_hand(&mut self, slot: SplitSlot) -> Result<(), EngineError> {
        self.split_slot = Some(slot);
        let start = self.split_hands[slot.index()].cards().to_vec();
        self.player.empty();
        self.player.add_cards(start);
        self.player.add_cards(self.deck.deal(1)?);
        self.sync_split_hand();
        debug!(hand = slot.index() + 1, value = self.player.value(), "playing split hand");

        if self.player.is_blackjack() {
            return self.finish_hand();
        }
        Ok(())
    }

    fn sync_split_hand(&mut self) {
        if let Some(slot) = self.split_slot {
            self.split_hands[slot.index()] = Hand::new(self.player.cards().to_vec());
        }
    }

    fn end_round(&mut self) -> Result<(), EngineError> {
        let finished: Vec<Hand> = if self.split_hands.is_empty() {
            vec![(*self.player).clone()]
        } else {
            self.split_hands.clone()
        };
        if finished.iter().any(|hand| !hand.is_busted()) {
            self.dealer.play(&mut self.deck)?;
        }
        self.is_over = true;
        self.split_slot = None;

        for hand in &finished {
            let outcome = determine_outcome(hand, &self.dealer);
            self.bankroll.settle(outcome);
            self.outcomes.push(outcome);
        }
        info!(
            outcomes = ?self.outcomes,
            dealer = self.dealer.value(),
            bank = self.bankroll.bank,
            "round settled"
        );

        self.persist();
        if self.bankroll.is_bankrupt() {
            warn!(bank = self.bankroll.bank, "bankroll exhausted");
        }
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(err) = self.bankroll.persist(&mut self.store) {
            warn!(%err, "failed to persist bankroll");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hand::tests::cards, storage::MemoryStore};

    fn hand(ranks: &[u8]) -> Hand {
        Hand::new(cards(ranks))
    }

    fn table() -> Table<MemoryStore> {
        let config = TableConfig {
            seed: Some(11),
            ..TableConfig::default()
        };
        Table::new(config, MemoryStore::new()).unwrap()
    }

    /// Deck order for a round: player, dealer, player, dealer, then draws.
    fn round(player: [u8; 2], dealer: [u8; 2], draws: &[u8]) -> Deck {
        let mut ranks = vec![player[0], dealer[0], player[1], dealer[1]];
        ranks.extend_from_slice(draws);
        Deck::stacked(cards(&ranks))
    }

    #[test]
    fn outcome_rules() {
        assert_eq!(determine_outcome(&hand(&[10, 10]), &hand(&[10, 9])), Outcome::Win);
        assert_eq!(determine_outcome(&hand(&[10, 10]), &hand(&[10, 13])), Outcome::Push);
        assert_eq!(determine_outcome(&hand(&[10, 8, 4]), &hand(&[10, 8])), Outcome::Lose);
        assert_eq!(determine_outcome(&hand(&[10, 8, 4]), &hand(&[10, 6, 9])), Outcome::Lose);
        assert_eq!(determine_outcome(&hand(&[10, 2]), &hand(&[10, 6, 9])), Outcome::Win);
        assert_eq!(determine_outcome(&hand(&[10, 7]), &hand(&[10, 8])), Outcome::Lose);
    }

    #[test]
    fn fresh_table_is_idle() {
        let mut table = table();
        assert!(table.is_over());
        assert!(table.player_hand().is_empty());
        assert_eq!(table.hit(), Err(EngineError::RoundOver));
    }

    #[test]
    fn shuffled_round_deals_two_each() {
        let mut table = table();
        table.start_round().unwrap();
        if !table.is_over() {
            assert_eq!(table.player_hand().len(), 2);
            assert_eq!(table.dealer_hand().len(), 2);
            assert_eq!(table.start_round(), Err(EngineError::RoundInProgress));
        }
    }

    #[test]
    fn stand_wins_against_lower_dealer() {
        let mut table = table();
        table.start_round_with(round([10, 10], [10, 9], &[])).unwrap();
        assert_eq!(table.suggestion(), Ok(Action::Stand));
        table.stand().unwrap();
        assert!(table.is_over());
        assert_eq!(table.outcomes(), &[Outcome::Win]);
        assert_eq!(table.bankroll().bank, 1100);
        assert_eq!(table.bankroll().wins, 1);
        assert_eq!(table.store().get("bank").as_deref(), Some("1100"));
    }

    #[test]
    fn busted_player_loses_without_dealer_draw() {
        let mut table = table();
        table
            .start_round_with(round([10, 6], [10, 2], &[13, 5]))
            .unwrap();
        table.hit().unwrap();
        assert!(table.is_over());
        assert_eq!(table.dealer_hand().len(), 2);
        assert_eq!(table.outcomes(), &[Outcome::Lose]);
        assert_eq!(table.bankroll().bank, 900);
    }

    #[test]
    fn dealt_blackjack_ends_the_round() {
        let mut table = table();
        table.start_round_with(round([1, 13], [10, 7], &[])).unwrap();
        assert!(table.is_over());
        assert_eq!(table.outcomes(), &[Outcome::Win]);
        assert_eq!(table.stand(), Err(EngineError::RoundOver));
    }

    #[test]
    fn dealer_draws_after_stand() {
        let mut table = table();
        table
            .start_round_with(round([10, 8], [10, 6], &[3]))
            .unwrap();
        table.stand().unwrap();
        assert_eq!(table.dealer_hand().value(), 19);
        assert_eq!(table.outcomes(), &[Outcome::Lose]);
    }

    #[test]
    fn split_rejections_leave_state_alone() {
        let mut table = table();
        table.start_round_with(round([10, 9], [10, 7], &[])).unwrap();
        assert_eq!(table.split(), Err(EngineError::NotSplitable));
        assert!(table.split_hands().is_empty());

        let mut table = self::table();
        table
            .start_round_with(round([8, 8], [10, 6], &[8, 2, 3, 4]))
            .unwrap();
        table.split().unwrap();
        // First split hand drew another eight.
        assert!(table.player_hand().is_splitable());
        assert!(!table.can_split());
        assert_eq!(table.split(), Err(EngineError::AlreadySplit));
        // Hard 16 against a six stands once splitting is off the table.
        assert_eq!(table.suggestion(), Ok(Action::Stand));
    }

    #[test]
    fn split_plays_both_hands_in_turn() {
        let mut table = table();
        table
            .start_round_with(round([8, 8], [10, 6], &[13, 9, 3, 10, 10]))
            .unwrap();
        assert!(table.can_split());
        assert_eq!(table.suggestion(), Ok(Action::Split));

        table.split().unwrap();
        assert_eq!(table.split_slot(), Some(SplitSlot::First));
        assert_eq!(table.split_hands()[0].value(), 18);
        assert_eq!(table.split_hands()[1].len(), 1);
        assert_eq!(table.player_hand().cards(), table.split_hands()[0].cards());

        table.hit().unwrap();
        assert!(table.split_hands()[0].is_busted());
        assert_eq!(table.split_slot(), Some(SplitSlot::Second));
        assert_eq!(table.split_hands()[1].value(), 11);

        table.hit().unwrap();
        assert!(table.is_over());
        assert!(table.dealer_hand().is_busted());
        assert_eq!(table.outcomes(), &[Outcome::Lose, Outcome::Win]);
        assert_eq!(table.bankroll().bank, 1000);
        assert_eq!((table.bankroll().wins, table.bankroll().losses), (1, 1));
        assert_eq!(table.split_slot(), None);
        assert_eq!(table.split_hands().len(), 2);
    }

    #[test]
    fn split_twenty_one_auto_stands() {
        let mut table = table();
        table
            .start_round_with(round([1, 1], [10, 7], &[13, 9]))
            .unwrap();
        table.split().unwrap();
        // Ace + King stands on its own and the second hand takes over.
        assert_eq!(table.split_slot(), Some(SplitSlot::Second));
        assert!(table.split_hands()[0].is_blackjack());
        assert_eq!(table.split_hands()[1].value(), 20);

        table.stand().unwrap();
        assert_eq!(table.outcomes(), &[Outcome::Win, Outcome::Win]);
        assert_eq!(table.bankroll().bank, 1200);
    }

    #[test]
    fn dealer_plays_when_one_split_hand_survives() {
        let mut table = table();
        table
            .start_round_with(round([8, 8], [10, 6], &[10, 4, 10, 5]))
            .unwrap();
        table.split().unwrap();
        table.stand().unwrap();
        table.hit().unwrap();
        // The first hand is still live, so the dealer draws to 21.
        assert!(table.is_over());
        assert_eq!(table.dealer_hand().len(), 3);
        assert_eq!(table.outcomes(), &[Outcome::Lose, Outcome::Lose]);
    }

    #[test]
    fn bankrupt_table_refuses_to_deal() {
        let config = TableConfig {
            starting_bank: 100,
            seed: Some(1),
            ..TableConfig::default()
        };
        let mut table = Table::new(config, MemoryStore::new()).unwrap();
        table.start_round_with(round([10, 7], [10, 9], &[])).unwrap();
        table.stand().unwrap();
        assert!(table.bankroll().is_bankrupt());
        assert_eq!(table.start_round(), Err(EngineError::Bankrupt));

        table.reset_bankroll();
        assert_eq!(table.bankroll().bank, 100);
        assert!(table.player_hand().is_empty());
        assert!(table.start_round().is_ok());
    }

    #[test]
    fn bet_changes_only_between_rounds() {
        let mut table = table();
        table.set_bet(300).unwrap();
        assert_eq!(table.store().get("bet").as_deref(), Some("300"));
        table.start_round_with(round([10, 9], [10, 7], &[])).unwrap();
        assert_eq!(table.set_bet(200), Err(EngineError::RoundInProgress));
        table.stand().unwrap();
        assert_eq!(table.bankroll().bank, 1300);
        assert!(matches!(table.set_bet(5000), Err(EngineError::InvalidBet { .. })));
    }

    #[test]
    fn reset_record_keeps_money() {
        let mut table = table();
        table.start_round_with(round([10, 9], [10, 7], &[])).unwrap();
        table.stand().unwrap();
        table.reset_record();
        assert_eq!(table.bankroll().wins, 0);
        assert_eq!(table.bankroll().bank, 1100);
        assert_eq!(table.store().get("wins").as_deref(), Some("0"));
    }

    #[test]
    fn short_deal_leaves_the_table_idle() {
        let mut table = table();
        let before = table.view();
        let result = table.start_round_with(Deck::stacked(cards(&[10, 10, 9])));
        assert!(matches!(result, Err(EngineError::Deck(_))));
        assert_eq!(table.view(), before);
        assert!(table.player_hand().is_empty());
        assert!(table.dealer_hand().is_empty());
        assert!(table.is_over());
    }

    #[test]
    fn dealer_underflow_keeps_the_round_open() {
        let mut table = table();
        table.start_round_with(round([10, 6], [10, 6], &[])).unwrap();
        let before = table.view();

        assert!(matches!(table.stand(), Err(EngineError::Deck(_))));
        assert_eq!(table.view(), before);
        assert!(!table.is_over());
        assert!(table.outcomes().is_empty());
        assert_eq!(table.bankroll().bank, 1000);
        assert_eq!(table.store().get("bank"), None);

        assert!(matches!(table.hit(), Err(EngineError::Deck(_))));
        assert_eq!(table.view(), before);
        assert_eq!(table.suggestion(), Ok(Action::Stand));
    }

    #[test]
    fn split_underflow_restores_the_pair() {
        let mut table = table();
        table.start_round_with(round([8, 8], [10, 6], &[])).unwrap();
        let before = table.view();
        assert!(matches!(table.split(), Err(EngineError::Deck(_))));
        assert_eq!(table.view(), before);
        assert_eq!(table.split_slot(), None);
        assert!(table.split_hands().is_empty());
        assert_eq!(table.player_hand().len(), 2);
        assert!(table.can_split());

        let mut table = self::table();
        table.start_round_with(round([8, 8], [10, 6], &[5])).unwrap();
        table.split().unwrap();
        let before = table.view();
        // No card left to start the second hand.
        assert!(matches!(table.stand(), Err(EngineError::Deck(_))));
        assert_eq!(table.view(), before);
        assert_eq!(table.split_slot(), Some(SplitSlot::First));
        assert_eq!(table.player_hand().value(), 13);
    }

    #[test]
    fn split_hand_hit_to_21_moves_on() {
        let mut table = table();
        table
            .start_round_with(round([8, 8], [10, 7], &[3, 10, 9]))
            .unwrap();
        table.split().unwrap();
        assert_eq!(table.split_hands()[0].value(), 11);

        table.hit().unwrap();
        assert_eq!(table.split_slot(), Some(SplitSlot::Second));
        assert!(table.split_hands()[0].is_blackjack());
        assert_eq!(table.split_hands()[0].len(), 3);
        assert_eq!(table.split_hands()[1].value(), 17);
        assert_eq!(table.player_hand().cards(), table.split_hands()[1].cards());

        table.stand().unwrap();
        assert_eq!(table.outcomes(), &[Outcome::Win, Outcome::Push]);
        assert_eq!(table.bankroll().bank, 1100);
    }
}
