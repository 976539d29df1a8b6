use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - Idle -> AwaitingFirstReveal
/// - AwaitingFirstReveal -> AwaitingSecondReveal
/// - AwaitingSecondReveal -> AwaitingFirstReveal (match)
/// - AwaitingSecondReveal -> AwaitingUnreveal (mismatch)
/// - AwaitingSecondReveal -> Complete (last pair)
/// - AwaitingUnreveal -> AwaitingFirstReveal
/// - any -> Idle (reset)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No deck dealt
    Idle,
    AwaitingFirstReveal,
    AwaitingSecondReveal,
    /// Mismatched pair is face up, waiting for the revert timer
    AwaitingUnreveal,
    /// Every pair found
    Complete,
}

impl EngineState {
    pub const fn accepts_reveals(self) -> bool {
        matches!(self, Self::AwaitingFirstReveal | Self::AwaitingSecondReveal)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Reveal was not accepted, nothing changed
    NoChange,
    /// First card of a pair attempt is face up
    Revealed,
    Matched { first: Position, second: Position },
    Mismatched { first: Position, second: Position },
    /// Last pair matched, the game is over
    Won { first: Position, second: Position },
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Matched { .. } => true,
            Mismatched { .. } => true,
            Won { .. } => true,
        }
    }
}

/// Turn state machine: accepts reveals, resolves pairs and detects the end of the game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchEngine {
    cards: Vec<Card>,
    pending: SmallVec<[Position; 2]>,
    matched_pairs: PairCount,
    total_pairs: PairCount,
    state: EngineState,
    timer_running: bool,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            pending: SmallVec::new(),
            matched_pairs: 0,
            total_pairs: 0,
            state: Default::default(),
            timer_running: false,
        }
    }

    /// Deals `deck` face down and zeroes every counter. The timer stays stopped until the first reveal.
    pub fn start(&mut self, deck: Deck) {
        self.total_pairs = deck.pair_count();
        self.cards = deck.into_cards();
        self.pending.clear();
        self.matched_pairs = 0;
        self.timer_running = false;
        self.state = EngineState::AwaitingFirstReveal;
        log::debug!("Dealt {} cards", self.cards.len());
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, position: Position) -> Option<&Card> {
        self.cards.get(usize::from(position))
    }

    pub fn card_state(&self, position: Position) -> Option<CardState> {
        self.card(position).map(|card| card.state)
    }

    /// Cards currently face up and waiting for resolution, in reveal order.
    pub fn pending(&self) -> &[Position] {
        &self.pending
    }

    pub fn matched_pairs(&self) -> PairCount {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> PairCount {
        self.total_pairs
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn can_reveal_at(&self, position: Position) -> bool {
        self.state.accepts_reveals()
            && self.pending.len() < 2
            && self.card_state(position) == Some(CardState::Hidden)
    }

    /// Flips the card at `position`. Anything that is not a legal reveal is ignored.
    ///
    /// The move is counted when the second card of an attempt turns over, before the pair is
    /// compared, so mismatches count the same as matches.
    pub fn reveal(&mut self, position: Position, scoreboard: &mut Scoreboard) -> RevealOutcome {
        if !self.can_reveal_at(position) {
            return RevealOutcome::NoChange;
        }

        // accepting states are exactly the two awaiting-reveal ones
        let completes_pair = matches!(self.state, EngineState::AwaitingSecondReveal);

        self.mark_started();
        self.cards[usize::from(position)].state = CardState::Revealed;
        self.pending.push(position);
        log::trace!("Revealed card at {}", position);

        if !completes_pair {
            self.state = EngineState::AwaitingSecondReveal;
            return RevealOutcome::Revealed;
        }

        scoreboard.record_move();
        self.resolve()
    }

    /// Turns a mismatched pair back over. Returns the pair, or `None` when no mismatch is pending.
    pub fn unreveal(&mut self) -> Option<(Position, Position)> {
        if !matches!(self.state, EngineState::AwaitingUnreveal) {
            return None;
        }

        let (first, second) = (self.pending[0], self.pending[1]);
        self.cards[usize::from(first)].state = CardState::Hidden;
        self.cards[usize::from(second)].state = CardState::Hidden;
        self.pending.clear();
        self.state = EngineState::AwaitingFirstReveal;
        log::debug!("Turned {} and {} back over", first, second);
        Some((first, second))
    }

    fn resolve(&mut self) -> RevealOutcome {
        let (first, second) = (self.pending[0], self.pending[1]);

        if self.cards[usize::from(first)].symbol != self.cards[usize::from(second)].symbol {
            self.state = EngineState::AwaitingUnreveal;
            log::debug!("Mismatch between {} and {}", first, second);
            return RevealOutcome::Mismatched { first, second };
        }

        self.cards[usize::from(first)].state = CardState::Matched;
        self.cards[usize::from(second)].state = CardState::Matched;
        self.matched_pairs += 1;
        self.pending.clear();
        log::debug!(
            "Matched {} and {}, {}/{} pairs found",
            first,
            second,
            self.matched_pairs,
            self.total_pairs
        );

        if self.matched_pairs == self.total_pairs {
            self.state = EngineState::Complete;
            self.timer_running = false;
            RevealOutcome::Won { first, second }
        } else {
            self.state = EngineState::AwaitingFirstReveal;
            RevealOutcome::Matched { first, second }
        }
    }

    fn mark_started(&mut self) {
        if !self.timer_running {
            self.timer_running = true;
            log::debug!("Timer started");
        }
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}
