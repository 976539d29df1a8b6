use core::fmt;
use serde::{Deserialize, Serialize};

/// Index of a card in the deck, stable for the whole game.
pub type Position = u8;

/// Count type used for matched and total pairs.
pub type PairCount = u8;

/// Count type used for pair attempts.
pub type MoveCount = u32;

/// Whole seconds of play.
pub type Seconds = u32;

/// Most distinct symbols a deck can hold while every position still fits in [`Position`].
pub const MAX_SYMBOLS: usize = (Position::MAX / 2) as usize;

/// Face value printed on a card, each one appears exactly twice in a deck.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub char);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<char> for Symbol {
    fn from(value: char) -> Self {
        Self(value)
    }
}
