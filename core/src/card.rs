use serde::{Deserialize, Serialize};

use crate::{Position, Symbol};

/// Single source of truth for how a card is lying on the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    Hidden,
    Revealed,
    Matched,
}

impl CardState {
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Whether the symbol is visible, either pending or already paired.
    pub const fn is_face_up(self) -> bool {
        matches!(self, Self::Revealed | Self::Matched)
    }
}

impl Default for CardState {
    fn default() -> Self {
        Self::Hidden
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub symbol: Symbol,
    pub position: Position,
    pub state: CardState,
}

impl Card {
    pub const fn new(symbol: Symbol, position: Position) -> Self {
        Self {
            symbol,
            position,
            state: CardState::Hidden,
        }
    }
}
