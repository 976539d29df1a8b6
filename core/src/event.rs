use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Final figures of a won game, handed to the presentation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub elapsed_secs: Seconds,
    pub moves: MoveCount,
    pub best: Option<MoveCount>,
    pub new_best: bool,
}

impl GameResult {
    pub fn clock(&self) -> ClockDisplay {
        ClockDisplay(self.elapsed_secs)
    }
}

/// Observable results of a state transition. The core never draws or plays anything itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    CardRevealed {
        position: Position,
        symbol: Symbol,
    },
    MatchFound {
        first: Position,
        second: Position,
    },
    /// The pair stays face up until `revert` fires.
    MismatchFound {
        first: Position,
        second: Position,
        revert: TimerToken,
    },
    MismatchReverted {
        first: Position,
        second: Position,
    },
    ClockTicked {
        elapsed_secs: Seconds,
    },
    NewBestScore {
        moves: MoveCount,
    },
    GameWon(GameResult),
}

/// Events of one operation, in emission order.
pub type Events = SmallVec<[GameEvent; 4]>;

pub trait EventSink {
    fn emit(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> EventSink for F {
    fn emit(&mut self, event: &GameEvent) {
        self(event)
    }
}
