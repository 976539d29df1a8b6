use alloc::string::{String, ToString};
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Elapsed seconds rendered as zero-padded `MM:SS`; minutes keep growing past 59.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClockDisplay(pub Seconds);

impl fmt::Display for ClockDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

pub fn format_clock(elapsed_secs: Seconds) -> String {
    ClockDisplay(elapsed_secs).to_string()
}

/// Whether `moves` should replace `best`. Ties keep the old record.
pub const fn is_improvement(best: Option<MoveCount>, moves: MoveCount) -> bool {
    match best {
        None => true,
        Some(best) => moves < best,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    moves: MoveCount,
    elapsed_secs: Seconds,
    best: Option<MoveCount>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> MoveCount {
        self.moves
    }

    pub fn elapsed_secs(&self) -> Seconds {
        self.elapsed_secs
    }

    pub fn best(&self) -> Option<MoveCount> {
        self.best
    }

    pub fn clock(&self) -> ClockDisplay {
        ClockDisplay(self.elapsed_secs)
    }

    /// Best score as shown to the player, `--` when there is none yet.
    pub fn best_display(&self) -> String {
        self.best
            .map_or_else(|| "--".to_string(), |best| best.to_string())
    }

    /// Counts one completed pair attempt.
    pub fn record_move(&mut self) {
        self.moves = self.moves.saturating_add(1);
    }

    pub fn tick(&mut self) {
        self.add_secs(1);
    }

    /// Several ticks at once, saturating at the largest representable time.
    pub fn add_secs(&mut self, secs: Seconds) {
        self.elapsed_secs = self.elapsed_secs.saturating_add(secs);
    }

    /// Zeroes moves and time for a new game. The best score is left alone.
    pub fn reset_volatile(&mut self) {
        self.moves = 0;
        self.elapsed_secs = 0;
    }

    /// Reads the persisted best score, treating any storage problem as "no best yet".
    pub fn load_best<S: ScoreStore + ?Sized>(&mut self, store: &S) -> Option<MoveCount> {
        self.best = match store.get(BestScore::KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<MoveCount>() {
                Ok(best) => Some(best),
                Err(_) => {
                    log::warn!(
                        "Ignoring best score {:?}: {}",
                        raw,
                        StorageError::Corrupt
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("Could not load best score: {}", err);
                None
            }
        };
        self.best
    }

    /// Records `moves` as the new best if it strictly beats the current one.
    ///
    /// The in-memory best is updated even when the store refuses the write, so the finished
    /// game still reports it.
    pub fn commit_if_better<S: ScoreStore + ?Sized>(
        &mut self,
        store: &mut S,
        moves: MoveCount,
    ) -> bool {
        if !is_improvement(self.best, moves) {
            return false;
        }

        self.best = Some(moves);
        if let Err(err) = store.set(BestScore::KEY, &moves.to_string()) {
            log::warn!("Could not save best score {}: {}", moves, err);
        }
        true
    }
}
