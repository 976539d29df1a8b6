use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Deck must hold an even number of cards")]
    OddDeckSize,
    #[error("Every symbol must appear exactly twice")]
    UnpairedSymbol,
    #[error("Symbol set contains the same symbol more than once")]
    DuplicateSymbol,
    #[error("Too many symbols for a single deck")]
    TooManySymbols,
    #[error("Invalid card position")]
    InvalidPosition,
    #[error("Invalid game configuration")]
    InvalidConfig,
}

/// Failures reported by a [`crate::ScoreStore`], never surfaced to the player.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Score storage is unavailable")]
    Unavailable,
    #[error("Stored score could not be parsed")]
    Corrupt,
}

pub type Result<T> = core::result::Result<T, GameError>;
