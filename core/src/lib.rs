#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Index;
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

pub use card::*;
pub use clock::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use event::*;
pub use generator::*;
pub use scoreboard::*;
pub use session::*;
pub use storage::*;
pub use types::*;

mod card;
mod clock;
mod config;
mod engine;
mod error;
mod event;
mod generator;
mod scoreboard;
mod session;
mod storage;
mod types;

/// Card arrangement for one game: even length, every symbol exactly twice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    symbols: Vec<Symbol>,
}

impl Deck {
    /// Validates an arrangement, refusing anything that is not made of whole pairs.
    pub fn from_symbols(symbols: Vec<Symbol>) -> Result<Self> {
        if symbols.len() % 2 != 0 {
            return Err(GameError::OddDeckSize);
        }
        if symbols.len() / 2 > MAX_SYMBOLS {
            return Err(GameError::TooManySymbols);
        }

        let mut counts: HashMap<Symbol, u8> = HashMap::with_capacity(symbols.len() / 2);
        for &symbol in &symbols {
            *counts.entry(symbol).or_default() += 1;
        }
        if counts.values().any(|&count| count != 2) {
            return Err(GameError::UnpairedSymbol);
        }

        Ok(Self { symbols })
    }

    /// Builds the unshuffled multiset for a symbol set, each symbol duplicated in place.
    pub fn pairs_of(symbol_set: &[Symbol]) -> Result<Vec<Symbol>> {
        if symbol_set.len() > MAX_SYMBOLS {
            return Err(GameError::TooManySymbols);
        }

        let mut seen: HashSet<Symbol> = HashSet::with_capacity(symbol_set.len());
        for &symbol in symbol_set {
            if !seen.insert(symbol) {
                return Err(GameError::DuplicateSymbol);
            }
        }

        let mut symbols = Vec::with_capacity(symbol_set.len() * 2);
        symbols.extend_from_slice(symbol_set);
        symbols.extend_from_slice(symbol_set);
        Ok(symbols)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn pair_count(&self) -> PairCount {
        (self.symbols.len() / 2).try_into().unwrap_or(PairCount::MAX)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol_at(&self, position: Position) -> Option<Symbol> {
        self.symbols.get(usize::from(position)).copied()
    }

    pub fn validate_position(&self, position: Position) -> Result<Position> {
        if usize::from(position) < self.symbols.len() {
            Ok(position)
        } else {
            Err(GameError::InvalidPosition)
        }
    }

    /// Lays the deck out as face-down cards.
    pub fn into_cards(self) -> Vec<Card> {
        self.symbols
            .into_iter()
            .zip(0..=Position::MAX)
            .map(|(symbol, position)| Card::new(symbol, position))
            .collect()
    }
}

impl Index<Position> for Deck {
    type Output = Symbol;

    fn index(&self, position: Position) -> &Self::Output {
        &self.symbols[usize::from(position)]
    }
}
