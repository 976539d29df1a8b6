use crate::*;
pub use preset::*;
pub use shuffled::*;

mod preset;
mod shuffled;

/// Source of decks for successive games. Called once per start or reset.
pub trait DeckGenerator {
    fn generate(&mut self, symbol_set: &[Symbol]) -> Result<Deck>;
}
