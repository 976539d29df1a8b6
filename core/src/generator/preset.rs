use super::*;
use alloc::vec::Vec;

/// Deals the same fixed arrangement every game, for replays and scripted play.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetDeckGenerator {
    arrangement: Vec<Symbol>,
}

impl PresetDeckGenerator {
    pub fn new(arrangement: Vec<Symbol>) -> Result<Self> {
        Deck::from_symbols(arrangement.clone())?;
        Ok(Self { arrangement })
    }
}

impl DeckGenerator for PresetDeckGenerator {
    fn generate(&mut self, symbol_set: &[Symbol]) -> Result<Deck> {
        let deck = Deck::from_symbols(self.arrangement.clone())?;

        if usize::from(deck.pair_count()) != symbol_set.len()
            || symbol_set
                .iter()
                .any(|symbol| !deck.symbols().contains(symbol))
        {
            log::warn!("Preset arrangement does not match the configured symbol set");
            return Err(GameError::UnpairedSymbol);
        }

        Ok(deck)
    }
}
