use super::*;
use rand::prelude::*;

/// Pairs up the symbol set and applies a seeded Fisher–Yates shuffle.
///
/// The generator keeps its RNG stream between calls, so every new game gets a different
/// arrangement while the whole sequence stays reproducible from the seed.
#[derive(Clone, Debug)]
pub struct ShuffledDeckGenerator {
    seed: u64,
    rng: SmallRng,
}

impl ShuffledDeckGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl DeckGenerator for ShuffledDeckGenerator {
    fn generate(&mut self, symbol_set: &[Symbol]) -> Result<Deck> {
        let mut symbols = Deck::pairs_of(symbol_set)?;
        fisher_yates(&mut symbols, &mut self.rng);
        log::debug!(
            "Shuffled {} cards from seed {}",
            symbols.len(),
            self.seed
        );
        Deck::from_symbols(symbols)
    }
}

/// Unbiased in-place shuffle: from the last index down to 1, swap with a uniform pick in `[0, i]`.
pub fn fisher_yates<T>(items: &mut [T], rng: &mut SmallRng) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
