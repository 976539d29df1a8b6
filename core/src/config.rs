use alloc::vec::Vec;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

pub const DEFAULT_SYMBOLS: [Symbol; 8] = [
    Symbol('🎯'),
    Symbol('🎨'),
    Symbol('⚽'),
    Symbol('🎵'),
    Symbol('🚀'),
    Symbol('🍕'),
    Symbol('🌟'),
    Symbol('🎮'),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Distinct face values, each dealt twice
    pub symbols: Vec<Symbol>,
    /// How long a mismatched pair stays face up
    pub mismatch_delay_ms: u32,
    /// Cadence of the elapsed-time clock
    pub tick_interval_ms: u32,
}

impl GameConfig {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|err| {
            log::warn!("Could not parse game config: {}", err);
            GameError::InvalidConfig
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(GameError::InvalidConfig);
        }
        Deck::pairs_of(&self.symbols)?;
        Ok(())
    }

    pub fn total_cards(&self) -> usize {
        self.symbols.len() * 2
    }

    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_delay_ms.into())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.into())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.to_vec(),
            mismatch_delay_ms: 1000,
            tick_interval_ms: 1000,
        }
    }
}
