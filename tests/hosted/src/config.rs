//! On-disk description of a provisioned exchange, consumed by the crank
//! simulator and other downstream tooling. Addresses are stored base58 so the
//! file stays diffable and hand-editable.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::market::Market;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MarketConfig {
    pub name: String,
    pub market_pk: String,
    pub event_heap: String,
    pub base_mint: String,
    pub quote_mint: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub program_id: String,
    pub markets: Vec<MarketConfig>,
}

impl Config {
    pub fn from_markets(program: &Pubkey, markets: &[Market]) -> Config {
        Config {
            program_id: program.to_string(),
            markets: markets
                .iter()
                .map(|market| MarketConfig {
                    name: market.name.clone(),
                    market_pk: market.market.to_string(),
                    event_heap: market.event_heap.to_string(),
                    base_mint: market.base_mint.to_string(),
                    quote_mint: market.quote_mint.to_string(),
                })
                .collect(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("writing config to {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;

        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let config = Config {
            program_id: Pubkey::new_unique().to_string(),
            markets: vec![MarketConfig {
                name: "index 0 wrt 0".to_string(),
                market_pk: Pubkey::new_unique().to_string(),
                event_heap: Pubkey::new_unique().to_string(),
                base_mint: Pubkey::new_unique().to_string(),
                quote_mint: Pubkey::new_unique().to_string(),
            }],
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.program_id, config.program_id);
        assert_eq!(parsed.markets[0].market_pk, config.markets[0].market_pk);
    }
}
