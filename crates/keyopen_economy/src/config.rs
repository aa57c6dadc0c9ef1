//! # Economy Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! starting_balance = "100.00"
//! seed = 42                      # optional, omit for OS entropy
//!
//! [[cases]]
//! name = "Chroma Case"
//! price = "2.50"
//!
//! [[cases.items]]
//! name = "Glock-18 | Catacombs"
//! rarity = "blue"
//! value = "0.10"
//! ```
//!
//! Money is written as decimal strings so no value passes through a float.

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::catalog::Case;
use crate::error::{EconomyError, EconomyResult};
use crate::money::Money;

/// Balance every new account starts with.
pub const DEFAULT_STARTING_BALANCE: Money = Money::from_whole(100);

/// The stock catalog shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

fn default_starting_balance() -> Money {
    DEFAULT_STARTING_BALANCE
}

/// Startup configuration for an [`Economy`](crate::economy::Economy).
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EconomyConfig {
    /// Balance given to new accounts.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: Money,
    /// Fixed RNG seed. `None` draws a seed from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Cases on sale, in storefront order.
    pub cases: Vec<Case>,
}

impl EconomyConfig {
    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` on malformed TOML, malformed
    /// money strings, unknown rarities, a case without items, or an empty
    /// case list.
    pub fn from_toml_str(source: &str) -> EconomyResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| EconomyError::InvalidConfig(e.to_string()))?;

        if config.cases.is_empty() {
            return Err(EconomyError::InvalidConfig(
                "at least one case is required".to_string(),
            ));
        }

        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> EconomyResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EconomyError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// The bundled catalog: Chroma, Gamma, Prisma and Dreams & Nightmares.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled file itself is broken.
    pub fn builtin() -> EconomyResult<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Overrides the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the random source: seeded if configured, OS entropy otherwise.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::Entropy` if the OS has no entropy to give.
    pub fn rng(&self) -> EconomyResult<ChaCha8Rng> {
        match self.seed {
            Some(seed) => Ok(ChaCha8Rng::seed_from_u64(seed)),
            None => {
                let mut seed = [0u8; 32];
                getrandom::fill(&mut seed).map_err(|e| EconomyError::Entropy(e.to_string()))?;
                Ok(ChaCha8Rng::from_seed(seed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Rarity;

    #[test]
    fn test_builtin_catalog() {
        let config = EconomyConfig::builtin().unwrap();
        assert_eq!(config.starting_balance, Money::from_whole(100));
        assert_eq!(config.seed, None);

        let names: Vec<&str> = config.cases.iter().map(Case::name).collect();
        assert_eq!(
            names,
            ["Chroma Case", "Gamma Case", "Prisma Case", "Dreams & Nightmares"]
        );

        let chroma = &config.cases[0];
        assert_eq!(chroma.price(), Money::from_parts(2, 50));
        assert_eq!(chroma.items().len(), 13);
        assert_eq!(chroma.tier_len(Rarity::Blue), 5);
        assert_eq!(chroma.tier_len(Rarity::Gold), 1);
        assert!(config.cases.iter().all(Case::has_fallback_tier));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = EconomyConfig::from_toml_str(
            r#"
            [[cases]]
            name = "Tiny"
            price = "1"

            [[cases.items]]
            name = "Pebble"
            rarity = "blue"
            value = "0.01"
            "#,
        )
        .unwrap();

        assert_eq!(config.starting_balance, DEFAULT_STARTING_BALANCE);
        assert_eq!(config.cases[0].price(), Money::ONE);
    }

    #[test]
    fn test_empty_case_rejected() {
        let result = EconomyConfig::from_toml_str(
            r#"
            [[cases]]
            name = "Hollow"
            price = "1.00"
            items = []
            "#,
        );
        assert!(matches!(result, Err(EconomyError::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_values_rejected() {
        let bad_money = r#"
            [[cases]]
            name = "Bad"
            price = "-1.00"
            [[cases.items]]
            name = "x"
            rarity = "blue"
            value = "0.10"
        "#;
        let bad_rarity = r#"
            [[cases]]
            name = "Bad"
            price = "1.00"
            [[cases.items]]
            name = "x"
            rarity = "green"
            value = "0.10"
        "#;
        for source in [bad_money, bad_rarity, "seed = 1", "cases = []"] {
            assert!(
                matches!(
                    EconomyConfig::from_toml_str(source),
                    Err(EconomyError::InvalidConfig(_))
                ),
                "{source}"
            );
        }
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        use rand::RngCore;

        let config = EconomyConfig::builtin().unwrap().with_seed(5);
        let mut a = config.rng().unwrap();
        let mut b = config.rng().unwrap();
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_load_missing_file() {
        let result = EconomyConfig::load("/nonexistent/keyopen.toml");
        assert!(matches!(result, Err(EconomyError::InvalidConfig(_))));
    }
}
