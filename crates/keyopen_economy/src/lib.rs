//! # KEYOPEN Economy
//!
//! Loot case economy: accounts with balances, a catalog of priced cases, a
//! rarity-weighted roll engine and the transactions that tie them together.
//!
//! ## Design Principles
//!
//! 1. **Zero floating point** - All money is integer cents ([`Money`])
//! 2. **O(1) rolls** - Tier pools are pre-computed per case
//! 3. **Transactional** - A rejected purchase or sale changes nothing
//! 4. **Injected randomness** - Seeded in tests, OS-seeded in production
//! 5. **External configuration** - Catalog and starting balance in TOML
//!
//! ## Odds
//!
//! | Tier   | Label                      | Odds   |
//! |--------|----------------------------|--------|
//! | Blue   | `[BLUE] Common`            | 80.00% |
//! | Purple | `[PURPLE] Restricted`      | 15.00% |
//! | Pink   | `[PINK] Classified`        |  3.00% |
//! | Red    | `[RED] Covert`             |  1.50% |
//! | Gold   | `[GOLD] Rare Special Item` |  0.50% |
//!
//! ## Example
//!
//! ```rust
//! use keyopen_economy::{Economy, EconomyConfig};
//!
//! let config = EconomyConfig::builtin()?.with_seed(42);
//! let mut economy = Economy::from_config(config)?;
//!
//! economy.register("alice", "pw1")?;
//! let session = economy.authenticate("alice", "pw1")?;
//!
//! let item = economy.purchase_case(&session, 0)?;
//! assert_eq!(economy.list_inventory(&session)?.len(), 1);
//!
//! let credited = economy.sell_item(&session, 0)?;
//! assert_eq!(credited, item.value());
//! # Ok::<(), keyopen_economy::EconomyError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod account;
pub mod catalog;
pub mod config;
pub mod economy;
pub mod error;
pub mod inventory;
pub mod item;
pub mod money;
pub mod roll;
pub mod shared;

pub use account::{Account, Credential};
pub use catalog::{Case, CaseListing, Catalog, DropPool, PoolSource};
pub use config::{EconomyConfig, DEFAULT_STARTING_BALANCE};
pub use economy::{Economy, EconomyEvent, InventoryLine, Session};
pub use error::{EconomyError, EconomyResult};
pub use inventory::Inventory;
pub use item::{Item, Rarity, TIER_ROLL_MAX};
pub use money::Money;
pub use roll::{RandomSource, Roll, RollEngine, RollStatistics};
pub use shared::SharedEconomy;
