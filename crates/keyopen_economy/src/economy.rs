//! # Economy
//!
//! The aggregate that owns every account, the catalog and the random source.
//! It is passed around explicitly; there is no global instance.
//!
//! ## Sessions
//!
//! ```text
//!              authenticate()            logout()
//! LoggedOut ─────────────────> LoggedIn ──────────> LoggedOut
//! ```
//!
//! `authenticate` hands out a [`Session`]. Every account operation takes
//! `&Session`, so calling one without logging in does not compile. `logout`
//! consumes the session.
//!
//! ## The Purchase Pipeline
//!
//! ```text
//! purchase_case() ->
//!   1. Resolve session and case (no mutation)
//!   2. Debit price (rejects with InsufficientFunds, nothing changed)
//!   3. Roll (cannot fail)
//!   4. Append item to inventory
//!   5. Queue CaseOpened event
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::account::Account;
use crate::catalog::{Case, CaseListing, Catalog};
use crate::config::EconomyConfig;
use crate::error::{EconomyError, EconomyResult};
use crate::inventory::Inventory;
use crate::item::Item;
use crate::money::Money;
use crate::roll::{RandomSource, RollEngine};

static NEXT_ECONOMY_ID: AtomicU64 = AtomicU64::new(1);

/// Fresh identity for an economy instance. Sessions carry it so one
/// economy never honours another's logins.
pub(crate) fn next_economy_id() -> u64 {
    NEXT_ECONOMY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Proof of a successful login. Not `Clone`: logging out consumes it.
///
/// Only valid against the economy that issued it.
#[derive(Debug, PartialEq, Eq)]
pub struct Session {
    economy_id: u64,
    username: String,
}

impl Session {
    pub(crate) fn new(economy_id: u64, username: impl Into<String>) -> Self {
        Self {
            economy_id,
            username: username.into(),
        }
    }

    /// True if `economy_id` issued this session.
    pub(crate) const fn issued_by(&self, economy_id: u64) -> bool {
        self.economy_id == economy_id
    }

    /// The logged-in username.
    #[inline]
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// One inventory line as the UI shows it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InventoryLine {
    /// Position to pass to `sell_item`. Valid until the next mutation.
    pub index: usize,
    /// `[TAG] Name ($value)`.
    pub display: String,
    /// Liquidation value.
    pub value: Money,
}

/// Renders an inventory as display lines, in order.
pub(crate) fn inventory_lines(inventory: &Inventory) -> Vec<InventoryLine> {
    inventory
        .list()
        .iter()
        .enumerate()
        .map(|(index, item)| InventoryLine {
            index,
            display: item.to_string(),
            value: item.value(),
        })
        .collect()
}

/// Something that happened in the economy, for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EconomyEvent {
    /// A new account exists.
    AccountRegistered {
        /// The new username.
        username: String,
    },
    /// A case was bought and opened.
    CaseOpened {
        /// Buyer.
        username: String,
        /// Catalog position of the case (for the spin animation's item pool).
        case_index: usize,
        /// Case name.
        case_name: String,
        /// Price paid.
        price: Money,
        /// The winning item.
        item: Item,
    },
    /// An item was liquidated.
    ItemSold {
        /// Seller.
        username: String,
        /// The item that left the inventory.
        item: Item,
        /// Amount credited (the item's value).
        credited: Money,
    },
    /// Funds were added.
    AccountFunded {
        /// Funded account.
        username: String,
        /// Amount added.
        amount: Money,
        /// Balance afterwards.
        balance: Money,
    },
}

/// Accounts, catalog and randomness for one process.
pub struct Economy<R = ChaCha8Rng> {
    id: u64,
    accounts: HashMap<String, Account>,
    catalog: Catalog,
    engine: RollEngine,
    rng: R,
    starting_balance: Money,
    events: Vec<EconomyEvent>,
}

impl Economy<ChaCha8Rng> {
    /// Builds an economy from configuration.
    ///
    /// Uses the configured seed, or OS entropy when none is set.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::Entropy` if no seed is configured and the OS
    /// cannot provide one.
    pub fn from_config(config: EconomyConfig) -> EconomyResult<Self> {
        let rng = config.rng()?;
        Ok(Self::new(
            Catalog::new(config.cases),
            config.starting_balance,
            rng,
        ))
    }

    /// Builds a reproducible economy.
    #[must_use]
    pub fn seeded(catalog: Catalog, starting_balance: Money, seed: u64) -> Self {
        Self::new(catalog, starting_balance, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RandomSource> Economy<R> {
    /// Creates an economy with no accounts.
    #[must_use]
    pub fn new(catalog: Catalog, starting_balance: Money, rng: R) -> Self {
        Self {
            id: next_economy_id(),
            accounts: HashMap::new(),
            catalog,
            engine: RollEngine::new(),
            rng,
            starting_balance,
            events: Vec::new(),
        }
    }

    /// Balance given to every new account.
    #[inline]
    #[must_use]
    pub const fn starting_balance(&self) -> Money {
        self.starting_balance
    }

    /// Number of registered accounts.
    #[inline]
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// The catalog on sale.
    #[inline]
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ========================================================================
    // Registration & Login
    // ========================================================================

    /// Creates an account with the starting balance and an empty inventory.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::DuplicateUser` if the username is taken.
    pub fn register(&mut self, username: &str, password: &str) -> EconomyResult<&Account> {
        if self.accounts.contains_key(username) {
            warn!(username, "registration rejected: username taken");
            return Err(EconomyError::DuplicateUser {
                username: username.to_owned(),
            });
        }

        info!(username, balance = %self.starting_balance, "account registered");
        self.events.push(EconomyEvent::AccountRegistered {
            username: username.to_owned(),
        });

        let account = Account::new(username, password, self.starting_balance);
        Ok(self.accounts.entry(username.to_owned()).or_insert(account))
    }

    /// Logs in.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidCredentials` for an unknown username or
    /// a wrong password, without saying which.
    pub fn authenticate(&self, username: &str, password: &str) -> EconomyResult<Session> {
        match self.accounts.get(username) {
            Some(account) if account.check_password(password) => {
                info!(username, "logged in");
                Ok(Session::new(self.id, username))
            }
            _ => {
                warn!(username, "login rejected");
                Err(EconomyError::InvalidCredentials)
            }
        }
    }

    /// Logs out, consuming the session.
    #[allow(clippy::needless_pass_by_value)]
    pub fn logout(&self, session: Session) {
        info!(username = session.username(), "logged out");
    }

    /// The account behind a session.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::NotLoggedIn` if the session was not issued by
    /// this economy.
    pub fn account(&self, session: &Session) -> EconomyResult<&Account> {
        self.check_session(session)?;
        self.accounts
            .get(session.username())
            .ok_or(EconomyError::NotLoggedIn)
    }

    fn check_session(&self, session: &Session) -> EconomyResult<()> {
        if session.issued_by(self.id) {
            Ok(())
        } else {
            Err(EconomyError::NotLoggedIn)
        }
    }

    /// Current balance.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::NotLoggedIn` for a foreign session.
    pub fn balance(&self, session: &Session) -> EconomyResult<Money> {
        self.account(session).map(Account::balance)
    }

    /// Total value of everything the account holds.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::NotLoggedIn` for a foreign session.
    pub fn inventory_value(&self, session: &Session) -> EconomyResult<Money> {
        self.account(session).map(|a| a.inventory().total_value())
    }

    // ========================================================================
    // Storefront
    // ========================================================================

    /// Cases on sale, in order.
    #[must_use]
    pub fn list_catalog(&self) -> Vec<CaseListing<'_>> {
        self.catalog.listing()
    }

    /// A case by catalog position (the spin animation needs its items).
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::IndexOutOfRange` for an unknown position.
    pub fn case(&self, index: usize) -> EconomyResult<&Case> {
        self.catalog.get(index)
    }

    /// Buys and opens the case at `case_index`.
    ///
    /// On success the price has been debited and the returned item appended
    /// to the inventory. On error nothing changed.
    ///
    /// # Errors
    ///
    /// - `EconomyError::NotLoggedIn` for a foreign session.
    /// - `EconomyError::IndexOutOfRange` for an unknown case.
    /// - `EconomyError::InsufficientFunds` if the price exceeds the balance.
    pub fn purchase_case(&mut self, session: &Session, case_index: usize) -> EconomyResult<Item> {
        self.check_session(session)?;
        let account = self
            .accounts
            .get_mut(session.username())
            .ok_or(EconomyError::NotLoggedIn)?;
        let case = self.catalog.get(case_index)?;

        let item = match account.open_case(case, &self.engine, &mut self.rng) {
            Ok(item) => item,
            Err(err) => {
                warn!(username = account.username(), case = case.name(), %err, "purchase rejected");
                return Err(err);
            }
        };

        info!(
            username = account.username(),
            case = case.name(),
            price = %case.price(),
            rarity = ?item.rarity(),
            item = item.name(),
            balance = %account.balance(),
            "case opened"
        );
        self.events.push(EconomyEvent::CaseOpened {
            username: account.username().to_owned(),
            case_index,
            case_name: case.name().to_owned(),
            price: case.price(),
            item: item.clone(),
        });

        Ok(item)
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    /// The account's items as display lines, in order.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::NotLoggedIn` for a foreign session.
    pub fn list_inventory(&self, session: &Session) -> EconomyResult<Vec<InventoryLine>> {
        self.account(session).map(|a| inventory_lines(a.inventory()))
    }

    /// Sells the item at `index` and returns the credited amount.
    ///
    /// Later items shift down by one; re-list before selling again.
    ///
    /// # Errors
    ///
    /// - `EconomyError::NotLoggedIn` for a foreign session.
    /// - `EconomyError::IndexOutOfRange` if there is no item at `index`.
    /// - `EconomyError::ArithmeticOverflow` if the balance cannot absorb the value.
    pub fn sell_item(&mut self, session: &Session, index: usize) -> EconomyResult<Money> {
        self.check_session(session)?;
        let account = self
            .accounts
            .get_mut(session.username())
            .ok_or(EconomyError::NotLoggedIn)?;

        let item = match account.sell(index) {
            Ok(item) => item,
            Err(err) => {
                warn!(username = account.username(), index, %err, "sale rejected");
                return Err(err);
            }
        };

        let credited = item.value();
        info!(
            username = account.username(),
            item = item.name(),
            credited = %credited,
            balance = %account.balance(),
            "item sold"
        );
        self.events.push(EconomyEvent::ItemSold {
            username: account.username().to_owned(),
            item,
            credited,
        });

        Ok(credited)
    }

    // ========================================================================
    // Funding
    // ========================================================================

    /// Adds funds. No payment is verified. Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `EconomyError::NotLoggedIn` for a foreign session.
    /// - `EconomyError::InvalidAmount` if `amount` is zero.
    /// - `EconomyError::ArithmeticOverflow` if the balance would overflow.
    pub fn fund_account(&mut self, session: &Session, amount: Money) -> EconomyResult<Money> {
        self.check_session(session)?;
        let account = self
            .accounts
            .get_mut(session.username())
            .ok_or(EconomyError::NotLoggedIn)?;

        let balance = match account.credit(amount) {
            Ok(balance) => balance,
            Err(err) => {
                warn!(username = account.username(), amount = %amount, %err, "funding rejected");
                return Err(err);
            }
        };

        info!(username = account.username(), amount = %amount, balance = %balance, "account funded");
        self.events.push(EconomyEvent::AccountFunded {
            username: account.username().to_owned(),
            amount,
            balance,
        });

        Ok(balance)
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Takes every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<EconomyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of queued events.
    #[must_use]
    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }
}
