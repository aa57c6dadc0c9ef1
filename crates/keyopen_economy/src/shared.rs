//! # Shared Economy
//!
//! Thread-safe variant of [`Economy`](crate::economy::Economy) for hosts that
//! serve several players at once.
//!
//! ## Locking
//!
//! ```text
//! accounts: RwLock<HashMap<username, Arc<Mutex<Account>>>>
//!              │                          │
//!              │ read: look up handle     │ lock: whole transaction
//!              │ write: register only     │ (check -> debit -> roll -> add)
//!              ▼                          ▼
//!        short, shared              per account, exclusive
//! ```
//!
//! The map lock is held only long enough to clone an account handle, so
//! operations on different accounts never wait on each other. Two operations
//! on the same account are serialized by that account's mutex, which makes
//! the balance check and the debit one step.
//!
//! Randomness is supplied by the caller, typically one seeded generator per
//! worker thread.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::account::Account;
use crate::catalog::{CaseListing, Catalog};
use crate::economy::{inventory_lines, next_economy_id, EconomyEvent, InventoryLine, Session};
use crate::error::{EconomyError, EconomyResult};
use crate::item::Item;
use crate::money::Money;
use crate::roll::{RandomSource, RollEngine};

type AccountHandle = Arc<Mutex<Account>>;

/// Accounts behind per-account locks, shareable across threads.
pub struct SharedEconomy {
    id: u64,
    catalog: Catalog,
    engine: RollEngine,
    starting_balance: Money,
    accounts: RwLock<HashMap<String, AccountHandle>>,
    events: Mutex<Vec<EconomyEvent>>,
}

impl SharedEconomy {
    /// Creates an economy with no accounts.
    #[must_use]
    pub fn new(catalog: Catalog, starting_balance: Money) -> Self {
        Self {
            id: next_economy_id(),
            catalog,
            engine: RollEngine::new(),
            starting_balance,
            accounts: RwLock::new(HashMap::new()),
            events: Mutex::new(Vec::with_capacity(256)),
        }
    }

    /// The catalog on sale.
    #[inline]
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Cases on sale, in order.
    #[must_use]
    pub fn list_catalog(&self) -> Vec<CaseListing<'_>> {
        self.catalog.listing()
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    /// Creates an account with the starting balance.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::DuplicateUser` if the username is taken.
    pub fn register(&self, username: &str, password: &str) -> EconomyResult<()> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(username) {
            warn!(username, "registration rejected: username taken");
            return Err(EconomyError::DuplicateUser {
                username: username.to_owned(),
            });
        }

        let account = Account::new(username, password, self.starting_balance);
        accounts.insert(username.to_owned(), Arc::new(Mutex::new(account)));

        info!(username, balance = %self.starting_balance, "account registered");
        // Queued under the map lock: no login, and so no later event for
        // this account, can get ahead of it.
        self.events.lock().push(EconomyEvent::AccountRegistered {
            username: username.to_owned(),
        });
        drop(accounts);
        Ok(())
    }

    /// Logs in.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidCredentials` for an unknown username or
    /// a wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> EconomyResult<Session> {
        let handle = self.accounts.read().get(username).cloned();
        match handle {
            Some(account) if account.lock().check_password(password) => {
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

    fn handle(&self, session: &Session) -> EconomyResult<AccountHandle> {
        if !session.issued_by(self.id) {
            return Err(EconomyError::NotLoggedIn);
        }
        self.accounts
            .read()
            .get(session.username())
            .cloned()
            .ok_or(EconomyError::NotLoggedIn)
    }

    /// Current balance.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::NotLoggedIn` for a foreign session.
    pub fn balance(&self, session: &Session) -> EconomyResult<Money> {
        Ok(self.handle(session)?.lock().balance())
    }

    /// A consistent copy of the account, taken under its lock.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::NotLoggedIn` for a foreign session.
    pub fn snapshot(&self, session: &Session) -> EconomyResult<Account> {
        Ok(self.handle(session)?.lock().clone())
    }

    /// Buys and opens the case at `case_index`, drawing from `source`.
    ///
    /// # Errors
    ///
    /// - `EconomyError::NotLoggedIn` for a foreign session.
    /// - `EconomyError::IndexOutOfRange` for an unknown case.
    /// - `EconomyError::InsufficientFunds` if the price exceeds the balance.
    pub fn purchase_case<S: RandomSource + ?Sized>(
        &self,
        session: &Session,
        case_index: usize,
        source: &mut S,
    ) -> EconomyResult<Item> {
        let handle = self.handle(session)?;
        let case = self.catalog.get(case_index)?;

        let mut account = handle.lock();
        let item = match account.open_case(case, &self.engine, source) {
            Ok(item) => item,
            Err(err) => {
                warn!(username = session.username(), case = case.name(), %err, "purchase rejected");
                return Err(err);
            }
        };

        info!(
            username = session.username(),
            case = case.name(),
            rarity = ?item.rarity(),
            item = item.name(),
            balance = %account.balance(),
            "case opened"
        );
        // Queued before the account unlocks so per-account event order matches.
        self.events.lock().push(EconomyEvent::CaseOpened {
            username: session.username().to_owned(),
            case_index,
            case_name: case.name().to_owned(),
            price: case.price(),
            item: item.clone(),
        });

        Ok(item)
    }

    /// The account's items as display lines, in order.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::NotLoggedIn` for a foreign session.
    pub fn list_inventory(&self, session: &Session) -> EconomyResult<Vec<InventoryLine>> {
        Ok(inventory_lines(self.handle(session)?.lock().inventory()))
    }

    /// Sells the item at `index` and returns the credited amount.
    ///
    /// # Errors
    ///
    /// - `EconomyError::NotLoggedIn` for a foreign session.
    /// - `EconomyError::IndexOutOfRange` if there is no item at `index`.
    /// - `EconomyError::ArithmeticOverflow` if the balance cannot absorb the value.
    pub fn sell_item(&self, session: &Session, index: usize) -> EconomyResult<Money> {
        let handle = self.handle(session)?;
        let mut account = handle.lock();

        let item = match account.sell(index) {
            Ok(item) => item,
            Err(err) => {
                warn!(username = session.username(), index, %err, "sale rejected");
                return Err(err);
            }
        };

        let credited = item.value();
        info!(
            username = session.username(),
            item = item.name(),
            credited = %credited,
            balance = %account.balance(),
            "item sold"
        );
        self.events.lock().push(EconomyEvent::ItemSold {
            username: session.username().to_owned(),
            item,
            credited,
        });

        Ok(credited)
    }

    /// Adds funds and returns the new balance.
    ///
    /// # Errors
    ///
    /// - `EconomyError::NotLoggedIn` for a foreign session.
    /// - `EconomyError::InvalidAmount` if `amount` is zero.
    /// - `EconomyError::ArithmeticOverflow` if the balance would overflow.
    pub fn fund_account(&self, session: &Session, amount: Money) -> EconomyResult<Money> {
        let handle = self.handle(session)?;
        let mut account = handle.lock();

        let balance = match account.credit(amount) {
            Ok(balance) => balance,
            Err(err) => {
                warn!(username = session.username(), amount = %amount, %err, "funding rejected");
                return Err(err);
            }
        };

        info!(username = session.username(), amount = %amount, balance = %balance, "account funded");
        self.events.lock().push(EconomyEvent::AccountFunded {
            username: session.username().to_owned(),
            amount,
            balance,
        });

        Ok(balance)
    }

    /// Takes every event queued since the last drain.
    pub fn drain_events(&self) -> Vec<EconomyEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of queued events.
    #[must_use]
    pub fn pending_event_count(&self) -> usize {
        self.events.lock().len()
    }
}

// Thread safety:
// - parking_lot::RwLock for the account map (writes only on register)
// - parking_lot::Mutex per account and for the event buffer
