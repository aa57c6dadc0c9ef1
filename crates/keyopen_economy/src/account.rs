//! # Accounts
//!
//! An [`Account`] owns a balance and an inventory. The balance can never go
//! negative: every debit is checked before anything is touched.
//!
//! The two compound transactions live here so that the single-threaded
//! [`Economy`](crate::economy::Economy) and the locked
//! [`SharedEconomy`](crate::shared::SharedEconomy) run the exact same steps:
//!
//! ```text
//! open_case:  check price -> debit -> roll -> append item
//! sell:       check index -> check credit fits -> remove item -> credit
//! ```
//!
//! Every check that can fail runs before the first mutation, so a rejected
//! call leaves the account as it was.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::catalog::Case;
use crate::error::{EconomyError, EconomyResult};
use crate::inventory::Inventory;
use crate::item::Item;
use crate::money::Money;
use crate::roll::{RandomSource, RollEngine};

/// Stored password credential: a SHA-256 digest compared by equality.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential([u8; 32]);

impl Credential {
    /// Derives the credential for a password.
    #[must_use]
    pub fn from_password(password: &str) -> Self {
        let digest = Sha256::digest(password.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// True if `password` produces this credential.
    #[must_use]
    pub fn matches(&self, password: &str) -> bool {
        *self == Self::from_password(password)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// A registered user: identity, balance and items.
#[derive(Clone, Debug)]
pub struct Account {
    username: String,
    credential: Credential,
    balance: Money,
    inventory: Inventory,
}

impl Account {
    /// Creates an account with an empty inventory.
    #[must_use]
    pub fn new(username: impl Into<String>, password: &str, balance: Money) -> Self {
        Self {
            username: username.into(),
            credential: Credential::from_password(password),
            balance,
            inventory: Inventory::new(),
        }
    }

    /// Login name.
    #[inline]
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Current balance.
    #[inline]
    #[must_use]
    pub const fn balance(&self) -> Money {
        self.balance
    }

    /// Owned items.
    #[inline]
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// True if `password` is this account's password.
    #[must_use]
    pub fn check_password(&self, password: &str) -> bool {
        self.credential.matches(password)
    }

    /// Adds `amount` to the balance.
    ///
    /// # Errors
    ///
    /// - `EconomyError::InvalidAmount` if `amount` is zero.
    /// - `EconomyError::ArithmeticOverflow` if the balance would overflow.
    pub fn credit(&mut self, amount: Money) -> EconomyResult<Money> {
        if amount.is_zero() {
            return Err(EconomyError::InvalidAmount(
                "credit must be greater than zero".to_string(),
            ));
        }
        self.balance = self.balance.safe_add(amount)?;
        Ok(self.balance)
    }

    /// Removes `amount` from the balance. All or nothing.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InsufficientFunds` if the balance is lower than
    /// `amount`; the balance is unchanged.
    pub fn debit(&mut self, amount: Money) -> EconomyResult<Money> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(EconomyError::InsufficientFunds {
                required: amount,
                available: self.balance,
            })?;
        Ok(self.balance)
    }

    /// Buys and opens `case`: debit the price, roll, keep the item.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InsufficientFunds` if the price is not covered.
    /// Nothing is rolled and nothing changes in that case.
    pub fn open_case<S: RandomSource + ?Sized>(
        &mut self,
        case: &Case,
        engine: &RollEngine,
        source: &mut S,
    ) -> EconomyResult<Item> {
        self.debit(case.price())?;

        let won = engine.roll(case, source).clone();
        self.inventory.add(won.clone());

        Ok(won)
    }

    /// Sells the item at `index` for its value.
    ///
    /// Returns the sold item; the credited amount is its value.
    ///
    /// # Errors
    ///
    /// - `EconomyError::IndexOutOfRange` if there is no item at `index`.
    /// - `EconomyError::ArithmeticOverflow` if the balance cannot absorb the value.
    ///
    /// Both are detected before the item is removed.
    pub fn sell(&mut self, index: usize) -> EconomyResult<Item> {
        let value = self
            .inventory
            .get(index)
            .map(Item::value)
            .ok_or(EconomyError::IndexOutOfRange {
                index,
                len: self.inventory.len(),
            })?;
        let new_balance = self.balance.safe_add(value)?;

        let item = self.inventory.remove_at(index)?;
        self.balance = new_balance;

        Ok(item)
    }
}
