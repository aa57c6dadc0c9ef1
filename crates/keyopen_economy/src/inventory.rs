//! # Inventory System
//!
//! Ordered list of owned items. Insertion order is kept; identical items are
//! distinct entries.
//!
//! Removing an entry shifts every later entry down by one, so any index a
//! caller cached at or after the removed position is stale. Re-fetch the
//! listing after each mutation.

use crate::error::{EconomyError, EconomyResult};
use crate::item::Item;
use crate::money::Money;

/// An account's items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing is held.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Gets the item at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Appends an item at the end.
    pub fn add(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Removes and returns the item at `index`, shifting later items down.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::IndexOutOfRange` if `index >= len()`. The
    /// inventory is untouched in that case.
    pub fn remove_at(&mut self, index: usize) -> EconomyResult<Item> {
        if index >= self.items.len() {
            return Err(EconomyError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Sum of the values of every held item, recomputed on each call.
    #[must_use]
    pub fn total_value(&self) -> Money {
        self.items.iter().map(Item::value).sum()
    }

    /// Read-only ordered view.
    #[inline]
    #[must_use]
    pub fn list(&self) -> &[Item] {
        &self.items
    }

    /// Iterates over held items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
