//! # Cases and the Catalog
//!
//! A [`Case`] is a named, priced list of possible drops. Tier membership is
//! pre-computed when the case is built so a roll never scans or allocates:
//!
//! ```text
//! items:  [ B0 B1 P0 K0 R0 G0 ]        B=Blue P=Purple K=Pink R=Red G=Gold
//! tiers:  Blue   -> [0, 1]
//!         Purple -> [2]
//!         Pink   -> [3]
//!         Red    -> [4]
//!         Gold   -> [5]
//! all:    [0, 1, 2, 3, 4, 5]
//! ```
//!
//! Cases are configured once at startup and are read-only afterwards. The
//! [`Catalog`] is the ordered list the storefront shows.

use serde::Deserialize;
use tracing::warn;

use crate::error::{EconomyError, EconomyResult};
use crate::item::{Item, Rarity};
use crate::money::Money;

/// How a drop pool was resolved from the requested tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolSource {
    /// The case has items of the requested tier.
    Tier(Rarity),
    /// Requested tier is empty; Blue items are used instead.
    BlueFallback,
    /// Requested tier and Blue are both empty; every item is a candidate.
    AllItems,
}

/// The candidates a roll picks from, after the fallback chain.
#[derive(Clone, Copy, Debug)]
pub struct DropPool<'a> {
    items: &'a [Item],
    indices: &'a [usize],
    source: PoolSource,
}

impl<'a> DropPool<'a> {
    /// Number of candidates. Never zero for a pool taken from a [`Case`].
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Always false for pools built from a valid [`Case`].
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// How the pool was resolved.
    #[inline]
    #[must_use]
    pub const fn source(&self) -> PoolSource {
        self.source
    }

    /// Candidate at `position` within the pool.
    ///
    /// # Panics
    ///
    /// Panics if `position >= self.len()`.
    #[inline]
    #[must_use]
    pub fn item(&self, position: usize) -> &'a Item {
        let items = self.items;
        &items[self.indices[position]]
    }

    /// Iterates over the candidates in case order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Item> + 'a {
        let (items, indices) = (self.items, self.indices);
        indices.iter().map(move |&i| &items[i])
    }
}

/// Raw case layout as it appears in configuration.
#[derive(Deserialize)]
struct CaseDef {
    name: String,
    price: Money,
    items: Vec<Item>,
}

/// A purchasable container of possible drops.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "CaseDef")]
pub struct Case {
    name: String,
    price: Money,
    items: Vec<Item>,
    /// Item indices per tier, in `Rarity::ALL` order.
    tiers: [Vec<usize>; Rarity::COUNT],
    /// `0..items.len()`, the last-resort pool.
    all: Vec<usize>,
}

impl Case {
    /// Creates a case and pre-computes its tier pools.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` if `items` is empty: no roll can
    /// be produced from an empty case.
    pub fn new(name: impl Into<String>, price: Money, items: Vec<Item>) -> EconomyResult<Self> {
        let name = name.into();
        if items.is_empty() {
            return Err(EconomyError::InvalidConfig(format!(
                "case {name:?} has no items"
            )));
        }

        let mut tiers: [Vec<usize>; Rarity::COUNT] = Default::default();
        for (index, item) in items.iter().enumerate() {
            tiers[item.rarity().index()].push(index);
        }

        Ok(Self {
            all: (0..items.len()).collect(),
            name,
            price,
            items,
            tiers,
        })
    }

    /// Case name, e.g. `Chroma Case`.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Purchase price.
    #[inline]
    #[must_use]
    pub const fn price(&self) -> Money {
        self.price
    }

    /// Every possible drop, in configuration order.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items of a given tier.
    #[inline]
    #[must_use]
    pub fn tier_len(&self, rarity: Rarity) -> usize {
        self.tiers[rarity.index()].len()
    }

    /// True if the case has at least one Blue item, i.e. the fallback tier is populated.
    #[inline]
    #[must_use]
    pub fn has_fallback_tier(&self) -> bool {
        !self.tiers[Rarity::Blue.index()].is_empty()
    }

    /// Resolves the candidate pool for a rolled tier.
    ///
    /// Chosen tier if populated, otherwise Blue, otherwise every item.
    #[must_use]
    pub fn drop_pool(&self, rarity: Rarity) -> DropPool<'_> {
        let (indices, source) = if !self.tiers[rarity.index()].is_empty() {
            (&self.tiers[rarity.index()], PoolSource::Tier(rarity))
        } else if self.has_fallback_tier() {
            (&self.tiers[Rarity::Blue.index()], PoolSource::BlueFallback)
        } else {
            (&self.all, PoolSource::AllItems)
        };

        DropPool {
            items: &self.items,
            indices,
            source,
        }
    }
}

impl TryFrom<CaseDef> for Case {
    type Error = EconomyError;

    fn try_from(def: CaseDef) -> Result<Self, Self::Error> {
        Self::new(def.name, def.price, def.items)
    }
}

/// One storefront line: what the menu shows for a case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaseListing<'a> {
    /// Position in the catalog, used to purchase.
    pub index: usize,
    /// Case name.
    pub name: &'a str,
    /// Purchase price.
    pub price: Money,
}

/// Ordered, read-only list of cases on sale.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    cases: Vec<Case>,
}

impl Catalog {
    /// Builds a catalog. Cases missing the Blue fallback tier are accepted
    /// but logged, since their odds differ from the advertised table.
    #[must_use]
    pub fn new(cases: Vec<Case>) -> Self {
        for case in &cases {
            if !case.has_fallback_tier() {
                warn!(case = case.name(), "case has no blue items, empty tiers fall back to all items");
            }
        }
        Self { cases }
    }

    /// Number of cases.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// True if nothing is on sale.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Gets a case by catalog position.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::IndexOutOfRange` for an unknown position.
    pub fn get(&self, index: usize) -> EconomyResult<&Case> {
        self.cases.get(index).ok_or(EconomyError::IndexOutOfRange {
            index,
            len: self.cases.len(),
        })
    }

    /// Finds a case by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(usize, &Case)> {
        self.cases.iter().enumerate().find(|(_, c)| c.name() == name)
    }

    /// Iterates over cases in storefront order.
    pub fn iter(&self) -> std::slice::Iter<'_, Case> {
        self.cases.iter()
    }

    /// Storefront view: `(index, name, price)` per case, in order.
    #[must_use]
    pub fn listing(&self) -> Vec<CaseListing<'_>> {
        self.cases
            .iter()
            .enumerate()
            .map(|(index, case)| CaseListing {
                index,
                name: case.name(),
                price: case.price(),
            })
            .collect()
    }
}
