//! # Roll Engine
//!
//! **Two-stage weighted draw, O(1) per roll**
//!
//! ## Stage 1: tier
//!
//! A uniform integer in `1..=10000` is mapped through cumulative thresholds:
//!
//! ```text
//!     1 ..= 8000  Blue    80.00%
//!  8001 ..= 9500  Purple  15.00%
//!  9501 ..= 9800  Pink     3.00%
//!  9801 ..= 9950  Red      1.50%
//!  9951 ..=10000  Gold     0.50%
//! ```
//!
//! ## Stage 2: item
//!
//! The case's pre-computed pool for that tier is used, falling back to Blue
//! and then to every item when a tier is empty (see [`Case::drop_pool`]).
//! One candidate is picked uniformly.
//!
//! The engine holds no state. Given the same case and the same random draws
//! it produces the same item, which is what makes seeded tests reproducible.

use std::collections::HashMap;

use rand::{Rng, RngCore};
use tracing::debug;

use crate::catalog::{Case, PoolSource};
use crate::item::{Item, Rarity, TIER_ROLL_MAX};
use crate::money::Money;

/// Source of the two uniform draws a roll needs.
///
/// Implemented for every [`RngCore`], so a seeded `ChaCha8Rng` plugs in
/// directly. Tests may implement it by hand to script exact draws.
pub trait RandomSource {
    /// Uniform integer in `1..=TIER_ROLL_MAX`.
    fn tier_roll(&mut self) -> u16;

    /// Uniform integer in `0..len`. Called only with `len > 0`.
    fn pick(&mut self, len: usize) -> usize;
}

impl<R: RngCore> RandomSource for R {
    #[inline]
    fn tier_roll(&mut self) -> u16 {
        self.gen_range(1..=TIER_ROLL_MAX)
    }

    #[inline]
    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Full record of one roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roll<'c> {
    /// Raw stage-1 draw.
    pub tier_roll: u16,
    /// Tier the draw mapped to.
    pub rarity: Rarity,
    /// How the candidate pool was resolved.
    pub pool: PoolSource,
    /// The winning item, borrowed from the case.
    pub item: &'c Item,
}

/// The roll engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct RollEngine;

impl RollEngine {
    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Rolls one item from `case`.
    ///
    /// Always returns an item that belongs to `case`.
    pub fn roll<'c, S: RandomSource + ?Sized>(&self, case: &'c Case, source: &mut S) -> &'c Item {
        self.roll_detailed(case, source).item
    }

    /// Rolls one item and reports how it was chosen.
    pub fn roll_detailed<'c, S: RandomSource + ?Sized>(
        &self,
        case: &'c Case,
        source: &mut S,
    ) -> Roll<'c> {
        let tier_roll = source.tier_roll();
        let rarity = Rarity::from_roll(tier_roll);

        let pool = case.drop_pool(rarity);
        if pool.source() != PoolSource::Tier(rarity) {
            debug!(case = case.name(), tier_roll, ?rarity, fallback = ?pool.source(), "tier empty, using fallback pool");
        }

        let position = source.pick(pool.len());
        let item = pool.item(position);

        Roll {
            tier_roll,
            rarity,
            pool: pool.source(),
            item,
        }
    }

    /// Runs `iterations` rolls and aggregates the results.
    pub fn simulate<S: RandomSource + ?Sized>(
        &self,
        case: &Case,
        source: &mut S,
        iterations: u64,
    ) -> RollStatistics {
        let mut stats = RollStatistics::new();

        for _ in 0..iterations {
            let roll = self.roll_detailed(case, source);

            stats.total_rolls += 1;
            stats.tier_counts[roll.rarity.index()] += 1;
            stats.drop_counts[roll.item.rarity().index()] += 1;
            if roll.pool != PoolSource::Tier(roll.rarity) {
                stats.fallbacks += 1;
            }
            stats.total_value = stats.total_value.saturating_add(roll.item.value());
            *stats.item_counts.entry(roll.item.name().to_owned()).or_insert(0) += 1;
        }

        stats
    }
}

/// Statistics from roll simulation.
#[derive(Clone, Debug, Default)]
pub struct RollStatistics {
    /// Total number of rolls performed.
    pub total_rolls: u64,
    /// Stage-1 tier counts, indexed by `Rarity::index`.
    pub tier_counts: [u64; Rarity::COUNT],
    /// Counts by rarity of the item actually dropped (differs from
    /// `tier_counts` when fallbacks happen).
    pub drop_counts: [u64; Rarity::COUNT],
    /// Rolls resolved through a fallback pool.
    pub fallbacks: u64,
    /// Drop counts by item name.
    pub item_counts: HashMap<String, u64>,
    /// Sum of the values of every dropped item.
    pub total_value: Money,
}

impl RollStatistics {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of rolls whose stage-1 draw landed on `rarity`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tier_frequency(&self, rarity: Rarity) -> f64 {
        if self.total_rolls == 0 {
            0.0
        } else {
            self.tier_counts[rarity.index()] as f64 / self.total_rolls as f64
        }
    }

    /// Average value of a drop.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_value(&self) -> f64 {
        if self.total_rolls == 0 {
            0.0
        } else {
            self.total_value.as_f64() / self.total_rolls as f64
        }
    }
}
