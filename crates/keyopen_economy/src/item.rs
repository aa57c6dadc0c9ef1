//! # Items and Rarity Tiers
//!
//! An [`Item`] is an immutable description of a possible drop. Its
//! [`Rarity`] decides how likely the roll engine is to land on its tier.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Upper bound (inclusive) of the tier roll. Tier rolls are drawn from `1..=TIER_ROLL_MAX`.
pub const TIER_ROLL_MAX: u16 = 10_000;

/// Rarity tier, ordered by ascending scarcity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Rarity {
    /// Blue - 80% of rolls. Also the fallback tier.
    Blue = 0,
    /// Purple - 15% of rolls
    Purple = 1,
    /// Pink - 3% of rolls
    Pink = 2,
    /// Red - 1.5% of rolls
    Red = 3,
    /// Gold - 0.5% of rolls
    Gold = 4,
}

impl Rarity {
    /// Every tier, from most common to scarcest.
    pub const ALL: [Self; 5] = [Self::Blue, Self::Purple, Self::Pink, Self::Red, Self::Gold];

    /// Number of tiers.
    pub const COUNT: usize = Self::ALL.len();

    /// Drop weight in basis points (10000 = 100%).
    #[inline]
    #[must_use]
    pub const fn weight_bp(self) -> u16 {
        match self {
            Self::Blue => 8000,
            Self::Purple => 1500,
            Self::Pink => 300,
            Self::Red => 150,
            Self::Gold => 50,
        }
    }

    /// Inclusive upper bound of this tier on the cumulative roll scale.
    #[inline]
    #[must_use]
    pub const fn cumulative_bound(self) -> u16 {
        match self {
            Self::Blue => 8000,
            Self::Purple => 9500,
            Self::Pink => 9800,
            Self::Red => 9950,
            Self::Gold => TIER_ROLL_MAX,
        }
    }

    /// Maps a tier roll in `1..=10000` to its tier.
    ///
    /// Rolls above the scale (which a conforming source never produces) are
    /// treated as Gold.
    #[inline]
    #[must_use]
    pub const fn from_roll(roll: u16) -> Self {
        if roll <= Self::Blue.cumulative_bound() {
            Self::Blue
        } else if roll <= Self::Purple.cumulative_bound() {
            Self::Purple
        } else if roll <= Self::Pink.cumulative_bound() {
            Self::Pink
        } else if roll <= Self::Red.cumulative_bound() {
            Self::Red
        } else {
            Self::Gold
        }
    }

    /// Position of this tier in [`Rarity::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Probability of this tier as a fraction of 1.
    #[inline]
    #[must_use]
    pub fn probability(self) -> f64 {
        f64::from(self.weight_bp()) / f64::from(TIER_ROLL_MAX)
    }

    /// Display tag, e.g. `[GOLD] Rare Special Item`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blue => "[BLUE] Common",
            Self::Purple => "[PURPLE] Restricted",
            Self::Pink => "[PINK] Classified",
            Self::Red => "[RED] Covert",
            Self::Gold => "[GOLD] Rare Special Item",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A possible drop. Immutable after construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    name: String,
    rarity: Rarity,
    value: Money,
}

impl Item {
    /// Creates a new item.
    #[must_use]
    pub fn new(name: impl Into<String>, rarity: Rarity, value: Money) -> Self {
        Self {
            name: name.into(),
            rarity,
            value,
        }
    }

    /// Item name, e.g. `AWP | Man-o'-war`.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rarity tier.
    #[inline]
    #[must_use]
    pub const fn rarity(&self) -> Rarity {
        self.rarity
    }

    /// Liquidation value.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> Money {
        self.value
    }
}

/// `[RED] Covert AWP | Man-o'-war ($35.00)`
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (${})", self.rarity, self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(Rarity::from_roll(1), Rarity::Blue);
        assert_eq!(Rarity::from_roll(8000), Rarity::Blue);
        assert_eq!(Rarity::from_roll(8001), Rarity::Purple);
        assert_eq!(Rarity::from_roll(9500), Rarity::Purple);
        assert_eq!(Rarity::from_roll(9501), Rarity::Pink);
        assert_eq!(Rarity::from_roll(9800), Rarity::Pink);
        assert_eq!(Rarity::from_roll(9801), Rarity::Red);
        assert_eq!(Rarity::from_roll(9950), Rarity::Red);
        assert_eq!(Rarity::from_roll(9951), Rarity::Gold);
        assert_eq!(Rarity::from_roll(TIER_ROLL_MAX), Rarity::Gold);
    }

    #[test]
    fn test_weights_match_thresholds() {
        let mut cumulative = 0u16;
        for rarity in Rarity::ALL {
            cumulative += rarity.weight_bp();
            assert_eq!(cumulative, rarity.cumulative_bound(), "{rarity:?}");
        }
        assert_eq!(cumulative, TIER_ROLL_MAX);
    }

    #[test]
    fn test_scarcity_order() {
        assert!(Rarity::Blue < Rarity::Purple);
        assert!(Rarity::Red < Rarity::Gold);
        for (i, rarity) in Rarity::ALL.iter().enumerate() {
            assert_eq!(rarity.index(), i);
        }
    }

    #[test]
    fn test_display() {
        let item = Item::new("Karambit | Doppler", Rarity::Gold, Money::from_whole(450));
        assert_eq!(
            item.to_string(),
            "[GOLD] Rare Special Item Karambit | Doppler ($450.00)"
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            Rarity::ALL.map(Rarity::label),
            [
                "[BLUE] Common",
                "[PURPLE] Restricted",
                "[PINK] Classified",
                "[RED] Covert",
                "[GOLD] Rare Special Item",
            ]
        );
        let item = Item::new("Glock-18 | Catacombs", Rarity::Blue, Money::from_cents(10));
        assert_eq!(item.to_string(), "[BLUE] Common Glock-18 | Catacombs ($0.10)");
    }
}
