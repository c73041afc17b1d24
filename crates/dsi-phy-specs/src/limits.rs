//! Lane-rate and PLL divider limits per PHY generation.
//!
//! Legacy wrappers (v1.30 / v1.31) drive their PLL with a bounded
//! `idf`/`ndiv`/`odf` triple; the v1.41 PHY widens `idf` and `ndiv` and takes
//! `odf` from the frequency-band table instead of searching it.

use core::ops::RangeInclusive;

/// Inclusive bounds of one PLL divider field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DividerBounds {
    /// Smallest programmable value.
    pub min: u32,
    /// Largest programmable value.
    pub max: u32,
}

impl DividerBounds {
    /// Whether `value` lies within the bounds.
    pub const fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Iterate every value in the bounds, ascending.
    pub fn values(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }
}

/// Legacy input divider: 1..=7.
pub const IDF_LEGACY: DividerBounds = DividerBounds { min: 1, max: 7 };
/// Legacy loop divider: 10..=125.
pub const NDIV_LEGACY: DividerBounds = DividerBounds { min: 10, max: 125 };
/// Legacy output divider: powers of two in 1..=8.
pub const ODF_LEGACY: DividerBounds = DividerBounds { min: 1, max: 8 };

/// v1.41 input divider: 1..=16.
pub const IDF_PHY_141: DividerBounds = DividerBounds { min: 1, max: 16 };
/// v1.41 loop divider: 64..=625.
pub const NDIV_PHY_141: DividerBounds = DividerBounds { min: 64, max: 625 };

/// Achievable lane bit rate, in kbit/s.
///
/// Invariant: `min_kbps < max_kbps`. The fields are private so the invariant
/// can only be established through [`LaneRateRange::new`] or the constants
/// below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LaneRateRange {
    min_kbps: u32,
    max_kbps: u32,
}

impl LaneRateRange {
    /// Build a range, returning `None` unless `min_kbps < max_kbps`.
    pub const fn new(min_kbps: u32, max_kbps: u32) -> Option<Self> {
        if min_kbps < max_kbps {
            Some(Self { min_kbps, max_kbps })
        } else {
            None
        }
    }

    /// Lower bound (kbit/s).
    pub const fn min_kbps(&self) -> u32 {
        self.min_kbps
    }

    /// Upper bound (kbit/s).
    pub const fn max_kbps(&self) -> u32 {
        self.max_kbps
    }

    /// Whether `kbps` lies within the range (inclusive).
    pub const fn contains(&self, kbps: u32) -> bool {
        kbps >= self.min_kbps && kbps <= self.max_kbps
    }

    /// Clamp `kbps` into the range.
    pub const fn clamp(&self, kbps: u32) -> u32 {
        if kbps < self.min_kbps {
            self.min_kbps
        } else if kbps > self.max_kbps {
            self.max_kbps
        } else {
            kbps
        }
    }
}

/// v1.30 lane rate: 31.25 Mbit/s to 500 Mbit/s.
pub const LANE_RANGE_V130: LaneRateRange = LaneRateRange {
    min_kbps: 31_250,
    max_kbps: 500_000,
};

/// v1.31 lane rate: twice the v1.30 limits.
pub const LANE_RANGE_V131: LaneRateRange = LaneRateRange {
    min_kbps: 62_500,
    max_kbps: 1_000_000,
};

/// v1.41 lane rate: 80 Mbit/s to 2.5 Gbit/s.
pub const LANE_RANGE_V141: LaneRateRange = LaneRateRange {
    min_kbps: 80_000,
    max_kbps: 2_500_000,
};
