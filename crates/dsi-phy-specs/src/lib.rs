//! DSI PHY hardware specifications
//!
//! Static data describing the DesignWare MIPI DSI host wrapper found on
//! STM32 parts: the version identifiers the wrapper reports, the lane-rate
//! and divider limits of each PHY generation, and the two lookup tables the
//! v1.41 PHY needs (PLL analog tuning per frequency band, and high-speed
//! transition times).
//!
//! Nothing in this crate touches hardware. It is the single source of truth
//! for constants consumed by the `dsi-phy` driver crate.
//!
//! # Example
//!
//! ```
//! use dsi_phy_specs::{hstt_for_lane_rate, pll_band_for_lane_rate, LANE_RANGE_V141};
//!
//! let lookup = pll_band_for_lane_rate(891);
//! assert_eq!(lookup.band.max_lane_mbps, 900);
//! assert_eq!(lookup.band.output_divider(), 1);
//! assert!(!lookup.clamped);
//!
//! let timing = hstt_for_lane_rate(891);
//! assert_eq!(timing.data_hs2lp, 35);
//!
//! assert!(LANE_RANGE_V141.contains(891_000));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod hstt;
pub mod limits;
pub mod pll_bands;
pub mod version;

pub use hstt::{hstt_for_lane_rate, DphyTiming, HsttRow, HSTT_PHY_141};
pub use limits::{
    DividerBounds, LaneRateRange, IDF_LEGACY, IDF_PHY_141, LANE_RANGE_V130, LANE_RANGE_V131,
    LANE_RANGE_V141, NDIV_LEGACY, NDIV_PHY_141, ODF_LEGACY,
};
pub use pll_bands::{
    pll_band_for_lane_rate, BandLookup, PllBand, CP_BIAS, CP_INTEGRAL, LPF_GMP, PLL_BANDS_PHY_141,
};
pub use version::{HWVER_130, HWVER_131, HWVER_141, VERSION_MASK};
