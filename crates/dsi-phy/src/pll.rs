//! PLL divider search.
//!
//! Both PHY generations synthesize their output as
//!
//! ```text
//! f_out = f_ref * ndiv / (idf * odf)
//! ```
//!
//! The legacy PLL searches all three dividers inside a VCO window derived
//! from the lane-rate range. The v1.41 PLL takes `odf` from its frequency
//! band table and searches `idf` x `ndiv` exhaustively. Both searches stop
//! at the first exact match and otherwise keep the smallest deviation seen
//! in enumeration order.
//!
//! Every function here is pure; nothing touches hardware.

use dsi_phy_specs::{
    pll_band_for_lane_rate, BandLookup, DividerBounds, LaneRateRange, IDF_LEGACY, IDF_PHY_141,
    LANE_RANGE_V141, NDIV_LEGACY, NDIV_PHY_141, ODF_LEGACY,
};

use crate::error::{Error, Result};
use crate::generation::{GenerationConfig, PhyGeneration};

// ── Types ────────────────────────────────────────────────────────────────────

/// One divider triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllParams {
    /// Input division factor.
    pub idf: u32,
    /// Loop division factor.
    pub ndiv: u32,
    /// Output division factor (power of two).
    pub odf: u32,
}

/// Result of a divider search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Solution {
    /// Selected dividers.
    pub params: PllParams,
    /// Output frequency the dividers produce (kHz).
    pub achieved_khz: u32,
    /// `|achieved - target|` (kHz).
    pub deviation_khz: u32,
    /// v1.41 frequency band the output divider and analog settings come from.
    pub band: Option<BandLookup>,
}

impl Solution {
    fn evaluate(reference_khz: u32, target_khz: u32, params: PllParams, band: Option<BandLookup>) -> Self {
        let achieved_khz = pll_output_khz(reference_khz, params);
        Self {
            params,
            achieved_khz,
            deviation_khz: achieved_khz.abs_diff(target_khz),
            band,
        }
    }

    fn improves_on(&self, best: Option<&Self>) -> bool {
        best.map_or(true, |best| self.deviation_khz < best.deviation_khz)
    }
}

/// Divider bounds and lane-rate range a search is confined to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SearchSpace {
    /// Input divider bounds.
    pub idf: DividerBounds,
    /// Loop divider bounds.
    pub ndiv: DividerBounds,
    /// Lane-rate range; bounds the legacy VCO window.
    pub lane_range: LaneRateRange,
}

impl SearchSpace {
    /// Legacy divider bounds with the given lane-rate range.
    pub const fn legacy(lane_range: LaneRateRange) -> Self {
        Self {
            idf: IDF_LEGACY,
            ndiv: NDIV_LEGACY,
            lane_range,
        }
    }

    /// v1.41 divider bounds.
    pub const PHY_141: Self = Self {
        idf: IDF_PHY_141,
        ndiv: NDIV_PHY_141,
        lane_range: LANE_RANGE_V141,
    };
}

/// A solved lane bit rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LaneSolution {
    /// PLL dividers and output.
    pub pll: Solution,
    /// Lane bit rate the PLL output yields (kbit/s).
    pub lane_kbps: u32,
}

// ── Frequency formula ────────────────────────────────────────────────────────

#[allow(clippy::arithmetic_side_effects)] // d > 0 checked by every caller
fn div_round_closest(n: u64, d: u64) -> u64 {
    n.saturating_add(d / 2) / d
}

/// `round(reference * ndiv / (idf * odf))` in kHz.
///
/// A zero `idf` or `odf` yields 0.
#[allow(clippy::arithmetic_side_effects)] // u32 operands widened to u64; divisor checked non-zero
pub fn pll_output_khz(reference_khz: u32, params: PllParams) -> u32 {
    let divisor = u64::from(params.idf) * u64::from(params.odf);
    if divisor == 0 {
        return 0;
    }
    let out = div_round_closest(u64::from(reference_khz) * u64::from(params.ndiv), divisor);
    u32::try_from(out).unwrap_or(u32::MAX)
}

fn check_inputs(reference_khz: u32, target_khz: u32) -> Result<()> {
    if reference_khz == 0 || target_khz == 0 {
        return Err(Error::InvalidInput {
            reference_khz,
            target_khz,
        });
    }
    Ok(())
}

// ── Legacy search ────────────────────────────────────────────────────────────

/// Powers of two inside the legacy output divider bounds.
fn legacy_output_dividers() -> impl Iterator<Item = u32> {
    core::iter::successors(Some(ODF_LEGACY.min), |odf| odf.checked_mul(2))
        .take_while(|odf| *odf <= ODF_LEGACY.max)
}

/// Legacy (v1.30 / v1.31) divider search.
///
/// For each input divider, the loop divider is restricted to the window that
/// keeps the VCO strictly inside `space.lane_range`; the outer loop stops
/// once that window starts at the loop divider maximum.
#[allow(clippy::arithmetic_side_effects)] // u32 operands widened to u64; clkin checked non-zero
pub fn solve_legacy(reference_khz: u32, target_khz: u32, space: &SearchSpace) -> Result<Solution> {
    check_inputs(reference_khz, target_khz)?;

    let range = space.lane_range;
    let clkin = u64::from(reference_khz);
    let target = u64::from(target_khz);
    let fvco_min = u64::from(range.min_kbps()) * 2 * u64::from(ODF_LEGACY.max);
    let fvco_max = u64::from(range.max_kbps()) * 2 * u64::from(ODF_LEGACY.min);
    let ndiv_floor = u64::from(space.ndiv.min);
    let ndiv_ceiling = u64::from(space.ndiv.max);

    let mut best: Option<Solution> = None;

    'search: for idf in space.idf.values() {
        let idf64 = u64::from(idf);
        let n_min = fvco_min * idf64 / (2 * clkin) + 1;
        let n_max = fvco_max * idf64 / (2 * clkin);

        if n_min >= ndiv_ceiling {
            break;
        }
        let n_min = n_min.max(ndiv_floor);
        let n_max = n_max.min(ndiv_ceiling);

        for odf in legacy_output_dividers() {
            let ndiv = div_round_closest(idf64 * u64::from(odf) * target, clkin);
            if ndiv < n_min || ndiv > n_max {
                continue;
            }
            let Ok(ndiv) = u32::try_from(ndiv) else {
                continue;
            };

            let candidate = Solution::evaluate(reference_khz, target_khz, PllParams { idf, ndiv, odf }, None);
            if candidate.improves_on(best.as_ref()) {
                best = Some(candidate);
            }
            if candidate.deviation_khz == 0 {
                break 'search;
            }
        }
    }

    match best {
        Some(solution) => {
            trace!(
                "legacy PLL {} kHz -> idf {} ndiv {} odf {} = {} kHz",
                target_khz,
                solution.params.idf,
                solution.params.ndiv,
                solution.params.odf,
                solution.achieved_khz
            );
            Ok(solution)
        }
        None => {
            warn!(
                "no legacy PLL dividers for {} kHz from {} kHz",
                target_khz, reference_khz
            );
            Err(Error::NoSolutionFound {
                reference_khz,
                target_khz,
            })
        }
    }
}

// ── v1.41 search ─────────────────────────────────────────────────────────────

/// v1.41 divider search.
///
/// `lane_mbps_hint` selects the frequency band, which fixes the output
/// divider. A hint above the last band clamps to it with a warning. The
/// lane-rate range of `space` is not consulted.
pub fn solve_phy_141(
    reference_khz: u32,
    target_khz: u32,
    lane_mbps_hint: u32,
    space: &SearchSpace,
) -> Result<Solution> {
    check_inputs(reference_khz, target_khz)?;

    let lookup = pll_band_for_lane_rate(lane_mbps_hint);
    if lookup.clamped {
        warn!(
            "lane rate {} Mbps above every PLL band, using the last one",
            lane_mbps_hint
        );
    }
    let odf = lookup.band.output_divider();

    let mut best: Option<Solution> = None;

    'search: for idf in space.idf.values() {
        for ndiv in space.ndiv.values() {
            let candidate = Solution::evaluate(reference_khz, target_khz, PllParams { idf, ndiv, odf }, Some(lookup));
            if candidate.improves_on(best.as_ref()) {
                best = Some(candidate);
            }
            if candidate.deviation_khz == 0 {
                break 'search;
            }
        }
    }

    best.ok_or(Error::NoSolutionFound {
        reference_khz,
        target_khz,
    })
}

// ── Generation dispatch ──────────────────────────────────────────────────────

/// Solves for a PLL output frequency on the given generation.
///
/// On v1.41 the PLL output is half the lane bit rate, which picks the band.
pub fn solve_for_output(
    generation: &GenerationConfig,
    reference_khz: u32,
    target_khz: u32,
) -> Result<Solution> {
    let space = generation.search_space();
    match generation.generation {
        PhyGeneration::Legacy => solve_legacy(reference_khz, target_khz, &space),
        PhyGeneration::Gen141 => {
            let hint = lane_kbps_from_output(generation.generation, target_khz) / 1_000;
            solve_phy_141(reference_khz, target_khz, hint, &space)
        }
    }
}

/// Solves for a lane bit rate on the given generation.
pub fn solve_for_lane_rate(
    generation: &GenerationConfig,
    reference_khz: u32,
    lane_kbps: u32,
) -> Result<LaneSolution> {
    let target_khz = output_from_lane_kbps(generation.generation, lane_kbps);
    let space = generation.search_space();
    let pll = match generation.generation {
        PhyGeneration::Legacy => solve_legacy(reference_khz, target_khz, &space)?,
        PhyGeneration::Gen141 => solve_phy_141(reference_khz, target_khz, lane_kbps / 1_000, &space)?,
    };
    Ok(LaneSolution {
        pll,
        lane_kbps: lane_kbps_from_output(generation.generation, pll.achieved_khz),
    })
}

/// PLL output frequency needed for a lane bit rate.
pub const fn output_from_lane_kbps(generation: PhyGeneration, lane_kbps: u32) -> u32 {
    match generation {
        PhyGeneration::Legacy => lane_kbps,
        PhyGeneration::Gen141 => lane_kbps / 2,
    }
}

/// Lane bit rate a PLL output frequency yields.
pub const fn lane_kbps_from_output(generation: PhyGeneration, output_khz: u32) -> u32 {
    match generation {
        PhyGeneration::Legacy => output_khz,
        PhyGeneration::Gen141 => output_khz.saturating_mul(2),
    }
}
