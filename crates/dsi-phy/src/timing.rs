//! DPHY transition times and video-mode feasibility.
//!
//! [`check_mode`] answers whether a display mode can be carried by the PHY:
//! whether the lane rate it needs is inside the hardware range, whether the
//! PLL can hit it closely enough, and whether horizontal blanking leaves
//! room for the sync packets and (in non-burst mode) a low-power excursion.
//! The verdict is advisory; nothing here touches hardware.

use dsi_phy_specs::{hstt_for_lane_rate, DphyTiming};

use crate::error::Error;
use crate::generation::{GenerationConfig, PhyGeneration};
use crate::pll::{self, Solution};

/// Largest pixel clock error accepted in non-burst mode (Hz).
pub const PIXEL_CLOCK_TOLERANCE_HZ: u64 = 50;

/// HSS / HSE are DSI short packets of four bytes.
const SHORT_PACKET_BITS: u32 = 32;

// ── DPHY timing ──────────────────────────────────────────────────────────────

/// `ceil((fp * mbps + 1000 * vp) / 8000)`: `fp` UI-proportional and `vp`
/// fixed nanosecond terms, in byte clock cycles.
#[allow(clippy::arithmetic_side_effects)] // u32 operands widened to u64
fn legacy_delay(fp: u32, vp: u32, lane_mbps: u32) -> u32 {
    let cycles = (u64::from(fp) * u64::from(lane_mbps) + 1_000 * u64::from(vp)).div_ceil(8_000);
    u32::try_from(cycles).unwrap_or(u32::MAX)
}

/// HS/LP transition times of the v1.30 / v1.31 PHY.
pub fn legacy_dphy_timing(lane_mbps: u32) -> DphyTiming {
    DphyTiming {
        clk_hs2lp: legacy_delay(272, 136, lane_mbps),
        clk_lp2hs: legacy_delay(512, 40, lane_mbps),
        data_hs2lp: legacy_delay(192, 64, lane_mbps),
        data_lp2hs: legacy_delay(256, 32, lane_mbps),
    }
}

/// HS/LP transition times for `lane_mbps` on the given generation.
pub fn dphy_timing(generation: PhyGeneration, lane_mbps: u32) -> DphyTiming {
    match generation {
        PhyGeneration::Legacy => legacy_dphy_timing(lane_mbps),
        PhyGeneration::Gen141 => hstt_for_lane_rate(lane_mbps),
    }
}

// ── Requests and verdicts ────────────────────────────────────────────────────

/// DSI pixel stream formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    /// 24 bpp.
    Rgb888,
    /// 18 bpp, loosely packed (one pixel per three bytes on the wire).
    Rgb666,
    /// 18 bpp, packed.
    Rgb666Packed,
    /// 16 bpp.
    Rgb565,
}

impl PixelFormat {
    /// Bits per pixel on the link.
    ///
    /// Loosely packed RGB666 occupies 24 bits on the wire but counts as 18
    /// for bandwidth purposes, as the host does.
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Rgb888 => 24,
            Self::Rgb666 | Self::Rgb666Packed => 18,
            Self::Rgb565 => 16,
        }
    }
}

/// A candidate display mode, as the display pipeline describes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VideoTimingRequest {
    /// Pixel clock (kHz).
    pub pixel_clock_khz: u32,
    /// Bits per pixel; 16, 18 or 24.
    pub bits_per_pixel: u32,
    /// Number of data lanes.
    pub lanes: u32,
    /// Active pixels per line.
    pub hdisplay: u32,
    /// Start of horizontal sync (pixels from line start).
    pub hsync_start: u32,
    /// End of horizontal sync.
    pub hsync_end: u32,
    /// Total pixels per line.
    pub htotal: u32,
    /// Burst video mode.
    pub burst: bool,
    /// Non-burst with sync pulses (HSS and HSE both sent).
    pub sync_pulse: bool,
}

impl VideoTimingRequest {
    /// Lane bit rate needed to carry the pixel stream, before burst headroom.
    ///
    /// `None` when the mode has no lanes.
    pub fn raw_lane_kbps(&self) -> Option<u64> {
        u64::from(self.pixel_clock_khz)
            .checked_mul(u64::from(self.bits_per_pixel))?
            .checked_div(u64::from(self.lanes))
    }

    /// Lane bit rate to synthesize: burst mode adds 20 % headroom.
    pub fn lane_kbps(&self) -> Option<u64> {
        let raw = self.raw_lane_kbps()?;
        if self.burst {
            raw.checked_mul(12)?.checked_div(10)
        } else {
            Some(raw)
        }
    }
}

/// Why a mode was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeRejection {
    /// Lane rate above the PHY maximum.
    ClockTooHigh,
    /// Lane rate below the PHY minimum (non-burst only).
    ClockTooLow,
    /// Achievable pixel clock too far from the requested one.
    ClockOutOfTolerance,
    /// Sync width (or sync-pulse back porch) shorter than a short packet.
    HsyncTooNarrow,
    /// Neither porch can hold a low-power excursion.
    NoHorizontalBlankingMargin,
    /// Unsupported bits per pixel, no lanes, or more lanes than the wrapper has.
    InvalidFormat,
    /// The PLL search failed.
    SolverFailed(Error),
}

impl core::fmt::Display for ModeRejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ClockTooHigh => write!(f, "lane rate above PHY maximum"),
            Self::ClockTooLow => write!(f, "lane rate below PHY minimum"),
            Self::ClockOutOfTolerance => write!(f, "pixel clock not achievable within tolerance"),
            Self::HsyncTooNarrow => write!(f, "horizontal sync too narrow for sync packets"),
            Self::NoHorizontalBlankingMargin => {
                write!(f, "no horizontal blanking margin for LP transition")
            }
            Self::InvalidFormat => write!(f, "unsupported pixel format or lane count"),
            Self::SolverFailed(e) => write!(f, "PLL solver failed: {e}"),
        }
    }
}

/// An accepted mode and the link it will run at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeAccepted {
    /// Achieved lane bit rate (kbit/s).
    pub lane_kbps: u32,
    /// PLL solution behind it.
    pub pll: Solution,
}

impl ModeAccepted {
    /// Achieved lane bit rate (Mbit/s, truncated).
    pub const fn lane_mbps(&self) -> u32 {
        self.lane_kbps / 1_000
    }
}

/// Verdict of [`check_mode`].
pub type ModeVerdict = Result<ModeAccepted, ModeRejection>;

// ── Checker ──────────────────────────────────────────────────────────────────

/// Decides whether `request` can run on this PHY with the given reference.
///
/// Checks, in order: pixel format and lane count; sync and back-porch widths against the
/// short-packet length; lane rate against the hardware range; the PLL
/// search; and in non-burst mode the pixel clock tolerance plus, on the
/// legacy PHY only, the low-power blanking margin.
///
/// The v1.41 PHY is not subject to the blanking margin check.
#[allow(clippy::arithmetic_side_effects)] // i64 on u32-bounded values; bpp and lanes checked non-zero
pub fn check_mode(request: &VideoTimingRequest, generation: &GenerationConfig, reference_khz: u32) -> ModeVerdict {
    let bpp = request.bits_per_pixel;
    if !matches!(bpp, 16 | 18 | 24) || request.lanes == 0 {
        return Err(ModeRejection::InvalidFormat);
    }
    if request.lanes > u32::from(generation.max_data_lanes) {
        debug!("{} lanes requested, wrapper has {}", request.lanes, generation.max_data_lanes);
        return Err(ModeRejection::InvalidFormat);
    }

    // Horizontal budget, in pixels.
    let short_packet_px = i64::from(SHORT_PACKET_BITS.div_ceil(bpp));
    let hfp = i64::from(request.hsync_start) - i64::from(request.hdisplay);
    let hsync = i64::from(request.hsync_end) - i64::from(request.hsync_start);
    let hbp = i64::from(request.htotal) - i64::from(request.hsync_end);

    if hsync < short_packet_px {
        return Err(ModeRejection::HsyncTooNarrow);
    }
    let hbp = if request.sync_pulse {
        if hbp < short_packet_px {
            return Err(ModeRejection::HsyncTooNarrow);
        }
        hbp - short_packet_px
    } else {
        // With sync events the back porch extends into the sync width.
        hbp + hsync - short_packet_px
    };

    // Lane rate against the hardware range. The upper bound applies before
    // burst headroom; the lower bound only binds in non-burst mode.
    let range = generation.lane_range;
    let raw_kbps = request.raw_lane_kbps().ok_or(ModeRejection::InvalidFormat)?;
    if raw_kbps > u64::from(range.max_kbps()) {
        return Err(ModeRejection::ClockTooHigh);
    }
    if !request.burst && raw_kbps < u64::from(range.min_kbps()) {
        return Err(ModeRejection::ClockTooLow);
    }
    let lane_kbps = request
        .lane_kbps()
        .and_then(|kbps| u32::try_from(kbps).ok())
        .ok_or(ModeRejection::ClockTooHigh)?;
    // A burst target may fall outside the range; solve for the nearest bound.
    let lane_kbps = range.clamp(lane_kbps);

    let solved = pll::solve_for_lane_rate(generation, reference_khz, lane_kbps)
        .map_err(ModeRejection::SolverFailed)?;

    if !request.burst {
        let lanes = u64::from(request.lanes);
        let achieved_hz = (1_000 * u64::from(solved.lane_kbps) * lanes + u64::from(bpp) / 2) / u64::from(bpp);
        let target_hz = u64::from(request.pixel_clock_khz) * 1_000;
        if achieved_hz.abs_diff(target_hz) > PIXEL_CLOCK_TOLERANCE_HZ {
            return Err(ModeRejection::ClockOutOfTolerance);
        }

        if generation.generation == PhyGeneration::Legacy {
            // The link drops to LP in HFP or HBP to resync with the pixel clock.
            let timing = legacy_dphy_timing(solved.lane_kbps / 1_000);
            let lp_bits = u64::from(timing.data_hs2lp + timing.data_lp2hs) * lanes * 8;
            let delay_to_lp = i64::try_from(lp_bits.div_ceil(u64::from(bpp))).unwrap_or(i64::MAX);
            if hfp < delay_to_lp && hbp < delay_to_lp {
                return Err(ModeRejection::NoHorizontalBlankingMargin);
            }
        }
    }

    Ok(ModeAccepted {
        lane_kbps: solved.lane_kbps,
        pll: solved.pll,
    })
}
