//! Video-mode feasibility across the three wrapper revisions.

#![allow(clippy::arithmetic_side_effects, clippy::unwrap_used)]

use dsi_phy::pll::PllParams;
use dsi_phy::{
    check_mode, Error, GenerationConfig, HwVersion, ModeRejection, PixelFormat, VideoTimingRequest,
};
use proptest::prelude::*;

fn config(version: HwVersion) -> GenerationConfig {
    GenerationConfig::for_version(version)
}

/// CEA 1920x1080@60.
fn mode_1080p() -> VideoTimingRequest {
    VideoTimingRequest {
        pixel_clock_khz: 148_500,
        bits_per_pixel: PixelFormat::Rgb888.bits_per_pixel(),
        lanes: 4,
        hdisplay: 1920,
        hsync_start: 2008,
        hsync_end: 2052,
        htotal: 2200,
        burst: false,
        sync_pulse: false,
    }
}

/// CEA 1280x720@60.
fn mode_720p() -> VideoTimingRequest {
    VideoTimingRequest {
        pixel_clock_khz: 74_250,
        hdisplay: 1280,
        hsync_start: 1390,
        hsync_end: 1430,
        htotal: 1650,
        ..mode_1080p()
    }
}

/// 720p over the two lanes of a legacy wrapper: 891 Mbit/s per lane.
fn mode_720p_two_lanes() -> VideoTimingRequest {
    VideoTimingRequest {
        lanes: 2,
        ..mode_720p()
    }
}

/// A small 16 bpp panel on two lanes.
fn mode_320x240() -> VideoTimingRequest {
    VideoTimingRequest {
        pixel_clock_khz: 5_000,
        bits_per_pixel: PixelFormat::Rgb565.bits_per_pixel(),
        lanes: 2,
        hdisplay: 320,
        hsync_start: 330,
        hsync_end: 340,
        htotal: 360,
        burst: false,
        sync_pulse: false,
    }
}

// ── 891 Mbit/s lanes from a 26 MHz reference ─────────────────────────────────

#[test]
fn v130_rejects_720p_as_too_fast() {
    assert_eq!(
        check_mode(&mode_720p_two_lanes(), &config(HwVersion::V1_30), 26_000),
        Err(ModeRejection::ClockTooHigh)
    );
}

#[test]
fn v131_cannot_hit_720p_pixel_clock_from_26_mhz() {
    // Best legacy triple (3, 103, 1) gives 892667 kHz, i.e. 74.389 MHz pixels.
    assert_eq!(
        check_mode(&mode_720p_two_lanes(), &config(HwVersion::V1_31), 26_000),
        Err(ModeRejection::ClockOutOfTolerance)
    );
}

#[test]
fn v141_cannot_hit_1080p_pixel_clock_from_26_mhz() {
    // Best (15, 257, 1) gives 445467 kHz PLL output, i.e. 148.489 MHz pixels.
    assert_eq!(
        check_mode(&mode_1080p(), &config(HwVersion::V1_41), 26_000),
        Err(ModeRejection::ClockOutOfTolerance)
    );
}

// ── 891 Mbit/s lanes from a 27 MHz reference ─────────────────────────────────

#[test]
fn v131_accepts_720p_from_27_mhz() {
    let accepted = check_mode(&mode_720p_two_lanes(), &config(HwVersion::V1_31), 27_000).unwrap();
    assert_eq!(accepted.lane_kbps, 891_000);
    assert_eq!(accepted.pll.params, PllParams { idf: 1, ndiv: 33, odf: 1 });
}

#[test]
fn v141_accepts_1080p_from_27_mhz() {
    let accepted = check_mode(&mode_1080p(), &config(HwVersion::V1_41), 27_000).unwrap();
    assert_eq!(accepted.lane_kbps, 891_000);
    assert_eq!(accepted.pll.achieved_khz, 445_500);
    assert_eq!(accepted.pll.band.unwrap().index, 30);
}

#[test]
fn legacy_wrappers_carry_at_most_two_lanes() {
    for version in [HwVersion::V1_30, HwVersion::V1_31] {
        assert_eq!(config(version).max_data_lanes, 2);
        assert_eq!(
            check_mode(&mode_1080p(), &config(version), 27_000),
            Err(ModeRejection::InvalidFormat)
        );
        let three = VideoTimingRequest {
            lanes: 3,
            ..mode_320x240()
        };
        assert_eq!(
            check_mode(&three, &config(version), 27_000),
            Err(ModeRejection::InvalidFormat)
        );
    }
}

// ── Blanking ─────────────────────────────────────────────────────────────────

fn narrow_blanking() -> VideoTimingRequest {
    // hfp 10, hsync 44, hbp 20, sync pulses
    VideoTimingRequest {
        hsync_start: 1290,
        hsync_end: 1334,
        htotal: 1354,
        sync_pulse: true,
        ..mode_720p_two_lanes()
    }
}

#[test]
fn legacy_needs_room_for_low_power_in_blanking() {
    // delay to LP at 891 Mbit/s on two lanes is 42 pixels; hfp 10 and hbp 18 are both short.
    assert_eq!(
        check_mode(&narrow_blanking(), &config(HwVersion::V1_31), 27_000),
        Err(ModeRejection::NoHorizontalBlankingMargin)
    );
}

#[test]
fn v141_is_exempt_from_the_blanking_margin() {
    assert!(check_mode(&narrow_blanking(), &config(HwVersion::V1_41), 27_000).is_ok());
}

#[test]
fn burst_mode_skips_the_blanking_margin() {
    let mode = VideoTimingRequest {
        burst: true,
        ..VideoTimingRequest {
            hsync_start: 1290,
            hsync_end: 1330,
            htotal: 1340,
            ..mode_720p_two_lanes()
        }
    };
    assert!(check_mode(&mode, &config(HwVersion::V1_31), 27_000).is_ok());
}

#[test]
fn sync_pulse_back_porch_must_fit_a_short_packet() {
    let mode = VideoTimingRequest {
        htotal: 1431,
        sync_pulse: true,
        ..mode_720p_two_lanes()
    };
    // hbp = 1 pixel < 2-pixel HSE packet at 24 bpp
    assert_eq!(
        check_mode(&mode, &config(HwVersion::V1_31), 27_000),
        Err(ModeRejection::HsyncTooNarrow)
    );
    // Without sync pulses the sync width absorbs the back porch.
    let events = VideoTimingRequest {
        sync_pulse: false,
        ..mode
    };
    assert!(check_mode(&events, &config(HwVersion::V1_31), 27_000).is_ok());
}

// ── Clock range ──────────────────────────────────────────────────────────────

#[test]
fn non_burst_rejects_rates_below_the_phy_minimum() {
    // 5000 * 16 / 2 = 40000 kbit/s
    assert_eq!(
        check_mode(&mode_320x240(), &config(HwVersion::V1_31), 27_000),
        Err(ModeRejection::ClockTooLow)
    );
}

#[test]
fn burst_runs_slow_modes_at_the_phy_minimum() {
    let mode = VideoTimingRequest {
        pixel_clock_khz: 3_000,
        burst: true,
        ..mode_320x240()
    };
    // 3000 * 16 / 2 * 1.2 = 28800 kbit/s, raised to the 31250 floor.
    let accepted = check_mode(&mode, &config(HwVersion::V1_30), 27_000).unwrap();
    assert_eq!(accepted.lane_kbps, 31_339);
    assert_eq!(accepted.pll.params, PllParams { idf: 7, ndiv: 65, odf: 8 });

    let non_burst = VideoTimingRequest {
        burst: false,
        ..mode
    };
    assert_eq!(
        check_mode(&non_burst, &config(HwVersion::V1_30), 27_000),
        Err(ModeRejection::ClockTooLow)
    );
}

#[test]
fn burst_headroom_is_capped_at_the_phy_maximum() {
    let mode = VideoTimingRequest {
        burst: true,
        ..mode_720p_two_lanes()
    };
    // 891000 * 1.2 = 1069200 kbit/s, lowered to the 1 Gbit/s ceiling.
    let accepted = check_mode(&mode, &config(HwVersion::V1_31), 27_000).unwrap();
    assert_eq!(accepted.lane_kbps, 999_000);
    assert_eq!(accepted.pll.params, PllParams { idf: 1, ndiv: 37, odf: 1 });
}

#[test]
fn burst_headroom_is_applied_before_solving() {
    // CEA 720x480@60 on two lanes: 324000 kbit/s, 388800 with headroom.
    let mode_480p = VideoTimingRequest {
        pixel_clock_khz: 27_000,
        hdisplay: 640,
        hsync_start: 656,
        hsync_end: 752,
        htotal: 800,
        burst: true,
        ..mode_720p_two_lanes()
    };
    let v130 = check_mode(&mode_480p, &config(HwVersion::V1_30), 27_000).unwrap();
    assert_eq!(v130.lane_kbps, 388_800);
    assert_eq!(v130.pll.params, PllParams { idf: 5, ndiv: 72, odf: 1 });

    let mode = VideoTimingRequest {
        burst: true,
        ..mode_720p()
    };
    let v141 = check_mode(&mode, &config(HwVersion::V1_41), 27_000).unwrap();
    assert_eq!(v141.lane_kbps, 534_600);
    assert_eq!(v141.pll.params.odf, 2);
}

#[test]
fn other_pixel_formats_are_supported() {
    let v131 = config(HwVersion::V1_31);
    let rgb666 = VideoTimingRequest {
        bits_per_pixel: PixelFormat::Rgb666Packed.bits_per_pixel(),
        ..mode_720p_two_lanes()
    };
    let rgb565 = VideoTimingRequest {
        bits_per_pixel: PixelFormat::Rgb565.bits_per_pixel(),
        ..mode_720p_two_lanes()
    };
    assert_eq!(check_mode(&rgb666, &v131, 27_000).unwrap().lane_kbps, 668_250);
    assert_eq!(check_mode(&rgb565, &v131, 27_000).unwrap().lane_kbps, 594_000);
}

#[test]
fn zero_reference_is_a_solver_failure() {
    assert_eq!(
        check_mode(&mode_720p_two_lanes(), &config(HwVersion::V1_31), 0),
        Err(ModeRejection::SolverFailed(Error::InvalidInput {
            reference_khz: 0,
            target_khz: 891_000,
        }))
    );
}

// ── Properties ───────────────────────────────────────────────────────────────

fn any_version() -> impl Strategy<Value = HwVersion> {
    prop_oneof![Just(HwVersion::V1_30), Just(HwVersion::V1_31), Just(HwVersion::V1_41)]
}

fn any_bpp() -> impl Strategy<Value = u32> {
    prop_oneof![Just(16u32), Just(18u32), Just(24u32)]
}

proptest! {
    /// A sync width shorter than a short packet is always rejected the same way.
    #[test]
    fn narrow_hsync_always_rejected(
        version in any_version(),
        bpp in any_bpp(),
        pixel_clock_khz in 0u32..=400_000,
        lanes in 1u32..=2,
        hdisplay in 0u32..=4096,
        hfp in 0u32..=512,
        hbp in 0u32..=512,
        burst in any::<bool>(),
        sync_pulse in any::<bool>(),
        reference_khz in 0u32..=50_000,
    ) {
        // 32 bits per short packet: 2 pixels at 16 / 18 / 24 bpp, so width 1 or 0.
        let hsync = 32u32.div_ceil(bpp) - 1;
        let hsync_start = hdisplay + hfp;
        let mode = VideoTimingRequest {
            pixel_clock_khz,
            bits_per_pixel: bpp,
            lanes,
            hdisplay,
            hsync_start,
            hsync_end: hsync_start + hsync,
            htotal: hsync_start + hsync + hbp,
            burst,
            sync_pulse,
        };
        prop_assert_eq!(
            check_mode(&mode, &config(version), reference_khz),
            Err(ModeRejection::HsyncTooNarrow)
        );
    }

    /// The checker holds no state: the same input gives the same verdict.
    #[test]
    fn verdicts_are_idempotent(
        version in any_version(),
        bpp in 0u32..=32,
        pixel_clock_khz in 0u32..=400_000,
        lanes in 0u32..=4,
        hdisplay in 0u32..=4096,
        hsync_start in 0u32..=4096,
        hsync_end in 0u32..=4096,
        htotal in 0u32..=4096,
        burst in any::<bool>(),
        sync_pulse in any::<bool>(),
        reference_khz in 0u32..=50_000,
    ) {
        let mode = VideoTimingRequest {
            pixel_clock_khz,
            bits_per_pixel: bpp,
            lanes,
            hdisplay,
            hsync_start,
            hsync_end,
            htotal,
            burst,
            sync_pulse,
        };
        let generation = config(version);
        let first = check_mode(&mode, &generation, reference_khz);
        let second = check_mode(&mode, &generation, reference_khz);
        prop_assert_eq!(first, second);
    }

    /// Lane counts the wrapper lacks are rejected before anything else is looked at.
    #[test]
    fn excess_lanes_always_invalid(
        version in any_version(),
        bpp in any_bpp(),
        extra in 1u32..=8,
        pixel_clock_khz in 0u32..=400_000,
        burst in any::<bool>(),
        reference_khz in 0u32..=50_000,
    ) {
        let generation = config(version);
        let mode = VideoTimingRequest {
            pixel_clock_khz,
            bits_per_pixel: bpp,
            lanes: u32::from(generation.max_data_lanes) + extra,
            burst,
            ..mode_720p()
        };
        prop_assert_eq!(
            check_mode(&mode, &generation, reference_khz),
            Err(ModeRejection::InvalidFormat)
        );
    }

    /// Accepted burst modes always run inside the PHY lane range.
    #[test]
    fn accepted_burst_modes_stay_in_range(
        version in any_version(),
        bpp in any_bpp(),
        pixel_clock_khz in 1_000u32..=400_000,
        lanes in 1u32..=4,
        reference_khz in prop_oneof![Just(24_000u32), Just(26_000u32), Just(27_000u32)],
    ) {
        let generation = config(version);
        let mode = VideoTimingRequest {
            pixel_clock_khz,
            bits_per_pixel: bpp,
            lanes,
            burst: true,
            ..mode_720p()
        };
        if let Ok(accepted) = check_mode(&mode, &generation, reference_khz) {
            let range = generation.lane_range;
            // Within 2 % of the clamped target.
            let target = range.clamp(u32::try_from(mode.lane_kbps().unwrap()).unwrap());
            prop_assert!(accepted.lane_kbps.abs_diff(target) <= target / 50);
        }
    }

    /// Accepted non-burst modes reproduce the pixel clock within 50 Hz.
    #[test]
    fn accepted_non_burst_modes_are_within_tolerance(
        version in any_version(),
        bpp in any_bpp(),
        pixel_clock_khz in 10_000u32..=200_000,
        lanes in 1u32..=4,
        reference_khz in prop_oneof![Just(24_000u32), Just(26_000u32), Just(27_000u32)],
    ) {
        let mode = VideoTimingRequest {
            pixel_clock_khz,
            bits_per_pixel: bpp,
            lanes,
            hdisplay: 1000,
            hsync_start: 1400,
            hsync_end: 1440,
            htotal: 1900,
            burst: false,
            sync_pulse: false,
        };
        if let Ok(accepted) = check_mode(&mode, &config(version), reference_khz) {
            let achieved_hz = (u64::from(accepted.lane_kbps) * 1_000 * u64::from(lanes)
                + u64::from(bpp) / 2)
                / u64::from(bpp);
            prop_assert!(achieved_hz.abs_diff(u64::from(pixel_clock_khz) * 1_000) <= 50);
        }
    }
}
