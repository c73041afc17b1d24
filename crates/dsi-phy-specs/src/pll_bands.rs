//! v1.41 PLL frequency bands.
//!
//! Each row covers lane rates up to (but excluding) `max_lane_mbps` and
//! supplies the analog settings the PLL needs in that band: the
//! `hsfreqrange` code written to WPCR1, the output-divider exponent, the VCO
//! range and the proportional charge-pump setting written to WRPCR1.
//!
//! Source: STM32MP25 reference manual, DSI PHY PLL parameter map.

/// One frequency band of the v1.41 PLL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PllBand {
    /// Exclusive upper bound of the band (Mbit/s per lane).
    pub max_lane_mbps: u32,
    /// `hsfreqrange` code for WPCR1.HSFR.
    pub hs_freq_range: u8,
    /// Output divider exponent: `odf = 2^odf_exp`.
    pub odf_exp: u8,
    /// VCO operating range code for WRPCR1.VCO.
    pub vco_range: u8,
    /// Proportional charge pump code for WRPCR1.PROP.
    pub cp_prop: u8,
}

impl PllBand {
    /// Output division factor for this band.
    pub const fn output_divider(&self) -> u32 {
        match 1u32.checked_shl(self.odf_exp as u32) {
            Some(odf) => odf,
            None => 0,
        }
    }
}

/// Charge pump bias code written to WRPCR1.BIAS in every band.
pub const CP_BIAS: u8 = 0x10;
/// Integral charge pump code written to WRPCR1.INT in every band.
pub const CP_INTEGRAL: u8 = 0x00;
/// Loop filter `gmp` code written to WRPCR1.GMP in every band.
pub const LPF_GMP: u8 = 0x01;

/// Result of a band lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BandLookup {
    /// Row index into [`PLL_BANDS_PHY_141`].
    pub index: usize,
    /// The selected row.
    pub band: PllBand,
    /// `true` when the lane rate exceeded every row and the last row was used.
    pub clamped: bool,
}

const fn band(max_lane_mbps: u32, hs_freq_range: u8, odf_exp: u8, vco_range: u8, cp_prop: u8) -> PllBand {
    PllBand {
        max_lane_mbps,
        hs_freq_range,
        odf_exp,
        vco_range,
        cp_prop,
    }
}

/// v1.41 PLL parameter map, ascending by `max_lane_mbps`.
pub const PLL_BANDS_PHY_141: [PllBand; 63] = [
    band(80, 0x00, 3, 0x0F, 0x0B),
    band(90, 0x10, 3, 0x0F, 0x0B),
    band(100, 0x20, 3, 0x0F, 0x0B),
    band(110, 0x30, 3, 0x09, 0x0B),
    band(120, 0x01, 3, 0x09, 0x0B),
    band(130, 0x11, 3, 0x09, 0x0B),
    band(140, 0x21, 3, 0x09, 0x0B),
    band(150, 0x31, 3, 0x09, 0x0B),
    band(160, 0x02, 2, 0x0F, 0x0B),
    band(170, 0x12, 2, 0x0F, 0x0B),
    band(180, 0x22, 2, 0x0F, 0x0B),
    band(190, 0x32, 2, 0x0F, 0x0B),
    band(205, 0x03, 2, 0x0F, 0x0B),
    band(220, 0x13, 2, 0x09, 0x0B),
    band(235, 0x23, 2, 0x09, 0x0B),
    band(250, 0x33, 2, 0x09, 0x0B),
    band(275, 0x04, 2, 0x09, 0x0B),
    band(300, 0x14, 2, 0x09, 0x0B),
    band(325, 0x25, 1, 0x0F, 0x0B),
    band(350, 0x35, 1, 0x0F, 0x0B),
    band(400, 0x05, 1, 0x0F, 0x0B),
    band(450, 0x16, 1, 0x09, 0x0B),
    band(500, 0x26, 1, 0x09, 0x0B),
    band(550, 0x37, 1, 0x09, 0x0B),
    band(600, 0x07, 1, 0x09, 0x0B),
    band(650, 0x18, 0, 0x0F, 0x0B),
    band(700, 0x28, 0, 0x0F, 0x0B),
    band(750, 0x39, 0, 0x0F, 0x0B),
    band(800, 0x09, 0, 0x0F, 0x0B),
    band(850, 0x19, 0, 0x09, 0x0B),
    band(900, 0x29, 0, 0x09, 0x0B),
    band(950, 0x3A, 0, 0x09, 0x0B),
    band(1000, 0x0A, 0, 0x09, 0x0B),
    band(1050, 0x1A, 0, 0x09, 0x0B),
    band(1100, 0x2A, 0, 0x09, 0x0B),
    band(1150, 0x3B, 0, 0x09, 0x0B),
    band(1200, 0x0B, 0, 0x09, 0x0B),
    band(1250, 0x1B, 0, 0x09, 0x0B),
    band(1300, 0x2B, 0, 0x03, 0x0B),
    band(1350, 0x3C, 0, 0x03, 0x0B),
    band(1400, 0x0C, 0, 0x03, 0x0B),
    band(1450, 0x1C, 0, 0x03, 0x0B),
    band(1500, 0x2C, 0, 0x03, 0x0B),
    band(1550, 0x3D, 0, 0x03, 0x0B),
    band(1600, 0x0D, 0, 0x03, 0x0B),
    band(1650, 0x1D, 0, 0x03, 0x0B),
    band(1700, 0x2E, 0, 0x03, 0x0B),
    band(1750, 0x3E, 0, 0x03, 0x0B),
    band(1800, 0x0E, 0, 0x03, 0x0B),
    band(1850, 0x1E, 0, 0x03, 0x0B),
    band(1900, 0x2F, 0, 0x03, 0x0B),
    band(1950, 0x3F, 0, 0x03, 0x0B),
    band(2000, 0x0F, 0, 0x03, 0x0B),
    band(2050, 0x40, 0, 0x03, 0x0B),
    band(2100, 0x41, 0, 0x03, 0x0B),
    band(2150, 0x42, 0, 0x03, 0x0B),
    band(2200, 0x43, 0, 0x01, 0x0B),
    band(2250, 0x44, 0, 0x01, 0x0B),
    band(2300, 0x45, 0, 0x01, 0x0C),
    band(2350, 0x46, 0, 0x01, 0x0C),
    band(2400, 0x47, 0, 0x01, 0x0C),
    band(2450, 0x48, 0, 0x01, 0x0C),
    band(2500, 0x49, 0, 0x01, 0x0C),
];

/// Select the band for a lane rate.
///
/// Picks the first row whose bound exceeds `lane_mbps`. Rates beyond the
/// table clamp to the last row with [`BandLookup::clamped`] set.
pub fn pll_band_for_lane_rate(lane_mbps: u32) -> BandLookup {
    const LAST: usize = PLL_BANDS_PHY_141.len() - 1;

    match PLL_BANDS_PHY_141
        .iter()
        .enumerate()
        .find(|(_, band)| lane_mbps < band.max_lane_mbps)
    {
        Some((index, band)) => BandLookup {
            index,
            band: *band,
            clamped: false,
        },
        None => BandLookup {
            index: LAST,
            band: PLL_BANDS_PHY_141[LAST],
            clamped: true,
        },
    }
}
