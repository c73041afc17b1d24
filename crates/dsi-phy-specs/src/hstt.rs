//! DPHY high-speed transition times.
//!
//! The legacy PHY derives its HS/LP transition delays from a closed-form
//! datasheet formula; the v1.41 PHY publishes them per lane-rate band. Both
//! are expressed in lane byte-clock cycles and share [`DphyTiming`].

/// HS/LP transition delays of one DPHY configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DphyTiming {
    /// Clock lane high-speed to low-power.
    pub clk_hs2lp: u32,
    /// Clock lane low-power to high-speed.
    pub clk_lp2hs: u32,
    /// Data lane high-speed to low-power.
    pub data_hs2lp: u32,
    /// Data lane low-power to high-speed.
    pub data_lp2hs: u32,
}

/// One row of the v1.41 transition-time table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct HsttRow {
    /// Exclusive upper bound of the band (Mbit/s per lane).
    pub max_lane_mbps: u32,
    /// Transition times for lane rates in this band.
    pub timing: DphyTiming,
}

const fn hstt(max_lane_mbps: u32, clk_lp2hs: u32, clk_hs2lp: u32, data_lp2hs: u32, data_hs2lp: u32) -> HsttRow {
    HsttRow {
        max_lane_mbps,
        timing: DphyTiming {
            clk_hs2lp,
            clk_lp2hs,
            data_hs2lp,
            data_lp2hs,
        },
    }
}

/// v1.41 high-speed transition times, ascending by `max_lane_mbps`.
///
/// Column order: bound, clk LP→HS, clk HS→LP, data LP→HS, data HS→LP.
pub const HSTT_PHY_141: [HsttRow; 63] = [
    hstt(80, 21, 17, 15, 10),
    hstt(90, 23, 17, 16, 10),
    hstt(100, 22, 17, 16, 10),
    hstt(110, 25, 18, 17, 11),
    hstt(120, 26, 20, 18, 11),
    hstt(130, 27, 19, 19, 11),
    hstt(140, 27, 19, 19, 11),
    hstt(150, 28, 20, 20, 12),
    hstt(160, 30, 21, 22, 13),
    hstt(170, 30, 21, 23, 13),
    hstt(180, 31, 21, 23, 13),
    hstt(190, 32, 22, 24, 13),
    hstt(205, 35, 22, 25, 13),
    hstt(220, 37, 26, 27, 15),
    hstt(235, 38, 28, 27, 16),
    hstt(250, 41, 29, 30, 17),
    hstt(275, 43, 29, 32, 18),
    hstt(300, 45, 32, 35, 19),
    hstt(325, 48, 33, 36, 18),
    hstt(350, 51, 35, 40, 20),
    hstt(400, 59, 37, 44, 21),
    hstt(450, 65, 40, 49, 23),
    hstt(500, 71, 41, 54, 24),
    hstt(550, 77, 44, 57, 26),
    hstt(600, 82, 46, 64, 27),
    hstt(650, 87, 48, 67, 28),
    hstt(700, 94, 52, 71, 29),
    hstt(750, 99, 52, 75, 31),
    hstt(800, 105, 55, 82, 32),
    hstt(850, 110, 58, 85, 32),
    hstt(900, 115, 58, 88, 35),
    hstt(950, 120, 62, 93, 36),
    hstt(1000, 128, 63, 99, 38),
    hstt(1050, 132, 65, 102, 38),
    hstt(1100, 138, 67, 106, 39),
    hstt(1150, 146, 69, 112, 42),
    hstt(1200, 151, 71, 117, 43),
    hstt(1250, 153, 74, 120, 45),
    hstt(1300, 160, 73, 124, 46),
    hstt(1350, 165, 76, 130, 47),
    hstt(1400, 172, 78, 134, 49),
    hstt(1450, 177, 80, 138, 49),
    hstt(1500, 183, 81, 143, 52),
    hstt(1550, 191, 84, 147, 52),
    hstt(1600, 194, 85, 152, 52),
    hstt(1650, 201, 86, 155, 53),
    hstt(1700, 208, 88, 161, 53),
    hstt(1750, 212, 89, 165, 53),
    hstt(1800, 220, 90, 171, 54),
    hstt(1850, 223, 92, 175, 55),
    hstt(1900, 231, 91, 180, 56),
    hstt(1950, 236, 95, 185, 56),
    hstt(2000, 243, 97, 190, 58),
    hstt(2050, 248, 99, 194, 59),
    hstt(2100, 252, 100, 199, 61),
    hstt(2150, 259, 102, 204, 62),
    hstt(2200, 266, 105, 210, 63),
    hstt(2250, 269, 109, 213, 65),
    hstt(2300, 272, 109, 217, 66),
    hstt(2350, 281, 112, 225, 66),
    hstt(2400, 283, 115, 226, 67),
    hstt(2450, 282, 115, 226, 67),
    hstt(2500, 281, 118, 227, 68),
];

/// Transition times for a lane rate.
///
/// Picks the first row whose bound exceeds `lane_mbps`, clamping to the last
/// row above the table's range.
pub fn hstt_for_lane_rate(lane_mbps: u32) -> DphyTiming {
    const LAST: HsttRow = HSTT_PHY_141[HSTT_PHY_141.len() - 1];

    HSTT_PHY_141
        .iter()
        .find(|row| lane_mbps < row.max_lane_mbps)
        .map_or(LAST.timing, |row| row.timing)
}
