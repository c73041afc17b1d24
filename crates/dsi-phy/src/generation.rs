//! Hardware generation detection.
//!
//! The wrapper reports its IP revision in the VERSION register. The revision
//! fixes everything the rest of the driver needs to know about the PHY: the
//! lane-rate range, the divider bounds, the PLL register layout and which
//! solver and timing model apply.

use dsi_phy_specs::{
    DividerBounds, LaneRateRange, HWVER_130, HWVER_131, HWVER_141, IDF_LEGACY, IDF_PHY_141,
    LANE_RANGE_V130, LANE_RANGE_V131, LANE_RANGE_V141, NDIV_LEGACY, NDIV_PHY_141, VERSION_MASK,
};

use crate::error::{Error, Result};
use crate::pll::SearchSpace;
use crate::regs::{legacy, phy141, PllFields};

/// Known wrapper IP revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HwVersion {
    /// IP 1.30 (STM32F469 / STM32F769).
    V1_30,
    /// IP 1.31 (STM32MP15).
    V1_31,
    /// IP 1.41 (STM32MP25).
    V1_41,
}

impl HwVersion {
    /// Decodes a raw VERSION register value. The low byte is ignored.
    pub fn detect(raw: u32) -> Result<Self> {
        match raw & VERSION_MASK {
            HWVER_130 => Ok(Self::V1_30),
            HWVER_131 => Ok(Self::V1_31),
            HWVER_141 => Ok(Self::V1_41),
            other => {
                error!("bad DSI wrapper version {}", other);
                Err(Error::UnsupportedHardwareVersion(other))
            }
        }
    }

    /// Masked identifier as read from the VERSION register.
    pub const fn id(self) -> u32 {
        match self {
            Self::V1_30 => HWVER_130,
            Self::V1_31 => HWVER_131,
            Self::V1_41 => HWVER_141,
        }
    }

    /// PHY generation implemented by this revision.
    pub const fn generation(self) -> PhyGeneration {
        match self {
            Self::V1_30 | Self::V1_31 => PhyGeneration::Legacy,
            Self::V1_41 => PhyGeneration::Gen141,
        }
    }
}

/// PHY generations with distinct PLLs and register layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyGeneration {
    /// Regulator + PLL in the wrapper, analytic DPHY timing.
    Legacy,
    /// Double-buffered PLL with band-table analog settings, table DPHY timing.
    Gen141,
}

/// Everything fixed by the detected revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GenerationConfig {
    /// Detected revision.
    pub version: HwVersion,
    /// Generation of that revision.
    pub generation: PhyGeneration,
    /// Achievable lane bit rate.
    pub lane_range: LaneRateRange,
    /// Input divider bounds.
    pub idf: DividerBounds,
    /// Loop divider bounds.
    pub ndiv: DividerBounds,
    /// PLL register layout.
    pub pll: PllFields,
    /// Number of data lanes the wrapper supports.
    pub max_data_lanes: u8,
    /// Name of the clock node this PHY provides.
    pub clock_name: &'static str,
}

impl GenerationConfig {
    /// Configuration for a known revision.
    pub const fn for_version(version: HwVersion) -> Self {
        match version {
            HwVersion::V1_30 | HwVersion::V1_31 => Self {
                version,
                generation: PhyGeneration::Legacy,
                lane_range: match version {
                    HwVersion::V1_30 => LANE_RANGE_V130,
                    _ => LANE_RANGE_V131,
                },
                idf: IDF_LEGACY,
                ndiv: NDIV_LEGACY,
                pll: legacy::PLL,
                max_data_lanes: 2,
                clock_name: "ck_dsi_phy",
            },
            HwVersion::V1_41 => Self {
                version,
                generation: PhyGeneration::Gen141,
                lane_range: LANE_RANGE_V141,
                idf: IDF_PHY_141,
                ndiv: NDIV_PHY_141,
                pll: phy141::PLL,
                max_data_lanes: 4,
                clock_name: "txbyteclk",
            },
        }
    }

    /// Detects the revision from a raw VERSION value.
    pub fn from_version_register(raw: u32) -> Result<Self> {
        HwVersion::detect(raw).map(Self::for_version)
    }

    /// Divider bounds and lane-rate range the PLL search runs in.
    pub const fn search_space(&self) -> SearchSpace {
        SearchSpace {
            idf: self.idf,
            ndiv: self.ndiv,
            lane_range: self.lane_range,
        }
    }

    /// Same revision, with a board-specific lane-rate range.
    pub fn with_lane_range(self, min_kbps: u32, max_kbps: u32) -> Result<Self> {
        let lane_range = LaneRateRange::new(min_kbps, max_kbps)
            .ok_or(Error::InvalidLaneRange { min_kbps, max_kbps })?;
        Ok(Self { lane_range, ..self })
    }
}
