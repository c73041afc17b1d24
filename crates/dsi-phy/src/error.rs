//! Driver error type.
//!
//! Mode-check rejections are not errors; see [`crate::timing::ModeRejection`].
//! Poll timeouts are not errors either; see [`crate::clock::PollOutcome`].

/// Errors returned by the solvers, the clock node and the PHY layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Reference or target frequency is zero.
    InvalidInput {
        /// Reference frequency in kHz.
        reference_khz: u32,
        /// Requested output frequency in kHz.
        target_khz: u32,
    },
    /// No divider triple inside the hardware bounds reaches the target.
    NoSolutionFound {
        /// Reference frequency in kHz.
        reference_khz: u32,
        /// Requested output frequency in kHz.
        target_khz: u32,
    },
    /// The VERSION register holds an identifier this driver does not know.
    UnsupportedHardwareVersion(u32),
    /// A lane-rate range with `min >= max` was supplied.
    InvalidLaneRange {
        /// Lower bound in kbit/s.
        min_kbps: u32,
        /// Upper bound in kbit/s.
        max_kbps: u32,
    },
    /// The mode has zero data lanes, more lanes than the wrapper, or zero bits per pixel.
    InvalidMode,
    /// The register block's bus clock could not be enabled.
    BusClockUnavailable,
    /// The PHY supply could not be enabled.
    SupplyUnavailable,
    /// The shared clock node is already borrowed on this execution path.
    ClockBusy,
}

/// Driver result alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidInput {
                reference_khz,
                target_khz,
            } => write!(
                f,
                "invalid PLL input: reference {reference_khz} kHz, target {target_khz} kHz"
            ),
            Self::NoSolutionFound {
                reference_khz,
                target_khz,
            } => write!(
                f,
                "no PLL dividers reach {target_khz} kHz from {reference_khz} kHz"
            ),
            Self::UnsupportedHardwareVersion(id) => {
                write!(f, "unsupported DSI wrapper version {id:#010x}")
            }
            Self::InvalidLaneRange { min_kbps, max_kbps } => {
                write!(f, "invalid lane rate range {min_kbps}..{max_kbps} kbit/s")
            }
            Self::InvalidMode => write!(f, "mode has an unusable lane count or no pixel format"),
            Self::BusClockUnavailable => write!(f, "DSI bus clock could not be enabled"),
            Self::SupplyUnavailable => write!(f, "DSI PHY supply could not be enabled"),
            Self::ClockBusy => write!(f, "byte clock node is already in use"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_shown_in_hex() {
        let msg = std::format!("{}", Error::UnsupportedHardwareVersion(0x3132_3000));
        assert_eq!(msg, "unsupported DSI wrapper version 0x31323000");
    }

    #[test]
    fn solver_errors_name_both_frequencies() {
        let msg = std::format!(
            "{}",
            Error::NoSolutionFound {
                reference_khz: 27_000,
                target_khz: 24_000
            }
        );
        assert!(msg.contains("27000"));
        assert!(msg.contains("24000"));
    }
}
