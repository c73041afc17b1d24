//! Runtime configuration for the PHY driver.
//!
//! Defaults match the wrapper's documented bring-up timing: status bits are
//! polled every millisecond for at most 200 ms, and the v1.41 shadow-register
//! update pulse is held for one millisecond on each edge.

/// Status-bit polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollConfig {
    /// Sleep between two reads of the status register (µs).
    pub interval_us: u32,
    /// Total time budget before the poll gives up (µs).
    pub timeout_us: u32,
}

impl PollConfig {
    /// Number of sleeps the poll may take before it reports a timeout.
    ///
    /// Always at least one, so a zero interval cannot turn into an unbounded
    /// loop and a zero timeout still samples the bit after one interval.
    pub const fn max_polls(&self) -> u32 {
        match self.timeout_us.checked_div(self.interval_us) {
            Some(0) | None => 1,
            Some(n) => n,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_us: 1_000,
            timeout_us: 200_000,
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyConfig {
    /// Regulator, lock and stop-state polling.
    pub poll: PollConfig,
    /// How long the v1.41 PLL update bit is held high, then low (µs).
    pub commit_hold_us: u32,
    /// Enable the byte clock as the last step of attach.
    pub default_on: bool,
}

impl Default for PhyConfig {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            commit_hold_us: 1_000,
            default_on: false,
        }
    }
}
