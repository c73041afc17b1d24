//! High-speed byte clock node.
//!
//! [`TxByteClock`] owns the register bus and implements [`ClockProvider`]
//! for both PHY generations. Numeric work is delegated to [`crate::pll`];
//! this module only sequences registers and polls status bits.
//!
//! # State machine
//!
//! ```text
//! Disabled ──enable──▶ Locking ──lock or timeout──▶ Enabled ──disable──▶ Disabled
//! ```
//!
//! `set_rate` is accepted in any phase and never toggles the PLL enable.
//! Changing the rate of a running PLL is the caller's `disable`, `set_rate`,
//! `enable` sequence.
//!
//! # Caller serialization
//!
//! `enable`, `disable` and `set_rate` must not interleave on one node. The
//! `&mut self` receivers enforce this within one owner; when the node is
//! shared, wrap it in [`SharedTxByteClock`] and go through [`with_clock`].

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;

use dsi_phy_specs::{PllBand, CP_BIAS, CP_INTEGRAL, LPF_GMP};

use crate::config::{PhyConfig, PollConfig};
use crate::error::{Error, Result};
use crate::generation::{GenerationConfig, PhyGeneration};
use crate::hal::{PeripheralClock, PhyBus};
use crate::pll::{self, PllParams, Solution};
use crate::regs::{legacy, phy141, PllFields, RegisterBlock};

// ── Outcomes and state ───────────────────────────────────────────────────────

/// Result of a bounded status-bit poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// The bit was observed set.
    Ready,
    /// The budget ran out; the sequence continued anyway.
    TimedOut,
}

impl PollOutcome {
    /// `true` for [`PollOutcome::TimedOut`].
    pub const fn timed_out(self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// What `enable` observed while bringing the PLL up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnableReport {
    /// Attach has not completed; nothing was touched.
    Deferred,
    /// v1.30 / v1.31 bring-up.
    Legacy {
        /// Regulator ready.
        regulator: PollOutcome,
        /// PLL lock.
        lock: PollOutcome,
    },
    /// v1.41 bring-up.
    Phy141 {
        /// Clock lane stop state.
        stop_state: PollOutcome,
    },
}

impl EnableReport {
    /// `true` when any poll of the bring-up timed out.
    pub const fn timed_out(&self) -> bool {
        match self {
            Self::Deferred => false,
            Self::Legacy { regulator, lock } => regulator.timed_out() || lock.timed_out(),
            Self::Phy141 { stop_state } => stop_state.timed_out(),
        }
    }
}

/// Phase of the clock node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockPhase {
    /// PLL off.
    #[default]
    Disabled,
    /// Enable sequence in progress.
    Locking,
    /// PLL on (possibly after a timed-out poll).
    Enabled,
}

/// Software view of the clock node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockState {
    /// Enable phase.
    pub phase: ClockPhase,
    /// Lane bit rate of the last programmed rate (Mbit/s).
    pub current_lane_mbps: u32,
    /// Reference clock used by the last programmed rate (kHz).
    pub parent_reference_khz: u32,
}

impl ClockState {
    /// `true` once the enable sequence has finished.
    pub const fn enabled(&self) -> bool {
        matches!(self.phase, ClockPhase::Enabled)
    }
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Frequency-provider contract of a clock node. Rates are in kHz.
pub trait ClockProvider {
    /// Starts the clock. Poll timeouts are reported, not returned as errors.
    fn enable(&mut self) -> Result<EnableReport>;

    /// Stops the clock.
    fn disable(&mut self) -> Result<()>;

    /// Reads the hardware enable bit.
    fn is_enabled(&mut self) -> Result<bool>;

    /// Frequency produced by the dividers currently in the registers.
    fn recalc_rate(&mut self, parent_khz: u32) -> Result<u32>;

    /// Closest frequency `set_rate` would produce. Touches no register.
    fn round_rate(&self, rate_khz: u32, parent_khz: u32) -> Result<u32>;

    /// Programs the dividers for `rate_khz`. Does not change the enable state.
    fn set_rate(&mut self, rate_khz: u32, parent_khz: u32) -> Result<Solution>;
}

// ── Register sequences ───────────────────────────────────────────────────────

/// Polls `mask` in the register at `offset` until any bit is set or the
/// budget runs out. Reads once more after the last sleep.
pub(crate) fn poll_bits<R, D>(regs: &R, delay: &mut D, offset: u32, mask: u32, poll: PollConfig) -> PollOutcome
where
    R: RegisterBlock + ?Sized,
    D: DelayNs,
{
    for _ in 0..poll.max_polls() {
        if regs.any_set(offset, mask) {
            return PollOutcome::Ready;
        }
        delay.delay_us(poll.interval_us);
    }
    if regs.any_set(offset, mask) {
        PollOutcome::Ready
    } else {
        PollOutcome::TimedOut
    }
}

/// Sets `mask`, holds, clears it, holds.
pub(crate) fn pulse_bits<R, D>(regs: &mut R, delay: &mut D, offset: u32, mask: u32, hold_us: u32)
where
    R: RegisterBlock + ?Sized,
    D: DelayNs,
{
    regs.set_bits(offset, mask);
    delay.delay_us(hold_us);
    regs.clear_bits(offset, mask);
    delay.delay_us(hold_us);
}

fn enable_legacy<R: RegisterBlock, D: DelayNs>(regs: &mut R, delay: &mut D, poll: PollConfig) -> EnableReport {
    regs.set_bits(legacy::DSI_WRPCR, legacy::WRPCR_REGEN | legacy::WRPCR_BGREN);
    let regulator = poll_bits(&*regs, delay, legacy::DSI_WISR, legacy::WISR_RRS, poll);
    if regulator.timed_out() {
        debug!("DSI regulator not ready, continuing");
    }

    regs.set_bits(legacy::DSI_WRPCR, legacy::WRPCR_PLLEN);
    let lock = poll_bits(&*regs, delay, legacy::DSI_WISR, legacy::WISR_PLLLS, poll);
    if lock.timed_out() {
        debug!("DSI PLL not locked, continuing");
    }

    EnableReport::Legacy { regulator, lock }
}

fn enable_phy_141<R: RegisterBlock, D: DelayNs>(regs: &mut R, delay: &mut D, poll: PollConfig) -> EnableReport {
    let stop_state = poll_bits(&*regs, delay, phy141::DSI_PSR, phy141::PSR_PSSC, poll);
    if stop_state.timed_out() {
        warn!("DSI PHY clock lane not in stop state, continuing");
    }
    regs.set_bits(phy141::DSI_WRPCR2, phy141::WRPCR2_PLLEN);

    EnableReport::Phy141 { stop_state }
}

fn program_legacy<R: RegisterBlock>(regs: &mut R, solution: &Solution) {
    let fields = legacy::PLL;
    let PllParams { idf, ndiv, odf } = solution.params;
    let mask = fields.idf.mask | fields.ndiv.mask | fields.odf.mask;
    let value = fields.idf.encode(fields.idf_code(idf))
        | fields.ndiv.encode(fields.ndiv_code(ndiv))
        | fields.odf.encode(PllFields::odf_code(odf));
    regs.update_bits(legacy::DSI_WRPCR, mask, value);

    // Bit period in high-speed mode, in quarter nanoseconds.
    let uix4 = 4_000_000u32.checked_div(solution.achieved_khz).unwrap_or(0);
    regs.write_field(legacy::WPCR0_UIX4, uix4);
}

/// Configuration clock code: `(f_ref_MHz - 17) * 4`.
fn config_clock_code(reference_khz: u32) -> u32 {
    (reference_khz / 1_000).saturating_sub(17).saturating_mul(4)
}

fn program_phy_141<R: RegisterBlock, D: DelayNs>(
    regs: &mut R,
    delay: &mut D,
    params: PllParams,
    band: &PllBand,
    reference_khz: u32,
    commit_hold_us: u32,
) {
    let fields = phy141::PLL;
    let PllParams { idf, ndiv, odf } = params;

    regs.write(
        phy141::DSI_WPCR1,
        phy141::WPCR1_HSFR.encode(u32::from(band.hs_freq_range))
            | phy141::WPCR1_CCF.encode(config_clock_code(reference_khz)),
    );
    regs.write(
        phy141::DSI_WRPCR0,
        fields.ndiv.encode(fields.ndiv_code(ndiv)) | fields.idf.encode(fields.idf_code(idf)),
    );
    regs.write(
        phy141::DSI_WRPCR1,
        fields.odf.encode(PllFields::odf_code(odf))
            | phy141::WRPCR1_VCO.encode(u32::from(band.vco_range))
            | phy141::WRPCR1_BIAS.encode(u32::from(CP_BIAS))
            | phy141::WRPCR1_INT.encode(u32::from(CP_INTEGRAL))
            | phy141::WRPCR1_GMP.encode(u32::from(LPF_GMP))
            | phy141::WRPCR1_PROP.encode(u32::from(band.cp_prop)),
    );

    regs.write(phy141::DSI_PCTLR, phy141::PCTLR_CKEN);
    regs.write_field(phy141::WRPCR2_SEL, 1);

    // The PLL registers are shadowed; UPD copies them in.
    pulse_bits(regs, delay, phy141::DSI_WRPCR2, phy141::WRPCR2_UPD, commit_hold_us);

    regs.set_bits(phy141::DSI_PCTLR, phy141::PCTLR_PWEN | phy141::PCTLR_DEN);
}

// ── Clock node ───────────────────────────────────────────────────────────────

/// The PHY's high-speed byte clock.
pub struct TxByteClock<R, P, D> {
    bus: PhyBus<R, P, D>,
    generation: GenerationConfig,
    config: PhyConfig,
    state: ClockState,
    attached: bool,
}

impl<R, P, D> TxByteClock<R, P, D>
where
    R: RegisterBlock,
    P: PeripheralClock,
    D: DelayNs,
{
    /// Creates the node. `enable` and `disable` stay no-ops until
    /// [`complete_attach`](Self::complete_attach) is called.
    pub fn new(bus: PhyBus<R, P, D>, generation: GenerationConfig, config: PhyConfig) -> Self {
        Self {
            bus,
            generation,
            config,
            state: ClockState::default(),
            attached: false,
        }
    }

    /// Marks device attachment complete.
    pub fn complete_attach(&mut self) {
        self.attached = true;
    }

    /// `true` once attachment completed.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Software state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Detected generation.
    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Driver configuration.
    pub fn config(&self) -> &PhyConfig {
        &self.config
    }

    /// Underlying bus.
    pub fn bus(&self) -> &PhyBus<R, P, D> {
        &self.bus
    }

    pub(crate) fn bus_mut(&mut self) -> &mut PhyBus<R, P, D> {
        &mut self.bus
    }

    /// Gives the bus back.
    pub fn into_bus(self) -> PhyBus<R, P, D> {
        self.bus
    }
}

impl<R, P, D> ClockProvider for TxByteClock<R, P, D>
where
    R: RegisterBlock,
    P: PeripheralClock,
    D: DelayNs,
{
    fn enable(&mut self) -> Result<EnableReport> {
        if !self.attached {
            debug!("byte clock enable before attach, ignored");
            return Ok(EnableReport::Deferred);
        }
        debug!("byte clock enable");

        let generation = self.generation.generation;
        let poll = self.config.poll;
        self.state.phase = ClockPhase::Locking;

        let report = self.bus.with_bus_clock(|regs, delay| match generation {
            PhyGeneration::Legacy => enable_legacy(regs, delay, poll),
            PhyGeneration::Gen141 => enable_phy_141(regs, delay, poll),
        });

        match report {
            Ok(report) => {
                self.state.phase = ClockPhase::Enabled;
                Ok(report)
            }
            Err(e) => {
                self.state.phase = ClockPhase::Disabled;
                Err(e)
            }
        }
    }

    fn disable(&mut self) -> Result<()> {
        if !self.attached {
            debug!("byte clock disable before attach, ignored");
            return Ok(());
        }
        debug!("byte clock disable");

        let generation = self.generation.generation;
        self.bus.with_bus_clock(|regs, _| match generation {
            PhyGeneration::Legacy => {
                regs.clear_bits(legacy::DSI_WRPCR, legacy::WRPCR_PLLEN);
                regs.clear_bits(legacy::DSI_WRPCR, legacy::WRPCR_REGEN | legacy::WRPCR_BGREN);
            }
            PhyGeneration::Gen141 => regs.clear_bits(phy141::DSI_WRPCR2, phy141::WRPCR2_PLLEN),
        })?;

        self.state.phase = ClockPhase::Disabled;
        Ok(())
    }

    fn is_enabled(&mut self) -> Result<bool> {
        let enable = self.generation.pll.enable;
        self.bus.with_bus_clock(|regs, _| regs.any_set(enable.offset, enable.mask))
    }

    fn recalc_rate(&mut self, parent_khz: u32) -> Result<u32> {
        let fields = self.generation.pll;
        let params = self.bus.with_bus_clock(|regs, _| fields.read(&*regs))?;
        let rate = pll::pll_output_khz(parent_khz, params);
        debug!(
            "byte clock recalc: idf {} ndiv {} odf {} -> {} kHz",
            params.idf, params.ndiv, params.odf, rate
        );
        Ok(rate)
    }

    fn round_rate(&self, rate_khz: u32, parent_khz: u32) -> Result<u32> {
        let solution = pll::solve_for_output(&self.generation, parent_khz, rate_khz)?;
        debug!("byte clock round {} kHz -> {} kHz", rate_khz, solution.achieved_khz);
        Ok(solution.achieved_khz)
    }

    fn set_rate(&mut self, rate_khz: u32, parent_khz: u32) -> Result<Solution> {
        let generation = self.generation.generation;
        let solution = pll::solve_for_output(&self.generation, parent_khz, rate_khz)?;
        let band = match (generation, solution.band) {
            (PhyGeneration::Gen141, None) => {
                return Err(Error::NoSolutionFound {
                    reference_khz: parent_khz,
                    target_khz: rate_khz,
                })
            }
            (_, lookup) => lookup.map(|lookup| lookup.band),
        };
        let commit_hold_us = self.config.commit_hold_us;
        debug!(
            "byte clock set {} kHz from {} kHz -> {} kHz",
            rate_khz, parent_khz, solution.achieved_khz
        );

        self.bus.with_bus_clock(|regs, delay| match (generation, band) {
            (PhyGeneration::Gen141, Some(band)) => {
                program_phy_141(regs, delay, solution.params, &band, parent_khz, commit_hold_us);
            }
            _ => program_legacy(regs, &solution),
        })?;

        self.state.parent_reference_khz = parent_khz;
        self.state.current_lane_mbps = pll::lane_kbps_from_output(generation, solution.achieved_khz) / 1_000;
        Ok(solution)
    }
}

// ── Shared access ────────────────────────────────────────────────────────────

/// A byte clock behind a blocking mutex, for callers that share the node.
pub type SharedTxByteClock<M, R, P, D> = Mutex<M, RefCell<TxByteClock<R, P, D>>>;

/// Runs `f` with exclusive access to a shared clock node.
///
/// Returns [`Error::ClockBusy`] if called again from inside `f`.
pub fn with_clock<M, R, P, D, T>(
    shared: &SharedTxByteClock<M, R, P, D>,
    f: impl FnOnce(&mut TxByteClock<R, P, D>) -> T,
) -> Result<T>
where
    M: RawMutex,
{
    shared.lock(|cell| {
        let mut clock = cell.try_borrow_mut().map_err(|_| Error::ClockBusy)?;
        Ok(f(&mut clock))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::generation::HwVersion;
    use crate::mocks::{MockDelay, MockPeripheralClock, MockRegisters};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    type NoopClock = TxByteClock<MockRegisters, MockPeripheralClock, NoopDelay>;

    fn clock(version: HwVersion, regs: MockRegisters) -> NoopClock {
        let bus = PhyBus::new(regs, MockPeripheralClock::new(), NoopDelay::new());
        let mut clock = TxByteClock::new(bus, GenerationConfig::for_version(version), PhyConfig::default());
        clock.complete_attach();
        clock
    }

    #[test]
    fn poll_returns_ready_without_sleeping_when_bit_is_set() {
        let mut regs = MockRegisters::new();
        regs.preset(legacy::DSI_WISR, legacy::WISR_RRS);
        let mut delay = MockDelay::new();

        let outcome = poll_bits(&regs, &mut delay, legacy::DSI_WISR, legacy::WISR_RRS, PollConfig::default());

        assert_eq!(outcome, PollOutcome::Ready);
        assert_eq!(delay.elapsed_us(), 0);
    }

    #[test]
    fn poll_gives_up_after_the_timeout() {
        let regs = MockRegisters::new();
        let mut delay = MockDelay::new();

        let outcome = poll_bits(&regs, &mut delay, phy141::DSI_PSR, phy141::PSR_PSSC, PollConfig::default());

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(delay.elapsed_us(), 200_000);
    }

    #[test]
    fn poll_sees_a_bit_that_sets_late() {
        let mut regs = MockRegisters::new();
        regs.set_after_reads(legacy::DSI_WISR, legacy::WISR_PLLLS, 3);
        let mut delay = MockDelay::new();

        let outcome = poll_bits(&regs, &mut delay, legacy::DSI_WISR, legacy::WISR_PLLLS, PollConfig::default());

        assert_eq!(outcome, PollOutcome::Ready);
        assert_eq!(delay.elapsed_us(), 3_000);
    }

    #[test]
    fn unattached_clock_ignores_enable_and_disable() {
        let bus = PhyBus::new(MockRegisters::new(), MockPeripheralClock::new(), NoopDelay::new());
        let mut clock = TxByteClock::new(bus, GenerationConfig::for_version(HwVersion::V1_31), PhyConfig::default());

        assert_eq!(clock.enable().unwrap(), EnableReport::Deferred);
        clock.disable().unwrap();

        assert!(clock.bus().regs().writes().is_empty());
        assert_eq!(clock.bus().pclk().enables(), 0);
        assert_eq!(clock.state().phase, ClockPhase::Disabled);
    }

    #[test]
    fn config_clock_code_saturates_below_17_mhz() {
        assert_eq!(config_clock_code(27_000), 40);
        assert_eq!(config_clock_code(24_000), 28);
        assert_eq!(config_clock_code(16_000), 0);
    }

    #[test]
    fn legacy_set_rate_writes_dividers_and_unit_interval() {
        let mut clock = clock(HwVersion::V1_31, MockRegisters::new());
        let solution = clock.set_rate(891_000, 27_000).unwrap();
        let regs = clock.bus().regs();

        assert_eq!(solution.params, PllParams { idf: 1, ndiv: 33, odf: 1 });
        // ndiv 33 << 2 | idf 1 << 11 | odf exp 0 << 16
        assert_eq!(regs.peek(legacy::DSI_WRPCR), (33 << 2) | (1 << 11));
        // 4_000_000 / 891_000
        assert_eq!(regs.peek(legacy::DSI_WPCR0), 4);
        assert_eq!(clock.state().current_lane_mbps, 891);
        assert_eq!(clock.state().parent_reference_khz, 27_000);
        assert_eq!(clock.state().phase, ClockPhase::Disabled);
    }

    #[test]
    fn legacy_set_rate_preserves_enable_bits() {
        let mut regs = MockRegisters::new();
        regs.preset(legacy::DSI_WRPCR, legacy::WRPCR_PLLEN | legacy::WRPCR_REGEN);
        let mut clock = clock(HwVersion::V1_30, regs);

        clock.set_rate(36_000, 27_000).unwrap();

        let wrpcr = clock.bus().regs().peek(legacy::DSI_WRPCR);
        assert_eq!(wrpcr & (legacy::WRPCR_PLLEN | legacy::WRPCR_REGEN), legacy::WRPCR_PLLEN | legacy::WRPCR_REGEN);
        assert_eq!(legacy::PLL.odf.extract(wrpcr), 3);
    }

    #[test]
    fn phy141_set_rate_commits_shadow_registers() {
        let mut clock = clock(HwVersion::V1_41, MockRegisters::new());
        let solution = clock.set_rate(445_500, 27_000).unwrap();
        let regs = clock.bus().regs();

        assert_eq!(solution.params, PllParams { idf: 4, ndiv: 66, odf: 1 });
        // band 900: hsfreq 0x29, vco 0x09, prop 0x0B
        assert_eq!(regs.peek(phy141::DSI_WPCR1), (0x29 << 8) | 40);
        assert_eq!(regs.peek(phy141::DSI_WRPCR0), (64 << 4) | 3);
        assert_eq!(
            regs.peek(phy141::DSI_WRPCR1),
            (0x09 << 24) | (0x10 << 16) | (0x01 << 6) | 0x0B
        );
        assert_eq!(regs.peek(phy141::DSI_WRPCR2), 0x1);
        assert_eq!(
            regs.peek(phy141::DSI_PCTLR),
            phy141::PCTLR_CKEN | phy141::PCTLR_PWEN | phy141::PCTLR_DEN
        );

        let upd: std::vec::Vec<u32> = regs
            .writes_to(phy141::DSI_WRPCR2)
            .map(|value| value & phy141::WRPCR2_UPD)
            .collect();
        assert_eq!(upd, [0, phy141::WRPCR2_UPD, 0]);
        assert_eq!(clock.state().current_lane_mbps, 891);
    }

    #[test]
    fn failed_solve_leaves_registers_untouched() {
        let mut clock = clock(HwVersion::V1_30, MockRegisters::new());
        assert_eq!(
            clock.set_rate(24_000, 27_000),
            Err(Error::NoSolutionFound { reference_khz: 27_000, target_khz: 24_000 })
        );
        assert!(clock.bus().regs().writes().is_empty());
        assert_eq!(clock.bus().pclk().enables(), 0);
    }

    #[test]
    fn recalc_reads_back_programmed_rate() {
        let mut clock = clock(HwVersion::V1_41, MockRegisters::new());
        clock.set_rate(250_000, 26_000).unwrap();
        assert_eq!(clock.recalc_rate(26_000).unwrap(), 250_000);
    }

    #[test]
    fn legacy_recalc_treats_zero_idf_as_one() {
        let mut regs = MockRegisters::new();
        regs.preset(legacy::DSI_WRPCR, 50 << 2);
        let mut clock = clock(HwVersion::V1_31, regs);
        assert_eq!(clock.recalc_rate(27_000).unwrap(), 1_350_000);
    }

    #[test]
    fn round_rate_touches_no_register() {
        let clock = clock(HwVersion::V1_30, MockRegisters::new());
        assert_eq!(clock.round_rate(100_000, 27_000).unwrap(), 99_900);
        assert!(clock.bus().regs().writes().is_empty());
        assert_eq!(clock.bus().pclk().enables(), 0);
    }

    #[test]
    fn bus_clock_failure_aborts_enable() {
        let bus = PhyBus::new(MockRegisters::new(), MockPeripheralClock::failing(), NoopDelay::new());
        let mut clock = TxByteClock::new(bus, GenerationConfig::for_version(HwVersion::V1_41), PhyConfig::default());
        clock.complete_attach();

        assert_eq!(clock.enable(), Err(Error::BusClockUnavailable));
        assert_eq!(clock.state().phase, ClockPhase::Disabled);
        assert!(clock.bus().regs().writes().is_empty());
    }

    #[test]
    fn shared_clock_rejects_reentry() {
        let shared: SharedTxByteClock<NoopRawMutex, _, _, _> =
            Mutex::new(RefCell::new(clock(HwVersion::V1_41, MockRegisters::new())));

        let inner = with_clock(&shared, |_| with_clock(&shared, |_| ()));
        assert_eq!(inner, Ok(Err(Error::ClockBusy)));

        let rate = with_clock(&shared, |clock| clock.round_rate(445_500, 27_000)).unwrap();
        assert_eq!(rate, Ok(445_500));
    }
}
