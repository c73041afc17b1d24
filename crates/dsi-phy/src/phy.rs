//! PHY operations used by the DSI host during bring-up and mode set.
//!
//! [`DsiPhy`] owns the byte clock node and the reference clock. It detects
//! the hardware generation at attach time and dispatches every operation on
//! it.

use embedded_hal::delay::DelayNs;

use dsi_phy_specs::DphyTiming;

use crate::clock::{pulse_bits, ClockProvider, TxByteClock};
use crate::config::PhyConfig;
use crate::error::{Error, Result};
use crate::generation::{GenerationConfig, PhyGeneration};
use crate::hal::{PeripheralClock, PhyBus, ReferenceClock, Supply};
use crate::pll;
use crate::regs::{common, phy141, RegisterBlock};
use crate::timing::{self, ModeVerdict, VideoTimingRequest};

/// An attached DSI PHY.
pub struct DsiPhy<R, P, D, C> {
    clock: TxByteClock<R, P, D>,
    reference: C,
    lane_mbps: u32,
}

impl<R, P, D, C> DsiPhy<R, P, D, C>
where
    R: RegisterBlock,
    P: PeripheralClock,
    D: DelayNs,
    C: ReferenceClock,
{
    /// Powers the PHY, reads its version and builds the clock node.
    ///
    /// The supply is released again before returning, on success and on
    /// every error path. With `config.default_on` the byte clock is enabled
    /// as the last step.
    pub fn attach<S: Supply>(
        regs: R,
        pclk: P,
        delay: D,
        reference: C,
        supply: &mut S,
        config: PhyConfig,
    ) -> Result<Self> {
        if supply.enable_supply().is_err() {
            error!("DSI PHY supply enable failed");
            return Err(Error::SupplyUnavailable);
        }
        let attached = Self::attach_powered(PhyBus::new(regs, pclk, delay), reference, config);
        supply.disable_supply();
        attached
    }

    fn attach_powered(mut bus: PhyBus<R, P, D>, reference: C, config: PhyConfig) -> Result<Self> {
        let raw = bus.with_bus_clock(|regs, _| regs.read(common::DSI_VERSION))?;
        let generation = GenerationConfig::from_version_register(raw)?;
        debug!("DSI wrapper version {}", generation.version.id());

        let mut clock = TxByteClock::new(bus, generation, config);
        clock.complete_attach();

        if config.default_on {
            let report = clock.enable()?;
            if report.timed_out() {
                warn!("byte clock enabled at attach with a poll timeout");
            }
        }

        Ok(Self {
            clock,
            reference,
            lane_mbps: 0,
        })
    }

    /// Detected generation.
    pub fn generation(&self) -> &GenerationConfig {
        self.clock.generation()
    }

    /// Byte clock node.
    pub fn clock(&self) -> &TxByteClock<R, P, D> {
        &self.clock
    }

    /// Byte clock node, for rate and enable requests from the clock tree.
    pub fn clock_mut(&mut self) -> &mut TxByteClock<R, P, D> {
        &mut self.clock
    }

    /// Current reference rate (kHz).
    pub fn reference_khz(&self) -> u32 {
        self.reference.rate_khz()
    }

    /// Lane rate from the last [`lane_rate_for_mode`](Self::lane_rate_for_mode).
    pub fn negotiated_lane_mbps(&self) -> u32 {
        self.lane_mbps
    }

    /// Picks and programs the lane bit rate for a mode; returns it in Mbit/s.
    ///
    /// The requested rate gets burst headroom and is clamped into the PHY
    /// range. The legacy PHY is programmed right away; the v1.41 PHY is
    /// programmed by [`init`](Self::init). Asking for more lanes than the
    /// wrapper has is an [`Error::InvalidMode`].
    pub fn lane_rate_for_mode(&mut self, request: &VideoTimingRequest) -> Result<u32> {
        let range = self.generation().lane_range;
        let generation = self.generation().generation;
        let reference_khz = self.reference_khz();
        let max_lanes = self.generation().max_data_lanes;
        if request.lanes > u32::from(max_lanes) {
            error!("{} data lanes requested, wrapper has {}", request.lanes, max_lanes);
            return Err(Error::InvalidMode);
        }

        let requested = request
            .lane_kbps()
            .filter(|kbps| *kbps > 0)
            .ok_or(Error::InvalidMode)?;
        let requested = u32::try_from(requested).unwrap_or(u32::MAX);
        let lane_kbps = range.clamp(requested);
        if lane_kbps > requested {
            warn!("lane rate {} kbit/s below PHY minimum, using {}", requested, lane_kbps);
        } else if lane_kbps < requested {
            warn!("lane rate {} kbit/s above PHY maximum, using {}", requested, lane_kbps);
        }

        let achieved_lane_kbps = match generation {
            PhyGeneration::Legacy => {
                let target = pll::output_from_lane_kbps(generation, lane_kbps);
                let solution = self.clock.set_rate(target, reference_khz)?;
                pll::lane_kbps_from_output(generation, solution.achieved_khz)
            }
            PhyGeneration::Gen141 => {
                pll::solve_for_lane_rate(self.generation(), reference_khz, lane_kbps)?.lane_kbps
            }
        };

        self.lane_mbps = achieved_lane_kbps / 1_000;
        debug!(
            "pll_in {} kHz lane {} kbit/s -> {} Mbit/s",
            reference_khz, lane_kbps, self.lane_mbps
        );
        Ok(self.lane_mbps)
    }

    /// Brings the PHY up for the negotiated lane rate.
    pub fn init(&mut self) -> Result<()> {
        match self.generation().generation {
            PhyGeneration::Legacy => {
                if !self.clock.is_enabled()? {
                    self.clock.enable()?;
                }
                Ok(())
            }
            PhyGeneration::Gen141 => self.init_phy_141(),
        }
    }

    fn init_phy_141(&mut self) -> Result<()> {
        let hold_us = self.clock.config().commit_hold_us;
        self.clock.bus_mut().with_bus_clock(|regs, delay| {
            regs.write(phy141::DSI_PCTLR, 0);
            pulse_bits(regs, delay, phy141::DSI_WRPCR2, phy141::WRPCR2_CLR, hold_us);
            pulse_bits(regs, delay, phy141::DSI_PTCR0, phy141::PTCR0_TRSEN, hold_us);
        })?;

        if self.clock.is_enabled()? {
            self.clock.disable()?;
        }

        let generation = self.generation().generation;
        let target = pll::output_from_lane_kbps(generation, self.lane_mbps.saturating_mul(1_000));
        let reference_khz = self.reference_khz();
        self.clock.set_rate(target, reference_khz)?;

        let report = self.clock.enable()?;
        if report.timed_out() {
            warn!("DSI PHY init finished with a poll timeout");
        }
        Ok(())
    }

    /// Enables the DSI wrapper.
    pub fn power_on(&mut self) -> Result<()> {
        debug!("DSI wrapper on");
        self.clock
            .bus_mut()
            .with_bus_clock(|regs, _| regs.set_bits(common::DSI_WCR, common::WCR_DSIEN))
    }

    /// Stops the byte clock and disables the DSI wrapper.
    pub fn power_off(&mut self) -> Result<()> {
        debug!("DSI wrapper off");
        self.clock.disable()?;
        self.clock
            .bus_mut()
            .with_bus_clock(|regs, _| regs.clear_bits(common::DSI_WCR, common::WCR_DSIEN))
    }

    /// HS/LP transition times at `lane_mbps`.
    pub fn dphy_timing(&self, lane_mbps: u32) -> DphyTiming {
        timing::dphy_timing(self.generation().generation, lane_mbps)
    }

    /// Feasibility of a mode with the current reference clock.
    pub fn check_mode(&self, request: &VideoTimingRequest) -> ModeVerdict {
        timing::check_mode(request, self.generation(), self.reference_khz())
    }

    /// Gives back the hardware handles.
    pub fn release(self) -> (R, P, D, C) {
        let (regs, pclk, delay) = self.clock.into_bus().release();
        (regs, pclk, delay, self.reference)
    }
}
