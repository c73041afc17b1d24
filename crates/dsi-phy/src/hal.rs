//! Hardware collaborators of the PHY driver.
//!
//! The register block is only readable while its bus clock runs, so every
//! access goes through [`PhyBus::with_bus_clock`], which holds a
//! [`BusClockGuard`] for the duration of the closure.

use embedded_hal::delay::DelayNs;

use crate::error::{Error, Result};
use crate::regs::RegisterBlock;

/// Gate of the DSI register block's bus (APB) clock.
pub trait PeripheralClock {
    /// Error reported by the clock controller.
    type Error: core::fmt::Debug;

    /// Ungates the clock.
    fn enable(&mut self) -> core::result::Result<(), Self::Error>;

    /// Gates the clock.
    fn disable(&mut self);
}

/// PLL reference clock (typically the HSE oscillator).
pub trait ReferenceClock {
    /// Current rate in kHz.
    fn rate_khz(&self) -> u32;
}

/// PHY supply rail.
pub trait Supply {
    /// Error reported by the regulator.
    type Error: core::fmt::Debug;

    /// Powers the rail.
    fn enable_supply(&mut self) -> core::result::Result<(), Self::Error>;

    /// Releases the rail.
    fn disable_supply(&mut self);
}

/// Holds a bus clock enabled and gates it again on drop.
pub struct BusClockGuard<'a, P: PeripheralClock> {
    clock: &'a mut P,
}

impl<'a, P: PeripheralClock> BusClockGuard<'a, P> {
    /// Enables `clock` for the lifetime of the guard.
    pub fn acquire(clock: &'a mut P) -> Result<Self> {
        match clock.enable() {
            Ok(()) => Ok(Self { clock }),
            Err(_e) => {
                error!("DSI bus clock enable failed");
                Err(Error::BusClockUnavailable)
            }
        }
    }
}

impl<P: PeripheralClock> Drop for BusClockGuard<'_, P> {
    fn drop(&mut self) {
        self.clock.disable();
    }
}

/// The register block, its bus clock and a delay source, owned together.
pub struct PhyBus<R, P, D> {
    regs: R,
    pclk: P,
    delay: D,
}

impl<R, P, D> PhyBus<R, P, D>
where
    R: RegisterBlock,
    P: PeripheralClock,
    D: DelayNs,
{
    /// Bundles the hardware handles.
    pub fn new(regs: R, pclk: P, delay: D) -> Self {
        Self { regs, pclk, delay }
    }

    /// Runs `f` with the bus clock enabled.
    ///
    /// The clock is gated again when `f` returns, on every path.
    pub fn with_bus_clock<T>(&mut self, f: impl FnOnce(&mut R, &mut D) -> T) -> Result<T> {
        let _guard = BusClockGuard::acquire(&mut self.pclk)?;
        Ok(f(&mut self.regs, &mut self.delay))
    }

    /// Register block, for inspection without the bus clock (mocks only).
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Bus clock handle.
    pub fn pclk(&self) -> &P {
        &self.pclk
    }

    /// Delay source.
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Splits the bundle back into its parts.
    pub fn release(self) -> (R, P, D) {
        (self.regs, self.pclk, self.delay)
    }
}
