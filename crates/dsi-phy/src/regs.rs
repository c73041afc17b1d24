//! Register interface and register maps of the DSI wrapper.
//!
//! Offsets are byte offsets from the DSI host base address. Register layouts
//! are described as [`Field`] tables per generation so that no call site
//! carries its own shift or mask literal.

use crate::pll::PllParams;

/// Builds a contiguous mask covering bits `low..=high`.
#[allow(clippy::arithmetic_side_effects)] // only evaluated on literal bit numbers <= 31
const fn genmask(high: u32, low: u32) -> u32 {
    (u32::MAX >> (31 - high)) & (u32::MAX << low)
}

#[allow(clippy::arithmetic_side_effects)] // only evaluated on literal bit numbers <= 31
const fn bit(n: u32) -> u32 {
    1 << n
}

/// A bit field inside a 32-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// Byte offset of the containing register.
    pub offset: u32,
    /// Mask of the field within the register.
    pub mask: u32,
}

impl Field {
    /// Describes the field `mask` of the register at `offset`.
    pub const fn new(offset: u32, mask: u32) -> Self {
        Self { offset, mask }
    }

    const fn shift(&self) -> u32 {
        self.mask.trailing_zeros()
    }

    /// Extracts the field value from a full register value.
    pub const fn extract(&self, reg: u32) -> u32 {
        match (reg & self.mask).checked_shr(self.shift()) {
            Some(v) => v,
            None => 0,
        }
    }

    /// Positions `value` in the field. Bits that do not fit are dropped.
    pub const fn encode(&self, value: u32) -> u32 {
        match value.checked_shl(self.shift()) {
            Some(v) => v & self.mask,
            None => 0,
        }
    }
}

/// Memory-mapped 32-bit register block.
///
/// Only [`read`](Self::read) and [`write`](Self::write) are required; the
/// read-modify-write helpers are built on top of them.
pub trait RegisterBlock {
    /// Reads the register at byte `offset`.
    fn read(&self, offset: u32) -> u32;

    /// Writes the register at byte `offset`.
    fn write(&mut self, offset: u32, value: u32);

    /// Sets `mask` bits, leaving the others untouched.
    fn set_bits(&mut self, offset: u32, mask: u32) {
        let value = self.read(offset);
        self.write(offset, value | mask);
    }

    /// Clears `mask` bits, leaving the others untouched.
    fn clear_bits(&mut self, offset: u32, mask: u32) {
        let value = self.read(offset);
        self.write(offset, value & !mask);
    }

    /// Replaces the `mask` bits with the matching bits of `value`.
    fn update_bits(&mut self, offset: u32, mask: u32, value: u32) {
        let current = self.read(offset);
        self.write(offset, (current & !mask) | (value & mask));
    }

    /// `true` when any bit of `mask` reads as one.
    fn any_set(&self, offset: u32, mask: u32) -> bool {
        self.read(offset) & mask != 0
    }

    /// Reads a field, right-aligned.
    fn read_field(&self, field: Field) -> u32 {
        field.extract(self.read(field.offset))
    }

    /// Writes a field, leaving the rest of its register untouched.
    fn write_field(&mut self, field: Field, value: u32) {
        self.update_bits(field.offset, field.mask, field.encode(value));
    }
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for &mut T {
    fn read(&self, offset: u32) -> u32 {
        (**self).read(offset)
    }

    fn write(&mut self, offset: u32, value: u32) {
        (**self).write(offset, value);
    }
}

/// Volatile access to a real register window.
///
/// Offsets outside the window, or not word aligned, read as zero and
/// ignore writes.
pub struct Mmio {
    base: *mut u32,
    len_bytes: usize,
}

impl Mmio {
    /// Wraps the register window starting at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be word aligned and valid for volatile reads and writes
    /// of `len_bytes` bytes for as long as the returned value lives, and no
    /// other code may access the window concurrently.
    pub unsafe fn new(base: *mut u32, len_bytes: usize) -> Self {
        Self { base, len_bytes }
    }

    fn word(&self, offset: u32) -> Option<*mut u32> {
        let offset = usize::try_from(offset).ok()?;
        if offset & 0b11 != 0 || offset >= self.len_bytes {
            return None;
        }
        // SAFETY: offset is inside the window checked above, and `new`
        // requires the whole window to be valid.
        Some(unsafe { self.base.byte_add(offset) })
    }
}

impl RegisterBlock for Mmio {
    fn read(&self, offset: u32) -> u32 {
        match self.word(offset) {
            // SAFETY: `word` only yields aligned pointers inside the window.
            Some(ptr) => unsafe { ptr.read_volatile() },
            None => 0,
        }
    }

    fn write(&mut self, offset: u32, value: u32) {
        if let Some(ptr) = self.word(offset) {
            // SAFETY: `word` only yields aligned pointers inside the window.
            unsafe { ptr.write_volatile(value) }
        }
    }
}

/// PLL divider fields of one generation, with their register encodings.
///
/// Each divider is stored as `value - bias`; the output divider is stored as
/// its base-2 exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllFields {
    /// PLL enable bit.
    pub enable: Field,
    /// Input division factor.
    pub idf: Field,
    /// Subtracted from `idf` before it is written.
    pub idf_bias: u32,
    /// Loop division factor.
    pub ndiv: Field,
    /// Subtracted from `ndiv` before it is written.
    pub ndiv_bias: u32,
    /// Output division factor exponent.
    pub odf: Field,
}

impl PllFields {
    /// Register code for the input divider.
    pub const fn idf_code(&self, idf: u32) -> u32 {
        idf.saturating_sub(self.idf_bias)
    }

    /// Register code for the loop divider.
    pub const fn ndiv_code(&self, ndiv: u32) -> u32 {
        ndiv.saturating_sub(self.ndiv_bias)
    }

    /// Register code for the output divider.
    pub const fn odf_code(odf: u32) -> u32 {
        odf.trailing_zeros()
    }

    /// Reads back the programmed dividers.
    ///
    /// A raw input divider of zero (the legacy reset value) reads as 1.
    pub fn read<R: RegisterBlock + ?Sized>(&self, regs: &R) -> PllParams {
        let idf = regs.read_field(self.idf).saturating_add(self.idf_bias).max(1);
        let ndiv = regs.read_field(self.ndiv).saturating_add(self.ndiv_bias);
        let odf = 1u32.checked_shl(regs.read_field(self.odf)).unwrap_or(0);
        PllParams { idf, ndiv, odf }
    }
}

/// Registers shared by every wrapper generation.
pub mod common {
    use super::bit;

    /// Hardware version register.
    pub const DSI_VERSION: u32 = 0x0000;

    /// Wrapper control register.
    pub const DSI_WCR: u32 = 0x0404;
    /// DSI enable.
    pub const WCR_DSIEN: u32 = bit(3);
}

/// v1.30 / v1.31 wrapper with its integrated regulator and PLL.
pub mod legacy {
    use super::{bit, genmask, Field, PllFields};

    /// Wrapper interrupt and status register.
    pub const DSI_WISR: u32 = 0x040C;
    /// PLL lock status.
    pub const WISR_PLLLS: u32 = bit(8);
    /// Regulator ready status.
    pub const WISR_RRS: u32 = bit(12);

    /// Wrapper PHY configuration register 0.
    pub const DSI_WPCR0: u32 = 0x0418;
    /// Unit interval times four, in 0.25 ns steps.
    pub const WPCR0_UIX4: Field = Field::new(DSI_WPCR0, genmask(5, 0));

    /// Wrapper regulator and PLL control register.
    pub const DSI_WRPCR: u32 = 0x0430;
    /// PLL enable.
    pub const WRPCR_PLLEN: u32 = bit(0);
    /// Regulator enable.
    pub const WRPCR_REGEN: u32 = bit(24);
    /// Bandgap reference enable.
    pub const WRPCR_BGREN: u32 = bit(28);

    /// Divider layout inside WRPCR.
    pub const PLL: PllFields = PllFields {
        enable: Field::new(DSI_WRPCR, WRPCR_PLLEN),
        idf: Field::new(DSI_WRPCR, genmask(14, 11)),
        idf_bias: 0,
        ndiv: Field::new(DSI_WRPCR, genmask(8, 2)),
        ndiv_bias: 0,
        odf: Field::new(DSI_WRPCR, genmask(17, 16)),
    };
}

/// v1.41 wrapper: double-buffered PLL registers and a separate PHY control
/// block in the host core.
pub mod phy141 {
    use super::{bit, genmask, Field, PllFields};

    /// Host PHY control register.
    pub const DSI_PCTLR: u32 = 0x00A0;
    /// Power enable.
    pub const PCTLR_PWEN: u32 = bit(0);
    /// Digital enable.
    pub const PCTLR_DEN: u32 = bit(1);
    /// Clock enable.
    pub const PCTLR_CKEN: u32 = bit(2);

    /// Host PHY status register.
    pub const DSI_PSR: u32 = 0x00B0;
    /// Clock lane in stop state.
    pub const PSR_PSSC: u32 = bit(2);

    /// Host PHY test control register 0.
    pub const DSI_PTCR0: u32 = 0x00B4;
    /// Test-interface reset.
    pub const PTCR0_TRSEN: u32 = bit(0);

    /// Wrapper PHY configuration register 1.
    pub const DSI_WPCR1: u32 = 0x0430;
    /// Configuration clock frequency code.
    pub const WPCR1_CCF: Field = Field::new(DSI_WPCR1, genmask(5, 0));
    /// High-speed frequency range code.
    pub const WPCR1_HSFR: Field = Field::new(DSI_WPCR1, genmask(14, 8));

    /// Wrapper regulator and PLL configuration register 0.
    pub const DSI_WRPCR0: u32 = 0x0434;

    /// Wrapper regulator and PLL configuration register 1.
    pub const DSI_WRPCR1: u32 = 0x0438;
    /// Proportional charge pump.
    pub const WRPCR1_PROP: Field = Field::new(DSI_WRPCR1, genmask(5, 0));
    /// Loop filter resistance.
    pub const WRPCR1_GMP: Field = Field::new(DSI_WRPCR1, genmask(7, 6));
    /// Integral charge pump.
    pub const WRPCR1_INT: Field = Field::new(DSI_WRPCR1, genmask(13, 8));
    /// Charge pump bias.
    pub const WRPCR1_BIAS: Field = Field::new(DSI_WRPCR1, genmask(22, 16));
    /// VCO operating range.
    pub const WRPCR1_VCO: Field = Field::new(DSI_WRPCR1, genmask(27, 24));

    /// Wrapper regulator and PLL configuration register 2.
    pub const DSI_WRPCR2: u32 = 0x043C;
    /// PLL output selection.
    pub const WRPCR2_SEL: Field = Field::new(DSI_WRPCR2, genmask(1, 0));
    /// PLL enable.
    pub const WRPCR2_PLLEN: u32 = bit(8);
    /// Copies the shadow registers into the PLL.
    pub const WRPCR2_UPD: u32 = bit(16);
    /// Resets the shadow registers.
    pub const WRPCR2_CLR: u32 = bit(24);

    /// Divider layout across WRPCR0 and WRPCR1.
    pub const PLL: PllFields = PllFields {
        enable: Field::new(DSI_WRPCR2, WRPCR2_PLLEN),
        idf: Field::new(DSI_WRPCR0, genmask(3, 0)),
        idf_bias: 1,
        ndiv: Field::new(DSI_WRPCR0, genmask(13, 4)),
        ndiv_bias: 2,
        odf: Field::new(DSI_WRPCR1, genmask(29, 28)),
    };
}
