//! Mock implementations for testing
//!
//! Host-side stand-ins for the register block, the bus clock, the delay
//! source, the reference clock and the PHY supply.

#![cfg(any(test, feature = "std"))]

use core::cell::Cell;

use embedded_hal::delay::DelayNs;

use crate::hal::{PeripheralClock, ReferenceClock, Supply};
use crate::regs::RegisterBlock;

/// Words covered by [`MockRegisters`]: offsets 0x000 up to WRPCR2 (0x43C).
const WORDS: usize = 0x110;

/// Capacity of the [`MockRegisters`] write log.
pub const WRITE_LOG_CAPACITY: usize = 256;

/// One recorded register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWrite {
    /// Byte offset.
    pub offset: u32,
    /// Value written.
    pub value: u32,
}

struct LateBits {
    offset: u32,
    mask: u32,
    reads_left: Cell<u32>,
}

/// Register file with a write log.
///
/// Status bits can be preset, or made to appear after a number of reads to
/// exercise the polling loops. Out-of-window offsets read as zero and
/// ignore writes (but are still logged).
///
/// The log keeps the first [`WRITE_LOG_CAPACITY`] writes; later ones still
/// reach the register file and set [`overflowed`](Self::overflowed).
pub struct MockRegisters {
    words: [u32; WORDS],
    late: heapless::Vec<LateBits, 4>,
    writes: heapless::Vec<RegWrite, WRITE_LOG_CAPACITY>,
    overflowed: bool,
}

impl MockRegisters {
    /// All registers zero.
    pub fn new() -> Self {
        Self {
            words: [0; WORDS],
            late: heapless::Vec::new(),
            writes: heapless::Vec::new(),
            overflowed: false,
        }
    }

    fn index(offset: u32) -> Option<usize> {
        usize::try_from(offset / 4).ok().filter(|i| *i < WORDS)
    }

    /// Sets a register without logging a write.
    pub fn preset(&mut self, offset: u32, value: u32) {
        if let Some(word) = Self::index(offset).and_then(|i| self.words.get_mut(i)) {
            *word = value;
        }
    }

    /// Current register value, without counting as a read.
    pub fn peek(&self, offset: u32) -> u32 {
        Self::index(offset)
            .and_then(|i| self.words.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Makes `mask` read as set from the `reads + 1`-th read of `offset` on.
    pub fn set_after_reads(&mut self, offset: u32, mask: u32, reads: u32) {
        let _ = self.late.push(LateBits {
            offset,
            mask,
            reads_left: Cell::new(reads),
        });
    }

    /// Every write, in order.
    pub fn writes(&self) -> &[RegWrite] {
        &self.writes
    }

    /// `true` once a write did not fit in the log.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Values written to `offset`, in order.
    pub fn writes_to(&self, offset: u32) -> impl Iterator<Item = u32> + '_ {
        self.writes
            .iter()
            .filter(move |w| w.offset == offset)
            .map(|w| w.value)
    }
}

impl Default for MockRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBlock for MockRegisters {
    fn read(&self, offset: u32) -> u32 {
        let mut value = self.peek(offset);
        for late in self.late.iter().filter(|late| late.offset == offset) {
            match late.reads_left.get() {
                0 => value |= late.mask,
                n => late.reads_left.set(n.saturating_sub(1)),
            }
        }
        value
    }

    fn write(&mut self, offset: u32, value: u32) {
        if self.writes.push(RegWrite { offset, value }).is_err() {
            self.overflowed = true;
        }
        self.preset(offset, value);
    }
}

/// Bus clock that counts enables and disables.
#[derive(Debug, Default)]
pub struct MockPeripheralClock {
    enables: u32,
    disables: u32,
    fail: bool,
}

impl MockPeripheralClock {
    /// A clock that always enables.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock whose enable always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Successful enables so far.
    pub fn enables(&self) -> u32 {
        self.enables
    }

    /// Disables so far.
    pub fn disables(&self) -> u32 {
        self.disables
    }

    /// `true` when every enable was matched by a disable.
    pub fn is_balanced(&self) -> bool {
        self.enables == self.disables
    }
}

impl PeripheralClock for MockPeripheralClock {
    type Error = ();

    fn enable(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.enables = self.enables.saturating_add(1);
        Ok(())
    }

    fn disable(&mut self) {
        self.disables = self.disables.saturating_add(1);
    }
}

/// Delay source that only accumulates the requested time.
#[derive(Debug, Default)]
pub struct MockDelay {
    elapsed_ns: u64,
}

impl MockDelay {
    /// Zero elapsed time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requested delay (µs, truncated).
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns / 1_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns = self.elapsed_ns.saturating_add(u64::from(ns));
    }
}

/// Reference clock with a fixed rate (kHz).
#[derive(Debug, Clone, Copy)]
pub struct FixedReference(pub u32);

impl ReferenceClock for FixedReference {
    fn rate_khz(&self) -> u32 {
        self.0
    }
}

/// Supply rail that counts enables and disables.
#[derive(Debug, Default)]
pub struct MockSupply {
    enables: u32,
    disables: u32,
    fail: bool,
}

impl MockSupply {
    /// A rail that always powers up.
    pub fn new() -> Self {
        Self::default()
    }

    /// A rail whose enable always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Successful enables so far.
    pub fn enables(&self) -> u32 {
        self.enables
    }

    /// `true` when the rail is currently released.
    pub fn is_released(&self) -> bool {
        self.enables == self.disables
    }
}

impl Supply for MockSupply {
    type Error = ();

    fn enable_supply(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.enables = self.enables.saturating_add(1);
        Ok(())
    }

    fn disable_supply(&mut self) {
        self.disables = self.disables.saturating_add(1);
    }
}
