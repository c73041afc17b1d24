//! Driver core for the DesignWare MIPI DSI PHY wrapper on STM32 parts
//!
//! This crate synthesizes the PHY PLL from a fixed reference clock, exposes
//! the result as a byte-clock node with a uniform enable / rate contract
//! across two hardware generations, and decides whether a video mode is
//! achievable on the link.
//!
//! # Architecture
//!
//! ```text
//! Display pipeline (mode set, bridge)
//!         ↓
//! DsiPhy (attach, init, power, lane-rate negotiation)     phy
//!         ↓
//! TxByteClock (enable / disable / rates)  ←→  check_mode  clock, timing
//!         ↓                                       ↓
//! PLL solvers (legacy, v1.41)                            pll
//!         ↓
//! GenerationConfig + dsi-phy-specs tables                generation
//!         ↓
//! RegisterBlock / PeripheralClock / DelayNs              regs, hal
//! ```
//!
//! The solvers and the mode checker are pure functions. Only the clock node
//! and the PHY layer touch registers, and every register access is
//! bracketed by a [`hal::BusClockGuard`].
//!
//! # Features
//!
//! - `std` (default): host builds, [`mocks`] module, `std::error::Error`
//! - `defmt`: defmt logging and `defmt::Format` derives (hardware builds)
//! - `tracing`: log through the `tracing` facade (host builds)
//!
//! # Example
//!
//! ```
//! use dsi_phy::{pll, GenerationConfig, HwVersion};
//!
//! let generation = GenerationConfig::for_version(HwVersion::V1_31);
//! let solution = pll::solve_for_output(&generation, 27_000, 891_000).unwrap();
//! assert_eq!(solution.achieved_khz, 891_000);
//! assert_eq!((solution.params.idf, solution.params.ndiv, solution.params.odf), (1, 33, 1));
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this register-level driver crate:
#![allow(clippy::doc_markdown)] // register and field names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Must come first: the logging macros are used by every other module.
mod fmt;

pub mod clock;
pub mod config;
pub mod error;
pub mod generation;
pub mod hal;
pub mod phy;
pub mod pll;
pub mod regs;
pub mod timing;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use clock::{
    with_clock, ClockPhase, ClockProvider, ClockState, EnableReport, PollOutcome,
    SharedTxByteClock, TxByteClock,
};
pub use config::{PhyConfig, PollConfig};
pub use error::{Error, Result};
pub use generation::{GenerationConfig, HwVersion, PhyGeneration};
pub use hal::{BusClockGuard, PeripheralClock, PhyBus, ReferenceClock, Supply};
pub use phy::DsiPhy;
pub use pll::{PllParams, SearchSpace, Solution};
pub use regs::{Field, Mmio, RegisterBlock};
pub use timing::{
    check_mode, ModeAccepted, ModeRejection, ModeVerdict, PixelFormat, VideoTimingRequest,
};

// Static hardware data, re-exported so callers need a single dependency.
pub use dsi_phy_specs as specs;
pub use dsi_phy_specs::{DphyTiming, LaneRateRange};
