//! Attach: version detection, supply handling and default-on bring-up.

#![allow(clippy::arithmetic_side_effects, clippy::unwrap_used)]

use dsi_phy::mocks::{FixedReference, MockPeripheralClock, MockRegisters, MockSupply};
use dsi_phy::regs::{common, legacy, phy141};
use dsi_phy::specs::{HWVER_130, HWVER_131, HWVER_141};
use dsi_phy::{ClockPhase, DsiPhy, Error, HwVersion, PhyConfig, PhyGeneration};
use embedded_hal_mock::eh1::delay::NoopDelay;
use proptest::prelude::*;

type Phy = DsiPhy<MockRegisters, MockPeripheralClock, NoopDelay, FixedReference>;

fn attach_with(
    version: u32,
    pclk: MockPeripheralClock,
    supply: &mut MockSupply,
    config: PhyConfig,
) -> Result<Phy, Error> {
    let mut regs = MockRegisters::new();
    regs.preset(common::DSI_VERSION, version);
    regs.preset(legacy::DSI_WISR, legacy::WISR_RRS | legacy::WISR_PLLLS);
    regs.preset(phy141::DSI_PSR, phy141::PSR_PSSC);
    DsiPhy::attach(regs, pclk, NoopDelay::new(), FixedReference(27_000), supply, config)
}

#[test]
fn known_versions_select_their_generation() {
    for (raw, version, generation, lanes) in [
        (HWVER_130, HwVersion::V1_30, PhyGeneration::Legacy, 2),
        (HWVER_131 | 0x0A, HwVersion::V1_31, PhyGeneration::Legacy, 2),
        (HWVER_141, HwVersion::V1_41, PhyGeneration::Gen141, 4),
    ] {
        let mut supply = MockSupply::new();
        let phy = attach_with(raw, MockPeripheralClock::new(), &mut supply, PhyConfig::default())
            .ok()
            .unwrap();

        assert_eq!(phy.generation().version, version);
        assert_eq!(phy.generation().generation, generation);
        assert_eq!(phy.generation().max_data_lanes, lanes);
        assert!(phy.clock().is_attached());
        assert_eq!(phy.clock().state().phase, ClockPhase::Disabled);
        assert!(phy.clock().bus().regs().writes().is_empty());
        assert_eq!(supply.enables(), 1);
        assert!(supply.is_released());
        assert!(phy.clock().bus().pclk().is_balanced());
    }
}

#[test]
fn supply_failure_stops_attach() {
    let mut supply = MockSupply::failing();
    let result = attach_with(HWVER_131, MockPeripheralClock::new(), &mut supply, PhyConfig::default());
    assert_eq!(result.err(), Some(Error::SupplyUnavailable));
    assert!(supply.is_released());
}

#[test]
fn bus_clock_failure_releases_the_supply() {
    let mut supply = MockSupply::new();
    let result = attach_with(HWVER_131, MockPeripheralClock::failing(), &mut supply, PhyConfig::default());
    assert_eq!(result.err(), Some(Error::BusClockUnavailable));
    assert_eq!(supply.enables(), 1);
    assert!(supply.is_released());
}

#[test]
fn default_on_enables_the_clock_during_attach() {
    let config = PhyConfig {
        default_on: true,
        ..PhyConfig::default()
    };
    for (raw, enable_offset, enable_mask) in [
        (HWVER_131, legacy::DSI_WRPCR, legacy::WRPCR_PLLEN),
        (HWVER_141, phy141::DSI_WRPCR2, phy141::WRPCR2_PLLEN),
    ] {
        let mut supply = MockSupply::new();
        let phy = attach_with(raw, MockPeripheralClock::new(), &mut supply, config)
            .ok()
            .unwrap();

        assert_eq!(phy.clock().state().phase, ClockPhase::Enabled);
        assert_ne!(phy.clock().bus().regs().peek(enable_offset) & enable_mask, 0);
        assert!(supply.is_released());
    }
}

#[test]
fn release_returns_the_handles() {
    let mut supply = MockSupply::new();
    let phy = attach_with(HWVER_141, MockPeripheralClock::new(), &mut supply, PhyConfig::default())
        .ok()
        .unwrap();
    assert_eq!(phy.reference_khz(), 27_000);

    let (regs, pclk, _delay, reference) = phy.release();
    assert_eq!(regs.peek(common::DSI_VERSION), HWVER_141);
    assert!(pclk.is_balanced());
    assert_eq!(reference.0, 27_000);
}

proptest! {
    /// Anything but the three known identifiers is refused, and the supply
    /// is released either way.
    #[test]
    fn unknown_versions_are_refused(raw in any::<u32>()) {
        let id = raw & 0xFFFF_FF00;
        prop_assume!(![HWVER_130, HWVER_131, HWVER_141].contains(&id));

        let mut supply = MockSupply::new();
        let result = attach_with(raw, MockPeripheralClock::new(), &mut supply, PhyConfig::default());

        prop_assert_eq!(result.err(), Some(Error::UnsupportedHardwareVersion(id)));
        prop_assert!(supply.is_released());
    }
}
