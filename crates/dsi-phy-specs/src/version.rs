//! Wrapper IP version identifiers.
//!
//! The DSI_VERSION register (offset 0x00) reports the IP revision as ASCII
//! digits in bits 31..8; bits 7..0 are a sub-revision the driver ignores.

/// Bits of DSI_VERSION that identify the IP revision.
pub const VERSION_MASK: u32 = 0xFFFF_FF00;

/// IP version 1.30 ("130" in ASCII).
pub const HWVER_130: u32 = 0x3133_3000;

/// IP version 1.31 ("131" in ASCII). Same register layout as 1.30, doubled lane limits.
pub const HWVER_131: u32 = 0x3133_3100;

/// IP version 1.41 ("141" in ASCII). New PHY with table-driven PLL tuning.
pub const HWVER_141: u32 = 0x3134_3100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_survive_the_mask() {
        for v in [HWVER_130, HWVER_131, HWVER_141] {
            assert_eq!(v & VERSION_MASK, v);
        }
    }

    #[test]
    fn versions_encode_ascii_digits() {
        assert_eq!(&HWVER_130.to_be_bytes()[..3], b"130");
        assert_eq!(&HWVER_131.to_be_bytes()[..3], b"131");
        assert_eq!(&HWVER_141.to_be_bytes()[..3], b"141");
    }
}
