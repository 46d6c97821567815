//! IPv4 address helpers
//!
//! Addresses are handled as `u32` in network byte order (most significant
//! octet first), which is what `u32::from(Ipv4Addr)` produces. Masks follow
//! the same convention.

use std::net::Ipv4Addr;

use crate::{IpCalcError, Result};

/// Number of bits in an IPv4 address
pub const ADDRESS_BITS: u8 = 32;

/// Build the subnet mask for a prefix length
///
/// Octets are filled left to right: a full `0xFF` while at least eight
/// prefix bits remain, then a partial octet, then zeros. Values above 32
/// are clamped; use [`check_prefix_len`] first when the input is untrusted.
///
/// # Examples
///
/// ```
/// use ipcalc_core::addr::prefix_to_mask;
///
/// assert_eq!(prefix_to_mask(0), 0);
/// assert_eq!(prefix_to_mask(20), 0xFFFF_F000);
/// assert_eq!(prefix_to_mask(32), u32::MAX);
/// ```
pub fn prefix_to_mask(prefix_len: u8) -> u32 {
    let mut remaining = prefix_len.min(ADDRESS_BITS);
    let mut octets = [0u8; 4];

    for octet in octets.iter_mut() {
        if remaining >= 8 {
            *octet = 0xFF;
            remaining -= 8;
        } else {
            *octet = (0xFFu16 << (8 - remaining)) as u8;
            remaining = 0;
        }
    }

    u32::from_be_bytes(octets)
}

/// Prefix length of a mask, counted as its number of one-bits
///
/// Holes are not detected: `255.0.255.0` reports 16. Pair with
/// [`is_contiguous_mask`] when that matters.
pub fn mask_prefix_len(mask: u32) -> u8 {
    mask.count_ones() as u8
}

/// Whether a mask is contiguous ones followed by contiguous zeros
pub fn is_contiguous_mask(mask: u32) -> bool {
    mask.leading_ones() + mask.trailing_zeros() == u32::from(ADDRESS_BITS)
}

/// Validate a prefix length, naming it `prefix_length` on failure
pub fn check_prefix_len(prefix_len: i32) -> Result<u8> {
    if !(0..=i32::from(ADDRESS_BITS)).contains(&prefix_len) {
        return Err(IpCalcError::invalid(
            "prefix_length",
            format!("{} is outside 0-32", prefix_len),
        ));
    }

    Ok(prefix_len as u8)
}

/// Parse a dotted-quad IPv4 address
///
/// Blank input is a [`IpCalcError::MissingArgument`]; anything that is not
/// exactly four decimal octets is an [`IpCalcError::InvalidArgument`]. Both
/// carry `name`.
pub fn parse_ipv4(name: &'static str, text: &str) -> Result<Ipv4Addr> {
    if text.trim().is_empty() {
        return Err(IpCalcError::missing(name));
    }

    text.parse::<Ipv4Addr>().map_err(|_| {
        IpCalcError::invalid(
            name,
            format!("`{}` is not a dotted-quad IPv4 address", text),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_to_mask() {
        assert_eq!(prefix_to_mask(0), 0x0000_0000);
        assert_eq!(prefix_to_mask(1), 0x8000_0000);
        assert_eq!(prefix_to_mask(8), 0xFF00_0000);
        assert_eq!(prefix_to_mask(12), 0xFFF0_0000);
        assert_eq!(prefix_to_mask(24), 0xFFFF_FF00);
        assert_eq!(prefix_to_mask(25), 0xFFFF_FF80);
        assert_eq!(prefix_to_mask(31), 0xFFFF_FFFE);
        assert_eq!(prefix_to_mask(32), 0xFFFF_FFFF);
    }

    #[test]
    fn test_prefix_to_mask_matches_shift() {
        for prefix_len in 1..=32u8 {
            let expected = u32::MAX << (32 - prefix_len);
            assert_eq!(prefix_to_mask(prefix_len), expected, "/{}", prefix_len);
        }
    }

    #[test]
    fn test_mask_prefix_len() {
        assert_eq!(mask_prefix_len(0xFFFF_FF00), 24);
        assert_eq!(mask_prefix_len(0), 0);
        assert_eq!(mask_prefix_len(u32::MAX), 32);
        // 255.0.255.0 has holes but still counts 16 bits
        assert_eq!(mask_prefix_len(0xFF00_FF00), 16);
    }

    #[test]
    fn test_is_contiguous_mask() {
        assert!(is_contiguous_mask(0));
        assert!(is_contiguous_mask(u32::MAX));
        assert!(is_contiguous_mask(0xFFFF_FE00));
        assert!(!is_contiguous_mask(0xFF00_FF00));
        assert!(!is_contiguous_mask(0x0000_00FF));
    }

    #[test]
    fn test_check_prefix_len() {
        assert_eq!(check_prefix_len(0), Ok(0));
        assert_eq!(check_prefix_len(32), Ok(32));

        let err = check_prefix_len(-1).unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(err.name(), "prefix_length");
        assert!(check_prefix_len(33).is_err());
    }

    #[test]
    fn test_parse_ipv4() {
        assert_eq!(
            parse_ipv4("address", "192.168.1.10"),
            Ok(Ipv4Addr::new(192, 168, 1, 10))
        );

        assert!(parse_ipv4("address", "").unwrap_err().is_missing());
        assert!(parse_ipv4("address", "   ").unwrap_err().is_missing());

        for bad in ["192.168.1", "192.168.1.256", "1.2.3.4.5", "::1"] {
            let err = parse_ipv4("subnet_mask", bad).unwrap_err();
            assert!(err.is_invalid(), "{}", bad);
            assert_eq!(err.name(), "subnet_mask");
        }
    }
}
