//! CIDR text parsing and textual construction helpers

use std::net::Ipv4Addr;
use std::str::FromStr;

use ipcalc_core::addr::{check_prefix_len, parse_ipv4};
use ipcalc_core::{IpCalcError, Result};

use crate::{MaskPolicy, NetworkBlock};

/// Parse `a.b.c.d/n` notation
///
/// # Errors
///
/// - [`IpCalcError::MissingArgument`] naming `cidr` for blank input
/// - [`IpCalcError::InvalidArgument`] naming `cidr` unless there is exactly
///   one `/`, `address` for a malformed dotted quad, or `prefix_length` for
///   anything but a decimal integer in 0-32
///
/// # Examples
///
/// ```
/// use ipcalc_cidr::parse_cidr;
///
/// let block = parse_cidr("10.0.0.0/8").unwrap();
/// assert_eq!(block.prefix_len(), 8);
/// assert!(parse_cidr("10.0.0.0").is_err());
/// ```
pub fn parse_cidr(text: &str) -> Result<NetworkBlock> {
    if text.trim().is_empty() {
        return Err(IpCalcError::missing("cidr"));
    }

    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() != 2 {
        return Err(IpCalcError::invalid(
            "cidr",
            "invalid CIDR notation format, expected a.b.c.d/n",
        ));
    }

    let address = parts[0].parse::<Ipv4Addr>().map_err(|_| {
        IpCalcError::invalid(
            "address",
            format!("`{}` is not a dotted-quad IPv4 address", parts[0]),
        )
    })?;
    let prefix_len = parse_prefix_len(parts[1])?;

    tracing::debug!(cidr = text, "parsed CIDR notation");
    NetworkBlock::new(address, prefix_len)
}

/// Decimal digits only; `+24`, `-1` and ` 24` are all rejected
fn parse_prefix_len(text: &str) -> Result<i32> {
    let invalid = || {
        IpCalcError::invalid(
            "prefix_length",
            format!("`{}` is not a prefix length between 0 and 32", text),
        )
    };

    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    text.parse::<i32>().map_err(|_| invalid())
}

/// Build a block from address text and a prefix length
pub fn calculate(address: &str, prefix_len: i32) -> Result<NetworkBlock> {
    let prefix_len = check_prefix_len(prefix_len)?;
    let address = parse_ipv4("address", address)?;
    NetworkBlock::new(address, i32::from(prefix_len))
}

/// Build a block from address text and mask text
///
/// `policy` decides whether a mask with holes is accepted.
pub fn calculate_with_mask(
    address: &str,
    mask: &str,
    policy: MaskPolicy,
) -> Result<NetworkBlock> {
    let address = parse_ipv4("address", address)?;
    let mask = parse_ipv4("subnet_mask", mask)?;
    NetworkBlock::with_mask_policy(address, mask, policy)
}

/// Subnet mask for a prefix length
///
/// ```
/// use ipcalc_cidr::mask_for_prefix;
/// use std::net::Ipv4Addr;
///
/// assert_eq!(mask_for_prefix(22).unwrap(), Ipv4Addr::new(255, 255, 252, 0));
/// ```
pub fn mask_for_prefix(prefix_len: i32) -> Result<Ipv4Addr> {
    let block = NetworkBlock::new(Ipv4Addr::UNSPECIFIED, prefix_len)?;
    Ok(block.subnet_mask())
}

impl FromStr for NetworkBlock {
    type Err = IpCalcError;

    fn from_str(s: &str) -> Result<Self> {
        parse_cidr(s)
    }
}

impl TryFrom<&str> for NetworkBlock {
    type Error = IpCalcError;

    fn try_from(value: &str) -> Result<Self> {
        parse_cidr(value)
    }
}

impl TryFrom<String> for NetworkBlock {
    type Error = IpCalcError;

    fn try_from(value: String) -> Result<Self> {
        parse_cidr(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cidr() {
        let block = parse_cidr("192.168.1.0/24").unwrap();
        assert_eq!(block.network(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(block.prefix_len(), 24);
    }

    #[test]
    fn test_parse_cidr_keeps_host_bits_in_address() {
        let block = parse_cidr("10.20.30.40/8").unwrap();
        assert_eq!(block.address(), Ipv4Addr::new(10, 20, 30, 40));
        assert_eq!(block.to_cidr_string(), "10.0.0.0/8");
    }

    #[test]
    fn test_parse_cidr_missing() {
        assert_eq!(parse_cidr(""), Err(IpCalcError::missing("cidr")));
        assert!(parse_cidr("  ").unwrap_err().is_missing());
    }

    #[test]
    fn test_parse_cidr_bad_format() {
        for bad in ["192.168.1.0", "192.168.1.0/24/8", "/"] {
            let err = parse_cidr(bad).unwrap_err();
            assert!(err.is_invalid(), "{}", bad);
        }
        assert_eq!(parse_cidr("192.168.1.0").unwrap_err().name(), "cidr");
    }

    #[test]
    fn test_parse_cidr_bad_address() {
        let cases = [
            "192.168.1.256/24",
            "192.168.1/24",
            "/24",
            "::1/24",
            "a.b.c.d/8",
        ];
        for bad in cases {
            let err = parse_cidr(bad).unwrap_err();
            assert!(err.is_invalid(), "{}", bad);
            assert_eq!(err.name(), "address", "{}", bad);
        }
    }

    #[test]
    fn test_parse_cidr_bad_prefix() {
        for prefix in ["", "33", "+24", "-1", "x", " 24", "99999999999"] {
            let bad = format!("192.168.1.0/{}", prefix);
            let err = parse_cidr(&bad).unwrap_err();
            assert!(err.is_invalid(), "{}", bad);
            assert_eq!(err.name(), "prefix_length", "{}", bad);
        }
    }

    #[test]
    fn test_from_str_and_try_from() {
        let parsed: NetworkBlock = "10.0.0.0/8".parse().unwrap();
        assert_eq!(NetworkBlock::try_from("10.0.0.0/8").unwrap(), parsed);
        let owned = String::from("10.0.0.0/8");
        assert_eq!(NetworkBlock::try_from(owned).unwrap(), parsed);
    }

    #[test]
    fn test_calculate() {
        let block = calculate("192.168.1.10", 24).unwrap();
        assert_eq!(block.to_cidr_string(), "192.168.1.0/24");

        assert!(calculate("", 24).unwrap_err().is_missing());
        let err = calculate("192.168.1.300", 24).unwrap_err();
        assert_eq!(err.name(), "address");

        let err = calculate("192.168.1.10", 40).unwrap_err();
        assert_eq!(err.name(), "prefix_length");
    }

    #[test]
    fn test_calculate_with_mask() {
        let ip = "192.168.1.10";
        let policy = MaskPolicy::default();

        let block = calculate_with_mask(ip, "255.255.255.0", policy).unwrap();
        assert_eq!(block, calculate(ip, 24).unwrap());

        let err = calculate_with_mask(ip, "", policy).unwrap_err();
        assert!(err.is_missing());
        assert_eq!(err.name(), "subnet_mask");

        let err = calculate_with_mask(ip, "255.255.255", policy).unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(err.name(), "subnet_mask");

        let strict = calculate_with_mask(ip, "255.0.255.0", MaskPolicy::Strict);
        assert!(strict.is_err());
    }

    #[test]
    fn test_mask_for_prefix() {
        let cases = [
            (0, Ipv4Addr::new(0, 0, 0, 0)),
            (8, Ipv4Addr::new(255, 0, 0, 0)),
            (25, Ipv4Addr::new(255, 255, 255, 128)),
            (32, Ipv4Addr::BROADCAST),
        ];

        for (prefix_len, mask) in cases {
            assert_eq!(mask_for_prefix(prefix_len).unwrap(), mask);
        }
        assert!(mask_for_prefix(-1).is_err());
        assert!(mask_for_prefix(33).is_err());
    }
}
