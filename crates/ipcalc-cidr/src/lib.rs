//! IPv4 network block calculation
//!
//! Given an address and a prefix length (or a subnet mask, or CIDR text),
//! [`NetworkBlock`] derives every dependent fact once at construction:
//! - Subnet and wildcard masks
//! - Network and broadcast addresses
//! - Usable host range and count
//!
//! Blocks are immutable. Subdivision ([`NetworkBlock::split`],
//! [`NetworkBlock::subdivide`]) always returns new blocks.
//!
//! # Examples
//!
//! ```
//! use ipcalc_cidr::NetworkBlock;
//! use std::net::Ipv4Addr;
//!
//! let block: NetworkBlock = "192.168.1.10/24".parse().unwrap();
//! assert_eq!(block.network(), Ipv4Addr::new(192, 168, 1, 0));
//! assert_eq!(block.broadcast(), Ipv4Addr::new(192, 168, 1, 255));
//! assert_eq!(block.usable_hosts(), 254);
//! assert_eq!(block.to_string(), "192.168.1.0/24 (255.255.255.0)");
//!
//! let quarters = block.subdivide(4).unwrap();
//! assert_eq!(quarters[1].to_cidr_string(), "192.168.1.64/26");
//! ```

use std::fmt;
use std::net::Ipv4Addr;

use ipcalc_core::addr::{check_prefix_len, is_contiguous_mask, mask_prefix_len, prefix_to_mask};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

pub use ipcalc_core::{IpCalcError, Result};

mod parse;
mod subnet;

pub use parse::{calculate, calculate_with_mask, mask_for_prefix, parse_cidr};

/// How a directly supplied subnet mask is turned into a prefix length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaskPolicy {
    /// Count the one-bits; masks with holes are accepted as-is
    #[default]
    Permissive,
    /// Reject masks that are not contiguous ones followed by zeros
    Strict,
}

/// An IPv4 address block with all derived addresses
///
/// Addresses are kept as `u32` in network byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct NetworkBlock {
    /// Address the block was built from (host bits intact)
    address: u32,
    /// Prefix length (0-32)
    prefix_len: u8,
    mask: u32,
    network: u32,
    broadcast: u32,
    first_usable: u32,
    last_usable: u32,
}

impl NetworkBlock {
    /// Create a block from an address and a prefix length
    ///
    /// # Errors
    ///
    /// [`IpCalcError::InvalidArgument`] naming `prefix_length` when it is
    /// outside 0-32.
    ///
    /// # Examples
    ///
    /// ```
    /// use ipcalc_cidr::NetworkBlock;
    /// use std::net::Ipv4Addr;
    ///
    /// let block = NetworkBlock::new(Ipv4Addr::new(10, 1, 2, 3), 8).unwrap();
    /// assert_eq!(block.to_cidr_string(), "10.0.0.0/8");
    /// assert!(NetworkBlock::new(Ipv4Addr::new(10, 1, 2, 3), 33).is_err());
    /// ```
    pub fn new(address: Ipv4Addr, prefix_len: i32) -> Result<Self> {
        let prefix_len = check_prefix_len(prefix_len)?;
        Ok(Self::from_parts(u32::from(address), prefix_len))
    }

    /// Same as [`NetworkBlock::new`], failing with
    /// [`IpCalcError::MissingArgument`] when no address is given
    pub fn from_optional(address: Option<Ipv4Addr>, prefix_len: i32) -> Result<Self> {
        let address = address.ok_or_else(|| IpCalcError::missing("address"))?;
        Self::new(address, prefix_len)
    }

    /// Create a block from an address and a subnet mask
    ///
    /// The prefix length is the number of one-bits in `mask`, so a mask
    /// with holes is not rejected. See [`NetworkBlock::with_mask_strict`].
    pub fn with_mask(address: Ipv4Addr, mask: Ipv4Addr) -> Self {
        Self::from_parts(u32::from(address), mask_prefix_len(u32::from(mask)))
    }

    /// Create a block from an address and a contiguous subnet mask
    ///
    /// # Errors
    ///
    /// [`IpCalcError::InvalidArgument`] naming `subnet_mask` when the mask
    /// has a zero bit before a one bit.
    pub fn with_mask_strict(address: Ipv4Addr, mask: Ipv4Addr) -> Result<Self> {
        if !is_contiguous_mask(u32::from(mask)) {
            return Err(IpCalcError::invalid(
                "subnet_mask",
                format!("{} is not a contiguous mask", mask),
            ));
        }

        Ok(Self::with_mask(address, mask))
    }

    /// Create a block from an address and a mask under the given policy
    pub fn with_mask_policy(
        address: Ipv4Addr,
        mask: Ipv4Addr,
        policy: MaskPolicy,
    ) -> Result<Self> {
        match policy {
            MaskPolicy::Permissive => Ok(Self::with_mask(address, mask)),
            MaskPolicy::Strict => Self::with_mask_strict(address, mask),
        }
    }

    /// Derive every field; `prefix_len` must already be within 0-32
    pub(crate) fn from_parts(address: u32, prefix_len: u8) -> Self {
        let mask = prefix_to_mask(prefix_len);
        let network = address & mask;
        let broadcast = network | !mask;

        // Below /31 the host part spans at least two bits, so the network
        // ends in 00 and the broadcast in 11 and neither adjustment carries
        // out of the last octet.
        let (first_usable, last_usable) = if prefix_len < 31 {
            (network + 1, broadcast - 1)
        } else {
            (network, broadcast)
        };

        tracing::trace!(
            address = %Ipv4Addr::from(address),
            prefix_len,
            "derived network block"
        );

        Self {
            address,
            prefix_len,
            mask,
            network,
            broadcast,
            first_usable,
            last_usable,
        }
    }

    /// Address the block was built from
    pub fn address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }

    /// Get prefix length
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Get subnet mask
    pub fn subnet_mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask)
    }

    /// Get wildcard mask (complement of the subnet mask)
    pub fn wildcard_mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(!self.mask)
    }

    /// Get network address
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    /// Get broadcast address
    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.broadcast)
    }

    /// First usable host (network + 1 below /31)
    pub fn first_usable(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.first_usable)
    }

    /// Last usable host (broadcast - 1 below /31)
    pub fn last_usable(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.last_usable)
    }

    /// Get total number of addresses in this block
    pub fn subnet_size(&self) -> u64 {
        1u64 << (32 - self.prefix_len)
    }

    /// Number of usable host addresses
    ///
    /// A /31 has two (point-to-point), a /32 has one (host route), anything
    /// else loses its network and broadcast addresses.
    pub fn usable_hosts(&self) -> u64 {
        match self.prefix_len {
            31 => 2,
            32 => 1,
            _ => self.subnet_size() - 2,
        }
    }

    /// Check if an address is in this block
    pub fn contains(&self, address: Ipv4Addr) -> bool {
        (u32::from(address) & self.mask) == self.network
    }

    /// `network/prefix`, e.g. `192.168.1.0/24`
    pub fn to_cidr_string(&self) -> String {
        format!("{}/{}", self.network(), self.prefix_len)
    }
}

/// `network/prefix (mask)`, e.g. `192.168.1.0/24 (255.255.255.0)`
impl fmt::Display for NetworkBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({})",
            self.network(),
            self.prefix_len,
            self.subnet_mask()
        )
    }
}

impl Serialize for NetworkBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NetworkBlock", 10)?;
        state.serialize_field("address", &self.address())?;
        state.serialize_field("prefix_length", &self.prefix_len)?;
        state.serialize_field("subnet_mask", &self.subnet_mask())?;
        state.serialize_field("wildcard_mask", &self.wildcard_mask())?;
        state.serialize_field("network_address", &self.network())?;
        state.serialize_field("broadcast_address", &self.broadcast())?;
        state.serialize_field("first_usable_host", &self.first_usable())?;
        state.serialize_field("last_usable_host", &self.last_usable())?;
        state.serialize_field("subnet_size", &self.subnet_size())?;
        state.serialize_field("usable_hosts", &self.usable_hosts())?;
        state.end()
    }
}
