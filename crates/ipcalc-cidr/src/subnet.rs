//! Subdivision of a block into equal-sized children
//!
//! [`NetworkBlock::split`] takes the number of extra prefix bits and is the
//! primitive. [`NetworkBlock::subdivide`] accepts a child count and reduces
//! it to `floor(log2(count))` extra bits.

use ipcalc_core::addr::ADDRESS_BITS;
use ipcalc_core::{IpCalcError, Result};

use crate::NetworkBlock;

impl NetworkBlock {
    /// Split into `2^extra_bits` children of prefix `prefix_len + extra_bits`
    ///
    /// Children are ordered by ascending network address and exactly
    /// partition this block.
    ///
    /// # Examples
    ///
    /// ```
    /// use ipcalc_cidr::NetworkBlock;
    ///
    /// let block: NetworkBlock = "10.0.0.0/8".parse().unwrap();
    /// let halves = block.split(1).unwrap();
    /// assert_eq!(halves[0].to_cidr_string(), "10.0.0.0/9");
    /// assert_eq!(halves[1].to_cidr_string(), "10.128.0.0/9");
    /// ```
    pub fn split(&self, extra_bits: u8) -> Result<Vec<NetworkBlock>> {
        let child_prefix = self.child_prefix(u32::from(extra_bits))?;
        self.children(child_prefix, 1u64 << extra_bits)
    }

    /// Subdivide into `count` children
    ///
    /// `count` is meant to be a power of two. Any other value is truncated to
    /// the nearest lower power for the prefix width while still producing
    /// `count` children, so the tail can run past this block (and past the
    /// end of the address space, which is reported as an error).
    ///
    /// # Errors
    ///
    /// [`IpCalcError::InvalidArgument`] naming `subdivision_count` when
    /// `count` is zero, when the child prefix would exceed /32, or when a
    /// child base address would exceed `255.255.255.255`.
    pub fn subdivide(&self, count: u32) -> Result<Vec<NetworkBlock>> {
        if count == 0 {
            return Err(IpCalcError::invalid(
                "subdivision_count",
                "must be a positive integer",
            ));
        }

        let child_prefix = self.child_prefix(count.ilog2())?;
        self.children(child_prefix, u64::from(count))
    }

    fn child_prefix(&self, extra_bits: u32) -> Result<u8> {
        let child_prefix = u32::from(self.prefix_len) + extra_bits;
        if child_prefix > u32::from(ADDRESS_BITS) {
            return Err(IpCalcError::invalid(
                "subdivision_count",
                "subdivision count exceeds address space",
            ));
        }

        Ok(child_prefix as u8)
    }

    fn children(&self, child_prefix: u8, count: u64) -> Result<Vec<NetworkBlock>> {
        let child_size = 1u64 << (ADDRESS_BITS - child_prefix);
        let base = u64::from(self.network);

        // count >= 1 and both factors are at most 2^32, so this fits in u64
        let last_base = base + (count - 1) * child_size;
        if last_base > u64::from(u32::MAX) {
            return Err(IpCalcError::invalid(
                "subdivision_count",
                "computed subnet base out of range",
            ));
        }

        tracing::debug!(
            parent = %self.to_cidr_string(),
            child_prefix,
            count,
            "subdividing network block"
        );

        let mut children = Vec::with_capacity(count as usize);
        for i in 0..count {
            let child_base = base + i * child_size;
            children.push(NetworkBlock::from_parts(child_base as u32, child_prefix));
        }

        Ok(children)
    }
}
