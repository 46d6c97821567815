//! Core types for ipcalc
//!
//! This crate provides the pieces shared by the rest of the workspace:
//! - [`IpCalcError`] - Error taxonomy for every calculation
//! - [`addr`] - IPv4 mask and prefix-length helpers
//!
//! ```
//! use ipcalc_core::addr::prefix_to_mask;
//!
//! assert_eq!(prefix_to_mask(24), 0xFFFF_FF00);
//! ```

use thiserror::Error;

pub mod addr;

/// Error types for ipcalc operations
///
/// Every variant carries the name of the offending parameter so callers
/// can point at the field that needs fixing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IpCalcError {
    /// A required address or CIDR string is absent or empty
    #[error("Missing argument: {name}")]
    MissingArgument { name: &'static str },

    /// A value is malformed or out of range
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },
}

impl IpCalcError {
    /// Build a [`IpCalcError::MissingArgument`]
    pub fn missing(name: &'static str) -> Self {
        Self::MissingArgument { name }
    }

    /// Build a [`IpCalcError::InvalidArgument`]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Whether this is a [`IpCalcError::MissingArgument`]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingArgument { .. })
    }

    /// Whether this is a [`IpCalcError::InvalidArgument`]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Name of the parameter that caused the error
    pub fn name(&self) -> &'static str {
        match self {
            Self::MissingArgument { name } | Self::InvalidArgument { name, .. } => name,
        }
    }
}

/// Result type alias for ipcalc operations
pub type Result<T> = std::result::Result<T, IpCalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IpCalcError::missing("cidr");
        assert_eq!(format!("{}", err), "Missing argument: cidr");

        let err = IpCalcError::invalid("prefix_length", "33 is outside 0-32");
        assert_eq!(
            format!("{}", err),
            "Invalid argument `prefix_length`: 33 is outside 0-32"
        );
    }

    #[test]
    fn test_error_kind() {
        let missing = IpCalcError::missing("address");
        assert!(missing.is_missing());
        assert!(!missing.is_invalid());
        assert_eq!(missing.name(), "address");

        let invalid = IpCalcError::invalid("subnet_mask", "bad");
        assert!(invalid.is_invalid());
        assert!(!invalid.is_missing());
        assert_eq!(invalid.name(), "subnet_mask");
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<u8> {
            Err(IpCalcError::missing("cidr"))
        }

        assert_eq!(returns_result(), Err(IpCalcError::missing("cidr")));
    }
}
