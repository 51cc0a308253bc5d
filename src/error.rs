//! Errors reported by table construction and insertion.

use std::collections::TryReserveError;
use std::error::Error;
use std::fmt;

/// Invalid table configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Initial capacity was zero or not a power of two.
    CapacityNotPowerOfTwo(usize),
    /// Initial capacity does not fit the 31-bit hash range.
    CapacityTooLarge(usize),
    /// Load factor percentage outside of `1..=99`.
    LoadFactorOutOfRange(u8),
}

impl Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::CapacityNotPowerOfTwo(capacity) => {
                write!(f, "initial capacity {capacity} is not a power of two")
            }
            Self::CapacityTooLarge(capacity) => {
                write!(f, "initial capacity {capacity} exceeds the 31-bit hash range")
            }
            Self::LoadFactorOutOfRange(percent) => {
                write!(f, "load factor {percent}% is outside of 1..=99")
            }
        }
    }
}

/// Failure while inserting into a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The slot array could not be grown.
    Allocation(TryReserveError),
    /// The table is full at `MAX_CAPACITY` slots, the largest the 31-bit hash range addresses.
    CapacityOverflow,
}

impl Error for TableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation(err) => Some(err),
            Self::CapacityOverflow => None,
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self {
            Self::Allocation(e) => write!(f, "growth allocation: {e}"),
            Self::CapacityOverflow => write!(f, "table full at maximum capacity"),
        }
    }
}

impl From<TryReserveError> for TableError {
    fn from(err: TryReserveError) -> Self {
        Self::Allocation(err)
    }
}
