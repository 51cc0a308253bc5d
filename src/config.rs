//! Define the configuration used to create a [`RobinHoodTable`](crate::RobinHoodTable).

use crate::error::ConfigError;

/// Default number of slots in a new table
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;
/// Default resize threshold as a percentage of capacity
pub const DEFAULT_LOAD_FACTOR_PERCENT: u8 = 90;
/// Largest capacity whose mask still fits in a 31-bit hash
pub const MAX_CAPACITY: usize = 1 << 31;

/// What happens to existing slots when the table doubles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Re-place every live entry under the new mask and drop tombstones.
    #[default]
    Rehash,
    /// Copy old slots into the low half of the new array at their old indices.
    ///
    /// Entries are not moved to their new home positions, so lookups for keys placed before a
    /// growth can miss afterwards. The element count stays exact.
    CopyVerbatim,
}

/// Configuration for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of slots allocated up front
    pub(crate) initial_capacity: usize,
    /// Percentage of capacity at which the table grows
    pub(crate) load_factor_percent: u8,
    /// How slots are carried over on growth
    pub(crate) growth_policy: GrowthPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TableConfig {
    /// Create a new config with 256 slots, a 90% load factor and rehashing growth.
    #[must_use]
    pub fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor_percent: DEFAULT_LOAD_FACTOR_PERCENT,
            growth_policy: GrowthPolicy::Rehash,
        }
    }

    /// Set the initial number of slots. Must be a power of two.
    #[must_use]
    pub fn set_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the load factor, as an integer percentage in `1..=99`.
    #[must_use]
    pub fn set_load_factor_percent(mut self, percent: u8) -> Self {
        self.load_factor_percent = percent;
        self
    }

    /// Set the growth policy.
    #[must_use]
    pub fn set_growth_policy(mut self, policy: GrowthPolicy) -> Self {
        self.growth_policy = policy;
        self
    }

    /// Initial number of slots.
    #[must_use]
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Load factor percentage.
    #[must_use]
    pub fn load_factor_percent(&self) -> u8 {
        self.load_factor_percent
    }

    /// Growth policy.
    #[must_use]
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth_policy
    }

    /// Check the configuration before a table is built from it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_capacity.is_power_of_two() {
            return Err(ConfigError::CapacityNotPowerOfTwo(self.initial_capacity));
        }
        if self.initial_capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge(self.initial_capacity));
        }
        if !(1..=99).contains(&self.load_factor_percent) {
            return Err(ConfigError::LoadFactorOutOfRange(self.load_factor_percent));
        }
        Ok(())
    }
}

/// Number of elements at which a table of `capacity` slots grows.
pub(crate) fn resize_threshold(capacity: usize, load_factor_percent: u8) -> usize {
    let scaled = (capacity as u128).saturating_mul(u128::from(load_factor_percent)) / 100;
    usize::try_from(scaled).unwrap_or(usize::MAX)
}
