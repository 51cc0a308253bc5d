use std::{iter::FusedIterator, mem, slice};

use crate::{
    config::{GrowthPolicy, MAX_CAPACITY, TableConfig, resize_threshold},
    error::{ConfigError, TableError},
    key_hasher::{Crc32, KeyHasher},
    recorder::{NoopRecorder, Recorder, TableEvent},
};

/// Bits of a hash that the table keeps; the top bit is never part of a stored hash
const HASH_MASK: u32 = 0x7fff_ffff;

/// A single position of the backing array
#[derive(Debug, Clone)]
enum Slot<K, V> {
    /// Never held an entry since the array was built
    Empty,
    /// Held an entry that was erased. The hash is kept so the slot still has a probe distance.
    Tombstone {
        /// 31-bit hash of the erased key
        hash: u32,
    },
    /// Holds a live entry
    Occupied {
        /// 31-bit, nonzero hash of `key`
        hash: u32,
        /// The stored key
        key: K,
        /// The stored value
        value: V,
    },
}

/// How growth obtains memory for the new array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reserve {
    /// Report allocation failure as [`TableError::Allocation`]
    Fallible,
    /// Abort through the global allocation error handler, like `Vec`
    Infallible,
}

/// Home slot of `hash` in an array with the given mask
#[inline]
fn desired_pos(hash: u32, mask: usize) -> usize {
    (hash as usize) & mask
}

/// How far `index` lies past the home slot of `hash`, wrapping around the array
#[inline]
fn probe_distance(hash: u32, index: usize, mask: usize) -> usize {
    index.wrapping_sub(desired_pos(hash, mask)) & mask
}

/// Capacity after one doubling, bounded by [`MAX_CAPACITY`]
fn next_capacity(capacity: usize) -> Result<usize, TableError> {
    capacity
        .checked_mul(2)
        .filter(|&doubled| doubled <= MAX_CAPACITY)
        .ok_or(TableError::CapacityOverflow)
}

/// Runs the Robin Hood displacement loop for one entry.
///
/// Walks forward from the entry's home slot. Whenever the walk reaches a slot whose occupant sits
/// closer to its own home than the carried entry does, the carried entry takes that slot: a
/// tombstone is simply overwritten, a live occupant is swapped out and carried onwards from the
/// same position. An empty slot ends the walk.
///
/// Returns true if the entry, or an occupant it displaced, came to rest in a tombstone.
///
/// The caller guarantees at least one empty slot exists. That bounds every cluster below the
/// capacity, so masked probe distances are exact and the walk ends at or before that slot.
fn place_entry<K, V, R: Recorder + ?Sized>(
    slots: &mut [Slot<K, V>],
    recorder: &mut R,
    hash: u32,
    key: K,
    value: V,
) -> bool {
    let mask = slots.len().wrapping_sub(1);
    let mut carried = Slot::Occupied { hash, key, value };
    let mut pos = desired_pos(hash, mask);
    let mut dist: usize = 0;

    loop {
        // `pos` is always masked, so this only fails on an empty array
        let Some(slot) = slots.get_mut(pos) else {
            return false;
        };

        let (existing_hash, is_tombstone) = match slot {
            Slot::Empty => {
                *slot = carried;
                recorder.record(TableEvent::Placed { index: pos, probe_distance: dist });
                return false;
            }
            Slot::Tombstone { hash } => (*hash, true),
            Slot::Occupied { hash, .. } => (*hash, false),
        };

        let existing_dist = probe_distance(existing_hash, pos, mask);
        if existing_dist < dist {
            if is_tombstone {
                *slot = carried;
                recorder.record(TableEvent::TombstoneReused { index: pos });
                return true;
            }
            mem::swap(slot, &mut carried);
            recorder.record(TableEvent::Displaced { index: pos, probe_distance: existing_dist });
            dist = existing_dist;
        }

        pos = pos.wrapping_add(1) & mask;
        dist = dist.wrapping_add(1);
    }
}

/// Slot occupancy and probe length summary of a table, see [`RobinHoodTable::probe_stats`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeStats {
    /// Number of slots in the backing array
    pub capacity: usize,
    /// Live entries, as reported by [`RobinHoodTable::size`]
    pub len: usize,
    /// Slots holding a live entry
    pub occupied_slots: usize,
    /// Slots holding a tombstone
    pub tombstone_slots: usize,
    /// Slots that never held an entry since the last growth
    pub empty_slots: usize,
    /// Longest probe distance of any live entry
    pub max_probe_distance: usize,
    /// Mean probe distance of live entries, `0.0` for an empty table
    pub average_probe_distance: f64,
}

/// An open-addressing hash table using Robin Hood hashing and tombstone deletion.
///
/// Keys are byte sequences (anything implementing `AsRef<[u8]>`), values are opaque. The table
/// never looks at a key beyond hashing it and comparing its bytes.
///
/// Inserting does not check for an existing key: inserting the same key twice stores two entries
/// and [`find`](Self::find) returns whichever one the probe sequence reaches first.
///
/// Erased entries leave tombstones behind. Tombstones count towards the resize threshold just
/// like live entries, so heavy erase churn makes the table grow. They are reclaimed only when
/// the table grows under [`GrowthPolicy::Rehash`], or reused in place when a poorer entry probes
/// past them.
///
/// Note: This implementation is not thread-safe.
#[derive(Debug, Clone)]
pub struct RobinHoodTable<K = Vec<u8>, V = Vec<u8>, H = Crc32, R = NoopRecorder> {
    /// The backing array, its length is always a power of two
    slots: Vec<Slot<K, V>>,
    /// Always `slots.len() - 1`
    mask: usize,
    /// Inserts minus successful erases
    count: usize,
    /// Tombstone slots in the backing array
    tombstones: usize,
    /// Element count at which the next insert grows the array first
    resize_threshold: usize,
    /// Percentage of capacity used to derive `resize_threshold`
    load_factor_percent: u8,
    /// How slots are carried over on growth
    growth_policy: GrowthPolicy,
    /// 32-bit hash function over key bytes
    hasher: H,
    /// Receives events about slot mutations
    recorder: R,
}

impl<K, V> Default for RobinHoodTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RobinHoodTable<K, V> {
    /// Creates an empty table with 256 slots, a 90% load factor and CRC-32 hashing
    #[must_use]
    pub fn new() -> Self {
        Self::build(&TableConfig::new(), Crc32, NoopRecorder)
    }

    /// Creates an empty table with at least `capacity` slots
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two().min(MAX_CAPACITY);
        Self::build(&TableConfig::new().set_initial_capacity(capacity), Crc32, NoopRecorder)
    }

    /// Creates an empty table from a configuration, hashing with CRC-32
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn with_config(config: &TableConfig) -> Result<Self, ConfigError> {
        Self::with_hasher(config, Crc32)
    }
}

impl<K, V, H> RobinHoodTable<K, V, H> {
    /// Creates an empty table from a configuration and a hash function
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn with_hasher(config: &TableConfig, hasher: H) -> Result<Self, ConfigError> {
        RobinHoodTable::with_hasher_and_recorder(config, hasher, NoopRecorder)
    }
}

impl<K, V, H, R> RobinHoodTable<K, V, H, R> {
    /// Creates an empty table that reports its internal events to `recorder`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid.
    pub fn with_hasher_and_recorder(
        config: &TableConfig,
        hasher: H,
        recorder: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, hasher, recorder))
    }

    /// Builds a table from an already validated configuration
    fn build(config: &TableConfig, hasher: H, recorder: R) -> Self {
        let capacity = config.initial_capacity;
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot::Empty);

        Self {
            slots,
            mask: capacity.wrapping_sub(1),
            count: 0,
            tombstones: 0,
            resize_threshold: resize_threshold(capacity, config.load_factor_percent),
            load_factor_percent: config.load_factor_percent,
            growth_policy: config.growth_policy,
            hasher,
            recorder,
        }
    }

    /// Returns the number of live entries in the table
    #[must_use]
    pub fn size(&self) -> usize {
        self.count
    }

    /// Returns the number of live entries in the table, same as [`size`](Self::size)
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the table holds no live entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of slots in the backing array
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns live entries divided by capacity
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.slots.len() as f64
    }

    /// Returns the growth policy chosen at construction
    #[must_use]
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.growth_policy
    }

    /// Returns the recorder
    #[must_use]
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Returns the recorder mutably, e.g. to drain collected events
    pub fn recorder_mut(&mut self) -> &mut R {
        &mut self.recorder
    }

    /// Mean probe distance over live entries.
    ///
    /// Diagnostic only. Returns `0.0` for a table without live entries.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn average_probe_distance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let total: usize = self.live_probe_distances().sum();
        total as f64 / self.count as f64
    }

    /// Counts slots by state and summarizes probe distances
    #[must_use]
    pub fn probe_stats(&self) -> ProbeStats {
        let mut occupied_slots: usize = 0;
        let mut tombstone_slots: usize = 0;
        let mut empty_slots: usize = 0;
        for slot in &self.slots {
            let counter = match slot {
                Slot::Empty => &mut empty_slots,
                Slot::Tombstone { .. } => &mut tombstone_slots,
                Slot::Occupied { .. } => &mut occupied_slots,
            };
            *counter = counter.saturating_add(1);
        }

        ProbeStats {
            capacity: self.slots.len(),
            len: self.count,
            occupied_slots,
            tombstone_slots,
            empty_slots,
            max_probe_distance: self.live_probe_distances().max().unwrap_or(0),
            average_probe_distance: self.average_probe_distance(),
        }
    }

    /// Probe distances of all live entries in slot order
    fn live_probe_distances(&self) -> impl Iterator<Item = usize> + '_ {
        let mask = self.mask;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| match slot {
            Slot::Occupied { hash, .. } => Some(probe_distance(*hash, index, mask)),
            Slot::Empty | Slot::Tombstone { .. } => None,
        })
    }

    /// Returns an iterator over the live key-value pairs in slot order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter() }
    }

    /// Removes every entry and tombstone, keeping the current capacity
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.count = 0;
        self.tombstones = 0;
    }
}

impl<K, V, H, R> RobinHoodTable<K, V, H, R>
where
    K: AsRef<[u8]>,
    H: KeyHasher,
    R: Recorder,
{
    /// Hashes key bytes to the 31-bit, nonzero value stored alongside an entry
    fn hash_of(&self, key: &[u8]) -> u32 {
        let hash = self.hasher.hash32(key) & HASH_MASK;
        if hash == 0 { 1 } else { hash }
    }

    /// Inserts a key-value pair.
    ///
    /// Existing entries with the same key are left in place. Grows the table first when live
    /// entries plus tombstones would reach the resize threshold; an allocation failure during
    /// growth aborts the process the way `Vec` does, see [`try_insert`](Self::try_insert) for a
    /// fallible version.
    ///
    /// # Panics
    ///
    /// Panics if the table is already at [`MAX_CAPACITY`] slots and has no room left.
    #[allow(clippy::panic)]
    pub fn insert(&mut self, key: K, value: V) {
        let hash = self.hash_of(key.as_ref());
        match self.make_room(Reserve::Infallible) {
            Ok(()) => self.place(hash, key, value),
            Err(err) => panic!("robin hood table insert: {err}"),
        }
    }

    /// Inserts a key-value pair, reporting allocation failure during growth instead of aborting.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Allocation`] if the grown array could not be allocated, or
    /// [`TableError::CapacityOverflow`] if the table is at [`MAX_CAPACITY`] slots and full. The
    /// table is unchanged in either case.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), TableError> {
        let hash = self.hash_of(key.as_ref());
        self.make_room(Reserve::Fallible)?;
        self.place(hash, key, value);
        Ok(())
    }

    /// Places an entry and counts it
    fn place(&mut self, hash: u32, key: K, value: V) {
        if place_entry(&mut self.slots, &mut self.recorder, hash, key, value) {
            self.tombstones = self.tombstones.saturating_sub(1);
        }
        self.count = self.count.saturating_add(1);
    }

    /// Slots that are neither live nor tombstones
    fn empty_slots(&self) -> usize {
        self.slots.len().saturating_sub(self.count).saturating_sub(self.tombstones)
    }

    /// Grows until one more element, counting tombstones, stays below the resize threshold.
    ///
    /// Since the threshold is below the capacity this leaves an empty slot after placement, which
    /// keeps every cluster shorter than the array.
    fn make_room(&mut self, reserve: Reserve) -> Result<(), TableError> {
        while self.count.saturating_add(self.tombstones).saturating_add(1) >= self.resize_threshold
        {
            match self.grow(reserve) {
                Ok(()) => {}
                // At the largest capacity, keep filling while an empty slot survives placement
                Err(TableError::CapacityOverflow) if self.empty_slots() >= 2 => break,
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Doubles the backing array, carrying slots over according to the growth policy
    fn grow(&mut self, reserve: Reserve) -> Result<(), TableError> {
        let old_capacity = self.slots.len();
        let new_capacity = next_capacity(old_capacity)?;

        let mut new_slots = Vec::new();
        match reserve {
            Reserve::Fallible => new_slots.try_reserve_exact(new_capacity)?,
            Reserve::Infallible => new_slots.reserve_exact(new_capacity),
        }

        match self.growth_policy {
            GrowthPolicy::Rehash => {
                new_slots.resize_with(new_capacity, || Slot::Empty);
                let old_slots = mem::replace(&mut self.slots, new_slots);
                self.tombstones = 0;
                for slot in old_slots {
                    if let Slot::Occupied { hash, key, value } = slot {
                        place_entry(&mut self.slots, &mut NoopRecorder, hash, key, value);
                    }
                }
            }
            GrowthPolicy::CopyVerbatim => {
                new_slots.append(&mut self.slots);
                new_slots.resize_with(new_capacity, || Slot::Empty);
                self.slots = new_slots;
            }
        }

        self.mask = new_capacity.wrapping_sub(1);
        self.resize_threshold = resize_threshold(new_capacity, self.load_factor_percent);
        self.recorder.record(TableEvent::Grown {
            old_capacity,
            new_capacity,
            policy: self.growth_policy,
        });
        Ok(())
    }

    /// Finds the slot holding `key`.
    ///
    /// Stops at the first empty slot, or as soon as the probe has travelled farther than the
    /// occupant of the current slot, since Robin Hood ordering would have placed the key before
    /// that occupant.
    fn lookup_index(&self, key: &[u8]) -> Option<usize> {
        let hash = self.hash_of(key);
        let mut pos = desired_pos(hash, self.mask);
        let mut dist: usize = 0;

        loop {
            let slot = self.slots.get(pos)?;
            let stored_hash = match slot {
                Slot::Empty => return None,
                Slot::Tombstone { hash } | Slot::Occupied { hash, .. } => *hash,
            };

            if dist > probe_distance(stored_hash, pos, self.mask) {
                return None;
            }
            if let Slot::Occupied { hash: stored_hash, key: stored_key, .. } = slot
                && *stored_hash == hash
                && stored_key.as_ref() == key
            {
                return Some(pos);
            }

            pos = pos.wrapping_add(1) & self.mask;
            dist = dist.wrapping_add(1);
        }
    }

    /// Retrieves the value of the first entry found for `key`
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let index = self.lookup_index(key.as_ref())?;
        match self.slots.get(index)? {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Empty | Slot::Tombstone { .. } => None,
        }
    }

    /// Retrieves a mutable reference to the value of the first entry found for `key`
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let index = self.lookup_index(key.as_ref())?;
        match self.slots.get_mut(index)? {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Empty | Slot::Tombstone { .. } => None,
        }
    }

    /// Returns true if an entry for `key` can be found
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.lookup_index(key.as_ref()).is_some()
    }

    /// Turns the first entry found for `key` into a tombstone, returning its value
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let index = self.lookup_index(key.as_ref())?;
        let slot = self.slots.get_mut(index)?;
        match mem::replace(slot, Slot::Empty) {
            Slot::Occupied { hash, value, .. } => {
                *slot = Slot::Tombstone { hash };
                self.count = self.count.saturating_sub(1);
                self.tombstones = self.tombstones.saturating_add(1);
                self.recorder.record(TableEvent::Erased { index });
                Some(value)
            }
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Erases the first entry found for `key`.
    ///
    /// Returns false, leaving the table untouched, if no entry is found.
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.remove(key).is_some()
    }
}

impl<K, V, H, R> Extend<(K, V)> for RobinHoodTable<K, V, H, R>
where
    K: AsRef<[u8]>,
    H: KeyHasher,
    R: Recorder,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RobinHoodTable<K, V>
where
    K: AsRef<[u8]>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<'a, K, V, H, R> IntoIterator for &'a RobinHoodTable<K, V, H, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the live key-value pairs of a table
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Remaining slots
    slots: slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.find_map(|slot| match slot {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            Slot::Empty | Slot::Tombstone { .. } => None,
        })
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
