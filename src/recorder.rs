//! Observability hooks for table internals.
//!
//! A table reports what its algorithms do through a [`Recorder`] it owns. The default
//! [`NoopRecorder`] compiles down to nothing.

use crate::config::GrowthPolicy;

/// Something the table did to its slot array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    /// The slot array doubled.
    Grown {
        /// Capacity before growth
        old_capacity: usize,
        /// Capacity after growth
        new_capacity: usize,
        /// How the old slots were carried over
        policy: GrowthPolicy,
    },
    /// An entry came to rest in an empty slot.
    Placed {
        /// Slot index
        index: usize,
        /// Distance of the slot from the entry's home position
        probe_distance: usize,
    },
    /// An entry took a slot from a richer occupant, which continues probing.
    Displaced {
        /// Slot index
        index: usize,
        /// Probe distance of the evicted occupant at that slot
        probe_distance: usize,
    },
    /// An entry came to rest in a tombstone.
    TombstoneReused {
        /// Slot index
        index: usize,
    },
    /// A live entry became a tombstone.
    Erased {
        /// Slot index
        index: usize,
    },
}

/// Receives [`TableEvent`]s
pub trait Recorder {
    /// Called once per event, synchronously, from inside the table operation.
    fn record(&mut self, event: TableEvent);
}

impl<R: Recorder + ?Sized> Recorder for &mut R {
    fn record(&mut self, event: TableEvent) {
        (**self).record(event);
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl Recorder for NoopRecorder {
    #[inline]
    fn record(&mut self, _event: TableEvent) {}
}

/// Keeps every event in arrival order
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    /// Recorded events
    events: Vec<TableEvent>,
}

impl EventLog {
    /// Creates an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far
    #[must_use]
    pub fn events(&self) -> &[TableEvent] {
        &self.events
    }

    /// Number of growth events recorded so far
    #[must_use]
    pub fn growths(&self) -> usize {
        self.events.iter().filter(|event| matches!(event, TableEvent::Grown { .. })).count()
    }

    /// Forgets all recorded events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Recorder for EventLog {
    fn record(&mut self, event: TableEvent) {
        self.events.push(event);
    }
}
