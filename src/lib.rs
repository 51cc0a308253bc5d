//! # Robin Hood Table
//!
//! An open-addressing hash table over byte-sequence keys, using Robin Hood hashing and
//! tombstone deletion.
//!
//! On a collision the entry that sits closer to its home slot gives way to the one that has
//! travelled farther, which keeps probe lengths short and lets lookups stop early. Erased entries
//! become tombstones instead of shifting their neighbours back.
//!
//! ## Basic Usage
//!
//! ```rust
//! use robinhood::RobinHoodTable;
//!
//! let mut table = RobinHoodTable::new();
//!
//! table.insert("apple", 1);
//! table.insert("banana", 2);
//! assert_eq!(table.find("apple"), Some(&1));
//!
//! // Inserting never overwrites; the same key can be stored twice
//! table.insert("apple", 10);
//! assert_eq!(table.size(), 3);
//!
//! assert!(table.erase("banana"));
//! assert!(!table.erase("banana"));
//! assert_eq!(table.find("banana"), None);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use robinhood::{Fnv1a32, GrowthPolicy, RobinHoodTable, TableConfig};
//!
//! let config = TableConfig::new()
//!     .set_initial_capacity(1024)
//!     .set_load_factor_percent(95)
//!     .set_growth_policy(GrowthPolicy::Rehash);
//!
//! let mut table = RobinHoodTable::with_hasher(&config, Fnv1a32)?;
//! table.insert(b"key".to_vec(), b"value".to_vec());
//! assert_eq!(table.find(b"key"), Some(&b"value".to_vec()));
//! println!("average probe distance: {}", table.average_probe_distance());
//! # Ok::<(), robinhood::ConfigError>(())
//! ```
//!
//! ## Observing the table
//!
//! ```rust
//! use robinhood::{Crc32, EventLog, RobinHoodTable, TableConfig, TableEvent};
//!
//! let config = TableConfig::new().set_initial_capacity(4);
//! let mut table = RobinHoodTable::with_hasher_and_recorder(&config, Crc32, EventLog::new())?;
//! for i in 0..4 {
//!     table.insert(format!("key-{i}"), i);
//! }
//! assert!(table.recorder().events().iter().any(|e| matches!(e, TableEvent::Grown { .. })));
//! # Ok::<(), robinhood::ConfigError>(())
//! ```

/// Table construction settings
mod config;
/// Error types
mod error;
/// Hash functions over key bytes
mod key_hasher;
/// Event hooks for table internals
mod recorder;
/// The Robin Hood table itself
mod robin_hood_table;

pub use config::{
    DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR_PERCENT, GrowthPolicy, MAX_CAPACITY, TableConfig,
};
pub use error::{ConfigError, TableError};
pub use key_hasher::{BuildHasherAdapter, Crc32, Fnv1a32, KeyHasher};
pub use recorder::{EventLog, NoopRecorder, Recorder, TableEvent};
pub use robin_hood_table::{Iter, ProbeStats, RobinHoodTable};
