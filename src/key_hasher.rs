//! 32-bit hash functions over byte-sequence keys.
//!
//! The table only needs a `&[u8] -> u32` function. It reserves the top bit and the zero value
//! for itself, so any 32-bit function is acceptable here.

use std::hash::{BuildHasher, Hasher};

/// A 32-bit hash function over raw key bytes
pub trait KeyHasher {
    /// Hashes `key` to a 32-bit value
    fn hash32(&self, key: &[u8]) -> u32;
}

impl<H: KeyHasher + ?Sized> KeyHasher for &H {
    fn hash32(&self, key: &[u8]) -> u32 {
        (**self).hash32(key)
    }
}

/// CRC-32 (IEEE) checksum used as a hash function.
///
/// This is the default hasher of [`RobinHoodTable`](crate::RobinHoodTable).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc32;

impl KeyHasher for Crc32 {
    fn hash32(&self, key: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(key);
        hasher.finalize()
    }
}

/// Offset basis of the 32-bit FNV-1a function
const FNV_OFFSET: u32 = 0x811c_9dc5;
/// Prime of the 32-bit FNV-1a function
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
///
/// Weak and easy to collide on purpose (`"costarring"` and `"liquid"` share a hash), which makes
/// it handy for exercising collision paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fnv1a32;

impl KeyHasher for Fnv1a32 {
    fn hash32(&self, key: &[u8]) -> u32 {
        key.iter().fold(FNV_OFFSET, |hash, &byte| (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME))
    }
}

/// Adapts any [`BuildHasher`] (for example [`std::hash::RandomState`]) by truncating its 64-bit
/// output to the low 32 bits.
#[derive(Debug, Clone, Default)]
pub struct BuildHasherAdapter<S>(pub S);

impl<S: BuildHasher> KeyHasher for BuildHasherAdapter<S> {
    #[allow(clippy::cast_possible_truncation)]
    fn hash32(&self, key: &[u8]) -> u32 {
        let mut hasher = self.0.build_hasher();
        hasher.write(key);
        hasher.finish() as u32
    }
}
