//! Index selection for picking a catalog item.
//!
//! Prescriptions pick one item from the catalog. The picker is injected so
//! production can stay random while tests pin the choice with a seed.

use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Chooses an index in `0..len`.
pub trait IndexPicker: Send + Sync {
    /// Returns `None` only when `len == 0`.
    fn pick(&self, len: usize) -> Option<usize>;
}

/// Uniform choice backed by v4 UUID entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl IndexPicker for RandomPicker {
    fn pick(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some((Uuid::new_v4().as_u128() % len as u128) as usize)
    }
}

/// Deterministic choice: SHA-256 over `(seed, call number)`.
///
/// Two pickers built from the same seed yield the same sequence.
#[derive(Debug)]
pub struct SeededPicker {
    seed: u64,
    calls: AtomicU64,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            calls: AtomicU64::new(0),
        }
    }
}

impl IndexPicker for SeededPicker {
    fn pick(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(call.to_le_bytes());
        let digest = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        Some((u64::from_le_bytes(word) % len as u64) as usize)
    }
}

/// Always the first item.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPicker;

impl IndexPicker for FirstPicker {
    fn pick(&self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(0)
        }
    }
}
