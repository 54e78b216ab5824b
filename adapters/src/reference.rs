//! Sender reference ids
//!
//! The partner uses `senderRefId` to correlate and de-duplicate transfers and
//! caps it at 8 characters. Ids are drawn from an atomic counter that starts
//! at a random offset, so a process never repeats an id within 10^8 calls and
//! two processes are unlikely to start on overlapping ranges.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Length of every reference id
pub const REFERENCE_ID_LEN: usize = 8;

const REFERENCE_ID_SPACE: u64 = 100_000_000;

/// Generates 8-digit reference ids
#[derive(Debug)]
pub struct ReferenceIdGenerator {
    next: AtomicU64,
}

impl ReferenceIdGenerator {
    /// Start at a random offset
    pub fn new() -> Self {
        Self::starting_at(rand::thread_rng().gen_range(0..REFERENCE_ID_SPACE))
    }

    /// Start at a fixed offset
    pub fn starting_at(offset: u64) -> Self {
        Self {
            next: AtomicU64::new(offset % REFERENCE_ID_SPACE),
        }
    }

    /// Next id, zero-padded to 8 digits
    pub fn next_id(&self) -> String {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{:0width$}", raw % REFERENCE_ID_SPACE, width = REFERENCE_ID_LEN)
    }
}

impl Default for ReferenceIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
