//! Epoch bookkeeping and cache/DAG size computation.
//!
//! Ethash-family chains ship pre-computed 2048-entry size tables so nodes
//! never have to factor a number at block-validation time. We cannot carry
//! a hand-authored copy of that table here, so instead we compute each
//! entry with the same prime-adjustment search the table was generated
//! from, and memoize the result per epoch — the first lookup for a given
//! epoch pays the search, every later one is a hash-map hit.

use crate::constants::{
    ACTIVATION_BLOCK, CACHE_BYTES_GROWTH, CACHE_BYTES_INIT, DATASET_BYTES_GROWTH,
    DATASET_BYTES_INIT, EPOCH_LENGTH, MAX_EPOCH, MIX_BYTES, NEW_EPOCH_LENGTH, NODE_BYTES,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

static CACHE_SIZE_TABLE: Lazy<Mutex<HashMap<u64, u64>>> = Lazy::new(|| Mutex::new(HashMap::new()));
static FULL_SIZE_TABLE: Lazy<Mutex<HashMap<u64, u64>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// The block-count span of one epoch, which changed under ECIP-1099.
pub fn epoch_length(block_number: u64) -> u64 {
    if block_number < ACTIVATION_BLOCK {
        EPOCH_LENGTH
    } else {
        NEW_EPOCH_LENGTH
    }
}

/// The epoch a block belongs to, bridging the ECIP-1099 ("Thanos") epoch
/// length change at [`ACTIVATION_BLOCK`].
///
/// Epochs before activation are counted in 30,000-block units; epochs at
/// or after activation are counted in 60,000-block units, continuing from
/// half the pre-activation epoch count so the DAG doesn't regenerate (or
/// skip) an epoch at the boundary.
pub fn epoch_number(block_number: u64) -> u64 {
    if block_number < ACTIVATION_BLOCK {
        block_number / EPOCH_LENGTH
    } else {
        let epochs_before = ACTIVATION_BLOCK / EPOCH_LENGTH;
        epochs_before / 2 + (block_number - ACTIVATION_BLOCK) / NEW_EPOCH_LENGTH
    }
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut i = 3u64;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Searches downward from `start` for the largest `size` with
/// `size % unit == 0` and `size / unit` prime — the same search used to
/// build the upstream ethash size tables.
fn prime_adjusted_size(start: u64, unit: u64) -> u64 {
    let mut size = start - unit;
    while !is_prime(size / unit) {
        size -= 2 * unit;
    }
    size
}

/// Size, in bytes, of the light cache for the epoch containing `block_number`.
///
/// Panics if the epoch exceeds [`MAX_EPOCH`] (the size tables, computed or
/// compiled, are only defined up to that point).
pub fn cache_size(block_number: u64) -> u64 {
    let epoch = epoch_number(block_number);
    assert!(epoch < MAX_EPOCH, "epoch {epoch} exceeds MAX_EPOCH");

    if let Some(&size) = CACHE_SIZE_TABLE.lock().unwrap().get(&epoch) {
        return size;
    }
    let start = CACHE_BYTES_INIT + CACHE_BYTES_GROWTH * epoch;
    let size = prime_adjusted_size(start, NODE_BYTES as u64);
    CACHE_SIZE_TABLE.lock().unwrap().insert(epoch, size);
    size
}

/// Size, in bytes, of the full DAG for the epoch containing `block_number`.
pub fn full_size(block_number: u64) -> u64 {
    let epoch = epoch_number(block_number);
    assert!(epoch < MAX_EPOCH, "epoch {epoch} exceeds MAX_EPOCH");

    if let Some(&size) = FULL_SIZE_TABLE.lock().unwrap().get(&epoch) {
        return size;
    }
    let start = DATASET_BYTES_INIT + DATASET_BYTES_GROWTH * epoch;
    let size = prime_adjusted_size(start, MIX_BYTES as u64);
    FULL_SIZE_TABLE.lock().unwrap().insert(epoch, size);
    size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_zero_sizes_match_known_constants() {
        assert_eq!(cache_size(0), 16_776_896);
        assert_eq!(full_size(0), 1_073_739_904);
    }

    #[test]
    fn sizes_grow_monotonically_within_legacy_epochs() {
        assert!(cache_size(EPOCH_LENGTH) > cache_size(0));
        assert!(full_size(EPOCH_LENGTH) > full_size(0));
    }

    #[test]
    fn sizes_are_always_prime_multiples_of_unit() {
        for epoch_block in [0, EPOCH_LENGTH, EPOCH_LENGTH * 2047] {
            let cs = cache_size(epoch_block);
            assert_eq!(cs % NODE_BYTES as u64, 0);
            assert!(is_prime(cs / NODE_BYTES as u64));

            let fs = full_size(epoch_block);
            assert_eq!(fs % MIX_BYTES as u64, 0);
            assert!(is_prime(fs / MIX_BYTES as u64));
        }
    }

    #[test]
    fn epoch_number_bridges_activation_boundary() {
        let last_legacy_epoch = epoch_number(ACTIVATION_BLOCK - 1);
        let first_new_epoch = epoch_number(ACTIVATION_BLOCK);
        // The new epoch continues from half the legacy count; it must not
        // regress or jump by more than one relative to the last legacy epoch.
        assert!(first_new_epoch >= last_legacy_epoch / 2);
        assert_eq!(epoch_number(ACTIVATION_BLOCK + NEW_EPOCH_LENGTH), first_new_epoch + 1);
    }

    #[test]
    #[should_panic(expected = "exceeds MAX_EPOCH")]
    fn rejects_epoch_past_table_bound() {
        cache_size(EPOCH_LENGTH * MAX_EPOCH);
    }
}
