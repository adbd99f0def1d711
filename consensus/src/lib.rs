//! Etchash: the Ethash-family proof-of-work algorithm used by Ethereum
//! Classic, including the ECIP-1099 ("Thanos") epoch-length change.
//!
//! This crate builds and evaluates against the DAG — seed derivation,
//! the SeqMemoHash cache, per-item DAG generation, and the memory-hard
//! hash evaluator — in both a cache-only ("light") mode for verifiers
//! and a persisted, memory-mapped ("full") mode for miners. It does not
//! decide where DAG files live (see [`io::DagPathResolver`]), search for
//! nonces, or know anything about blocks, transactions, or networking.

pub mod cache;
pub mod constants;
pub mod dag;
pub mod error;
pub mod full;
pub mod hash;
pub mod io;
pub mod light;
pub mod node;
pub mod seed;
pub mod sizes;

pub use error::EtchashError;
pub use full::FullContext;
pub use hash::{ComputeResult, DagSource};
pub use io::{DagPathResolver, FixedDirResolver};
pub use light::LightContext;
pub use node::Node;
pub use seed::get_seedhash;
pub use sizes::{cache_size, epoch_length, epoch_number, full_size};

use hash::quick_check_difficulty as quick_check_difficulty_impl;
use hash::quick_hash as quick_hash_impl;

/// Recomputes the result hash from a claimed mix digest, without touching
/// the DAG. See [`hash::quick_hash`].
pub fn quick_hash(header_hash: &[u8; 32], nonce: u64, mix_hash: &[u8; 32]) -> [u8; 32] {
    quick_hash_impl(header_hash, nonce, mix_hash)
}

/// Cheaply checks whether a claimed solution meets a target boundary.
/// See [`hash::quick_check_difficulty`].
pub fn quick_check_difficulty(
    header_hash: &[u8; 32],
    nonce: u64,
    mix_hash: &[u8; 32],
    boundary: &[u8; 32],
) -> bool {
    quick_check_difficulty_impl(header_hash, nonce, mix_hash, boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::{MIX_BYTES, NODE_BYTES};

    // Small synthetic sizes: a real epoch's ~16 MiB cache and ~1 GiB
    // dataset are impractical to materialize in a test.
    const TEST_SEED: [u8; 32] = [0u8; 32];
    const TEST_CACHE_SIZE: u64 = NODE_BYTES as u64 * 64;
    const TEST_FULL_SIZE: u64 = MIX_BYTES as u64 * 64;

    #[test]
    fn light_and_full_agree_on_the_same_header_and_nonce() {
        let light = LightContext::from_sizes(0, &TEST_SEED, TEST_CACHE_SIZE, TEST_FULL_SIZE).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let resolver = FixedDirResolver::new(dir.path());
        let full = FullContext::from_sizes(0, &TEST_SEED, TEST_CACHE_SIZE, TEST_FULL_SIZE, &resolver, |_| false).unwrap();

        let header = [0x42u8; 32];
        let nonce = 123_456_789u64;

        let light_result = light.compute(&header, nonce).unwrap();
        let full_result = full.compute(&header, nonce).unwrap();

        assert_eq!(light_result.mix_hash, full_result.mix_hash);
        assert_eq!(light_result.result, full_result.result);
    }

    #[test]
    fn quick_hash_matches_the_full_evaluator() {
        let light = LightContext::from_sizes(0, &TEST_SEED, TEST_CACHE_SIZE, TEST_FULL_SIZE).unwrap();
        let header = [0x07u8; 32];
        let nonce = 1;

        let computed = light.compute(&header, nonce).unwrap();
        assert_eq!(quick_hash(&header, nonce, &computed.mix_hash), computed.result);
    }
}
