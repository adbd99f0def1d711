//! SeqMemoHash: builds the light cache from an epoch seed.
//!
//! Sergio Lerner's sequential memory-hard hash function. The cache starts
//! as a plain Keccak-512 hash chain, then gets `CACHE_ROUNDS` passes of
//! an xor-then-rehash shuffle so that computing any single entry out of
//! order requires (close to) the full sequential chain.

use crate::constants::{CACHE_ROUNDS, NODE_BYTES};
use crate::error::EtchashError;
use crate::node::Node;
use sha3::{Digest, Keccak512};

fn xor_bytes(a: &[u8; NODE_BYTES], b: &[u8; NODE_BYTES]) -> [u8; NODE_BYTES] {
    let mut out = [0u8; NODE_BYTES];
    for i in 0..NODE_BYTES {
        out[i] = a[i] ^ b[i];
    }
    out
}

/// Builds the light cache for an epoch.
///
/// `cache_size` must be a multiple of [`NODE_BYTES`]; callers obtain it
/// from [`crate::sizes::cache_size`], which guarantees this. Returns
/// [`EtchashError::InvalidSize`] if it isn't — e.g. a caller-supplied
/// synthetic size for testing that doesn't respect the invariant.
pub fn build_cache(seed: &[u8; 32], cache_size: u64) -> Result<Vec<Node>, EtchashError> {
    if cache_size % NODE_BYTES as u64 != 0 {
        return Err(EtchashError::InvalidSize {
            what: "cache",
            size: cache_size,
            unit: NODE_BYTES as u64,
        });
    }
    let n = (cache_size / NODE_BYTES as u64) as usize;

    let mut cache: Vec<Node> = Vec::with_capacity(n);
    let mut digest: [u8; NODE_BYTES] = Keccak512::digest(seed).into();
    cache.push(Node::from_bytes(digest));
    for _ in 1..n {
        digest = Keccak512::digest(digest).into();
        cache.push(Node::from_bytes(digest));
    }

    log::trace!("seeded {n}-node cache, applying {CACHE_ROUNDS} SeqMemoHash rounds");

    for round in 0..CACHE_ROUNDS {
        for i in 0..n {
            let v = (cache[i].word(0) as usize) % n;
            let prev = (i + n - 1) % n;
            let mixed = xor_bytes(cache[prev].as_bytes(), cache[v].as_bytes());
            cache[i] = Node::from_bytes(Keccak512::digest(mixed).into());
        }
        log::trace!("SeqMemoHash round {round} complete");
    }

    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_is_deterministic() {
        let seed = [7u8; 32];
        let a = build_cache(&seed, NODE_BYTES as u64 * 64).unwrap();
        let b = build_cache(&seed, NODE_BYTES as u64 * 64).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.as_bytes(), y.as_bytes());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a = build_cache(&[1u8; 32], NODE_BYTES as u64 * 64).unwrap();
        let b = build_cache(&[2u8; 32], NODE_BYTES as u64 * 64).unwrap();
        assert_ne!(a[0].as_bytes(), b[0].as_bytes());
        assert_ne!(a.last().unwrap().as_bytes(), b.last().unwrap().as_bytes());
    }

    #[test]
    fn cache_has_requested_node_count() {
        let cache = build_cache(&[0u8; 32], NODE_BYTES as u64 * 128).unwrap();
        assert_eq!(cache.len(), 128);
    }

    #[test]
    fn rejects_size_not_a_multiple_of_node_bytes() {
        let result = build_cache(&[0u8; 32], NODE_BYTES as u64 * 128 + 1);
        assert!(matches!(
            result,
            Err(EtchashError::InvalidSize { what: "cache", .. })
        ));
    }
}
