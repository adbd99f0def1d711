//! Light mode: cache-only hash evaluation.
//!
//! A `LightContext` holds only the light cache (tens of megabytes) and
//! recomputes each DAG item on demand from it. That trades CPU time for
//! the gigabytes a full dataset would need, which is exactly the
//! trade-off a verifying node wants and a miner doesn't.

use crate::cache::build_cache;
use crate::dag::calc_dag_item;
use crate::error::EtchashError;
use crate::hash::{hashimoto, ComputeResult, DagSource};
use crate::node::Node;
use crate::seed::get_seedhash;
use crate::sizes::{cache_size, full_size};

/// Owns a light cache for one epoch and evaluates hashes against it.
pub struct LightContext {
    block_number: u64,
    full_size: u64,
    cache: Vec<Node>,
}

impl LightContext {
    /// Builds the light cache for the epoch containing `block_number`,
    /// using the real epoch-derived seed and cache/full sizes.
    pub fn new(block_number: u64) -> Result<Self, EtchashError> {
        let seed = get_seedhash(block_number);
        let cache_sz = cache_size(block_number);
        let full_sz = full_size(block_number);
        Self::from_sizes(block_number, &seed, cache_sz, full_sz)
    }

    /// Builds a light cache from an explicit seed and cache/full sizes
    /// instead of the real epoch growth table — the seam tests use to
    /// exercise this type at tractable sizes instead of the real ~16 MiB
    /// cache.
    pub fn from_sizes(
        block_number: u64,
        seed: &[u8; 32],
        cache_size: u64,
        full_size: u64,
    ) -> Result<Self, EtchashError> {
        let cache = build_cache(seed, cache_size)?;
        log::debug!(
            "light context ready for block {block_number}: {} cache nodes, full_size={full_size}",
            cache.len()
        );
        Ok(LightContext {
            block_number,
            full_size,
            cache,
        })
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn cache(&self) -> &[Node] {
        &self.cache
    }

    /// Evaluates the hash for `(header_hash, nonce)`.
    ///
    /// The full-dataset size used for the mix is derived from this
    /// context's own epoch, not from a caller-supplied value — the same
    /// choice the upstream C reference makes, so a stale `block_number`
    /// can't silently evaluate against the wrong epoch's dataset size.
    pub fn compute(&self, header_hash: &[u8; 32], nonce: u64) -> Result<ComputeResult, EtchashError> {
        let dag = LightDag { cache: &self.cache };
        hashimoto(header_hash, nonce, self.full_size, &dag)
    }
}

impl Drop for LightContext {
    fn drop(&mut self) {
        log::trace!("dropping light context for block {}", self.block_number);
    }
}

struct LightDag<'a> {
    cache: &'a [Node],
}

impl<'a> DagSource for LightDag<'a> {
    fn len(&self) -> u64 {
        self.cache.len() as u64
    }

    fn get(&self, index: u64) -> Node {
        calc_dag_item(self.cache, index)
    }
}
