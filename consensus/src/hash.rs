//! The memory-hard hash evaluator (hashimoto) and the cheap difficulty
//! pre-check that doesn't require touching the DAG at all.

use crate::constants::{ACCESSES, MIX_BYTES, NODE_BYTES, NODE_WORDS};
use crate::error::EtchashError;
use crate::node::{fnv, Node};
use byteorder::{ByteOrder, LittleEndian};
use sha3::{Digest, Keccak256, Keccak512};

/// A DAG, abstracted over its backing storage so the evaluator doesn't
/// care whether items come from an in-memory `Vec<Node>`, a light-mode
/// on-demand recomputation, or a memory-mapped file.
pub trait DagSource {
    /// Number of 64-byte nodes in the full dataset.
    fn len(&self) -> u64;
    /// Fetches node `index` (`index < self.len()`).
    fn get(&self, index: u64) -> Node;
}

/// The output of a full hash evaluation: the proof-of-work mix digest and
/// the final comparison value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeResult {
    pub mix_hash: [u8; 32],
    pub result: [u8; 32],
}

/// Evaluates the memory-hard hash for `(header_hash, nonce)` against a DAG.
///
/// Used identically by light mode (where `dag` recomputes each item from
/// the cache on demand) and full mode (where `dag` indexes a materialized
/// or memory-mapped dataset) — the two differ only in how `DagSource` is
/// implemented, never in this function.
///
/// Returns [`EtchashError::InvalidSize`] if `full_size` isn't a multiple
/// of [`MIX_BYTES`] — the mix accumulator advances through the dataset
/// one `MIX_BYTES` page at a time and requires an exact fit.
pub fn hashimoto(
    header_hash: &[u8; 32],
    nonce: u64,
    full_size: u64,
    dag: &impl DagSource,
) -> Result<ComputeResult, EtchashError> {
    if full_size % MIX_BYTES as u64 != 0 {
        return Err(EtchashError::InvalidSize {
            what: "full dataset",
            size: full_size,
            unit: MIX_BYTES as u64,
        });
    }

    let n = full_size / NODE_BYTES as u64;
    let w = MIX_BYTES / 4;
    let mix_nodes = MIX_BYTES / NODE_BYTES;

    let mut seed_input = [0u8; 40];
    seed_input[..32].copy_from_slice(header_hash);
    seed_input[32..].copy_from_slice(&nonce.to_le_bytes());
    let s_bytes: [u8; 64] = Keccak512::digest(seed_input).into();
    let s = Node::from_bytes(s_bytes);

    let mut mix: Vec<Node> = (0..mix_nodes).map(|_| s).collect();

    for i in 0..ACCESSES {
        let slot = i as usize % w;
        let mix_word = mix[slot / NODE_WORDS].word(slot % NODE_WORDS);
        let p = (fnv(i ^ s.word(0), mix_word) as u64 % (n / mix_nodes as u64)) * mix_nodes as u64;

        for j in 0..mix_nodes {
            let parent = dag.get(p + j as u64);
            for w_idx in 0..NODE_WORDS {
                let mixed = fnv(mix[j].word(w_idx), parent.word(w_idx));
                mix[j].set_word(w_idx, mixed);
            }
        }
    }

    let word_at = |idx: usize| mix[idx / NODE_WORDS].word(idx % NODE_WORDS);
    let mut mix_hash = [0u8; 32];
    for i in 0..8 {
        let base = i * 4;
        let compressed = fnv(fnv(fnv(word_at(base), word_at(base + 1)), word_at(base + 2)), word_at(base + 3));
        LittleEndian::write_u32(&mut mix_hash[i * 4..i * 4 + 4], compressed);
    }

    let mut result_input = [0u8; 96];
    result_input[..64].copy_from_slice(&s_bytes);
    result_input[64..].copy_from_slice(&mix_hash);
    let result: [u8; 32] = Keccak256::digest(result_input).into();

    Ok(ComputeResult { mix_hash, result })
}

/// Recomputes the final result hash from a claimed mix digest, without
/// touching the DAG.
///
/// This is what lets a node cheaply reject a submitted solution whose
/// mix digest doesn't meet the target, before paying for a full
/// [`hashimoto`] recomputation to confirm the mix digest itself is valid.
pub fn quick_hash(header_hash: &[u8; 32], nonce: u64, mix_hash: &[u8; 32]) -> [u8; 32] {
    let mut seed_input = [0u8; 40];
    seed_input[..32].copy_from_slice(header_hash);
    seed_input[32..].copy_from_slice(&nonce.to_le_bytes());
    let s_bytes: [u8; 64] = Keccak512::digest(seed_input).into();

    let mut result_input = [0u8; 96];
    result_input[..64].copy_from_slice(&s_bytes);
    result_input[64..].copy_from_slice(mix_hash);
    Keccak256::digest(result_input).into()
}

/// True if `quick_hash(header_hash, nonce, mix_hash)`, read as a big-endian
/// 256-bit number, is at or below `boundary`.
pub fn quick_check_difficulty(header_hash: &[u8; 32], nonce: u64, mix_hash: &[u8; 32], boundary: &[u8; 32]) -> bool {
    quick_hash(header_hash, nonce, mix_hash) <= *boundary
}
