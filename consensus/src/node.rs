//! The 64-byte `Node`: the atom of both the cache and the DAG.
//!
//! A node is read and written as raw bytes (for hashing and for the
//! on-disk/mmap'd format) and as sixteen little-endian 32-bit words (for
//! the FNV mixing pipeline). `Node` derives `bytemuck::Pod`, so a `&[Node]`
//! can be reinterpreted as `&[u8]` (and back) for free — this is what lets
//! the full DAG live directly in a memory-mapped file without a copy.

use crate::constants::{NODE_BYTES, NODE_WORDS};
use bytemuck::{Pod, Zeroable};
use byteorder::{ByteOrder, LittleEndian};

/// A 64-byte node, viewable as 16 little-endian 32-bit words.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Node {
    bytes: [u8; NODE_BYTES],
}

impl Node {
    /// The all-zero node.
    pub const fn zeroed() -> Self {
        Node {
            bytes: [0u8; NODE_BYTES],
        }
    }

    /// Builds a node from a raw 64-byte buffer (e.g. a Keccak-512 digest).
    pub fn from_bytes(bytes: [u8; NODE_BYTES]) -> Self {
        Node { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; NODE_BYTES] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; NODE_BYTES] {
        &mut self.bytes
    }

    /// Reads word `i` (0..16) as a little-endian `u32`.
    #[inline]
    pub fn word(&self, i: usize) -> u32 {
        LittleEndian::read_u32(&self.bytes[i * 4..i * 4 + 4])
    }

    /// Overwrites word `i` (0..16) with a little-endian `u32`.
    #[inline]
    pub fn set_word(&mut self, i: usize, value: u32) {
        LittleEndian::write_u32(&mut self.bytes[i * 4..i * 4 + 4], value);
    }

    /// XORs word `i` in place.
    #[inline]
    pub fn xor_word(&mut self, i: usize, value: u32) {
        let w = self.word(i) ^ value;
        self.set_word(i, w);
    }
}

/// Casts a slice of nodes to its flat byte representation.
pub fn nodes_as_bytes(nodes: &[Node]) -> &[u8] {
    bytemuck::cast_slice(nodes)
}

/// Casts a mutable slice of nodes to its flat byte representation.
pub fn nodes_as_bytes_mut(nodes: &mut [Node]) -> &mut [u8] {
    bytemuck::cast_slice_mut(nodes)
}

/// Casts a flat byte buffer to a slice of nodes.
///
/// Panics if `bytes.len()` is not a multiple of [`NODE_BYTES`] or the
/// buffer is misaligned for `Node` (both are programmer errors at every
/// call site in this crate: sizes are validated before this is called).
pub fn bytes_as_nodes(bytes: &[u8]) -> &[Node] {
    bytemuck::cast_slice(bytes)
}

pub fn bytes_as_nodes_mut(bytes: &mut [u8]) -> &mut [Node] {
    bytemuck::cast_slice_mut(bytes)
}

/// FNV-1 mix: `(a * 0x01000193) XOR b`, wrapping on overflow.
///
/// This is the single non-cryptographic mixing primitive used throughout
/// the cache builder, the DAG item generator, and the hash evaluator.
#[inline]
pub fn fnv(a: u32, b: u32) -> u32 {
    a.wrapping_mul(crate::constants::FNV_PRIME) ^ b
}

/// Applies [`fnv`] word-by-word, folding `src` into `dst`.
pub fn fnv_mix_node(dst: &mut Node, src: &Node) {
    for w in 0..NODE_WORDS {
        let mixed = fnv(dst.word(w), src.word(w));
        dst.set_word(w, mixed);
    }
}
