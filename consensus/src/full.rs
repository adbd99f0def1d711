//! Full mode: a memory-mapped, persisted DAG.
//!
//! Building the full dataset is expensive (minutes, gigabytes), so a
//! `FullContext` tries hard to reuse a previous run's file before paying
//! to regenerate it. The on-disk layout is an 8-byte magic number
//! followed by the raw dataset; the magic number is written only after
//! every item has been generated, so a process killed mid-build leaves a
//! file that's unambiguously incomplete (wrong magic) rather than one
//! that looks valid but silently contains zeros.

use crate::cache::build_cache;
use crate::constants::{DAG_MAGIC_NUM, DAG_MAGIC_NUM_SIZE, NODE_BYTES};
use crate::dag::generate_dataset;
use crate::error::EtchashError;
use crate::hash::{hashimoto, ComputeResult, DagSource};
use crate::io::DagPathResolver;
use crate::node::{bytes_as_nodes, bytes_as_nodes_mut, Node};
use crate::seed::get_seedhash;
use crate::sizes::{cache_size, full_size};
use byteorder::{ByteOrder, LittleEndian};
use memmap2::MmapMut;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// An in-progress or completed full DAG, backed by a memory-mapped file.
pub struct FullContext {
    block_number: u64,
    full_size: u64,
    mmap: MmapMut,
    _file: std::fs::File,
}

enum Existing {
    /// File is present, the right size, and carries the magic number.
    Match,
    /// File is present but the wrong size or missing/garbled magic — stale
    /// or foreign, safe to overwrite.
    Unusable,
    Missing,
}

fn expected_file_len(full_sz: u64) -> u64 {
    DAG_MAGIC_NUM_SIZE as u64 + full_sz
}

fn inspect_existing(path: &Path, full_sz: u64) -> std::io::Result<Existing> {
    let mut file = match OpenOptions::new().read(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Existing::Missing),
        Err(e) => return Err(e),
    };
    if file.metadata()?.len() != expected_file_len(full_sz) {
        return Ok(Existing::Unusable);
    }
    let mut magic_buf = [0u8; DAG_MAGIC_NUM_SIZE];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut magic_buf)?;
    if LittleEndian::read_u64(&magic_buf) != DAG_MAGIC_NUM {
        return Ok(Existing::Unusable);
    }
    Ok(Existing::Match)
}

impl FullContext {
    /// Opens (reusing a matching on-disk file) or builds the full DAG for
    /// the epoch containing `block_number`, using the real epoch-derived
    /// seed and cache/full sizes.
    ///
    /// `progress` is forwarded to [`generate_dataset`] only when a build
    /// is actually needed; reusing a cached file calls it zero times.
    pub fn new(
        block_number: u64,
        resolver: &impl DagPathResolver,
        progress: impl FnMut(u32) -> bool,
    ) -> Result<Self, EtchashError> {
        let seed = get_seedhash(block_number);
        let cache_sz = cache_size(block_number);
        let full_sz = full_size(block_number);
        Self::from_sizes(block_number, &seed, cache_sz, full_sz, resolver, progress)
    }

    /// Opens or builds a full DAG from an explicit seed and cache/full
    /// sizes instead of the real epoch growth table — the seam tests use
    /// to exercise generation and persistence at tractable sizes instead
    /// of the real multi-gigabyte dataset.
    pub fn from_sizes(
        block_number: u64,
        seed: &[u8; 32],
        cache_size: u64,
        full_size: u64,
        resolver: &impl DagPathResolver,
        mut progress: impl FnMut(u32) -> bool,
    ) -> Result<Self, EtchashError> {
        let path = resolver.resolve(seed);

        match inspect_existing(&path, full_size)? {
            Existing::Match => {
                log::debug!("reusing DAG file at {}", path.display());
                let file = OpenOptions::new().read(true).write(true).open(&path)?;
                let mmap = unsafe { MmapMut::map_mut(&file)? };
                Ok(FullContext {
                    block_number,
                    full_size,
                    mmap,
                    _file: file,
                })
            }
            Existing::Unusable => {
                log::warn!("DAG file at {} is stale or corrupt, rebuilding", path.display());
                Self::build(block_number, seed, &path, cache_size, full_size, &mut progress)
            }
            Existing::Missing => {
                log::debug!("no DAG file at {}, building one", path.display());
                Self::build(block_number, seed, &path, cache_size, full_size, &mut progress)
            }
        }
    }

    fn build(
        block_number: u64,
        seed: &[u8; 32],
        path: &Path,
        cache_size: u64,
        full_size: u64,
        progress: &mut impl FnMut(u32) -> bool,
    ) -> Result<Self, EtchashError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(expected_file_len(full_size))?;
        let mut mmap = unsafe { MmapMut::map_mut(&file)? };

        let cache = build_cache(seed, cache_size)?;

        {
            let dataset = bytes_as_nodes_mut(&mut mmap[DAG_MAGIC_NUM_SIZE..]);
            generate_dataset(&cache, dataset, &mut *progress)?;
        }

        // Magic number goes in last: its presence is the only thing that
        // says generation finished.
        LittleEndian::write_u64(&mut mmap[..DAG_MAGIC_NUM_SIZE], DAG_MAGIC_NUM);
        mmap.flush()?;

        log::info!("built DAG file at {} ({full_size} bytes)", path.display());
        Ok(FullContext {
            block_number,
            full_size,
            mmap,
            _file: file,
        })
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    fn dataset(&self) -> &[Node] {
        bytes_as_nodes(&self.mmap[DAG_MAGIC_NUM_SIZE..])
    }

    /// Evaluates the hash for `(header_hash, nonce)` against this dataset.
    pub fn compute(&self, header_hash: &[u8; 32], nonce: u64) -> Result<ComputeResult, EtchashError> {
        hashimoto(header_hash, nonce, self.full_size, self)
    }
}

impl DagSource for FullContext {
    fn len(&self) -> u64 {
        self.full_size / NODE_BYTES as u64
    }

    fn get(&self, index: u64) -> Node {
        self.dataset()[index as usize]
    }
}

impl Drop for FullContext {
    fn drop(&mut self) {
        log::trace!("dropping full context for block {}", self.block_number);
    }
}
