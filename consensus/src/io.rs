//! DAG file path resolution.
//!
//! The upstream C reference hardcodes a cache directory layout. We pull
//! that policy out behind a trait so embedders decide where DAG files
//! live — a platform data directory, a ramdisk, a test tempdir — without
//! touching the persistence logic in [`crate::full`].

use std::path::PathBuf;

/// Chooses the on-disk path for a given epoch's full DAG.
pub trait DagPathResolver {
    /// Returns the path a DAG for this `seed` should be read from or
    /// written to. Implementations typically derive the filename from
    /// the seed so different epochs never collide.
    fn resolve(&self, seed: &[u8; 32]) -> PathBuf;
}

/// Resolves every DAG to a file under a single fixed directory, named
/// after the epoch seed.
pub struct FixedDirResolver {
    dir: PathBuf,
}

impl FixedDirResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FixedDirResolver { dir: dir.into() }
    }
}

impl DagPathResolver for FixedDirResolver {
    fn resolve(&self, seed: &[u8; 32]) -> PathBuf {
        let name = format!("full-R23-{}", etchash_util::bytes_to_hex(&seed[..8]));
        self.dir.join(name)
    }
}
