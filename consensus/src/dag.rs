//! Per-item DAG generation and full-dataset construction.

use crate::constants::{DATASET_PARENTS, MIX_BYTES, NODE_BYTES, NODE_WORDS};
use crate::error::EtchashError;
use crate::node::{fnv, Node};
use sha3::{Digest, Keccak512};

/// Computes DAG item `index` from the light cache.
///
/// Mixes in 256 pseudo-random cache parents (chosen by FNV from the
/// running mix), then finalizes with Keccak-512. This is the function
/// both the full-DAG builder and light-mode hash evaluation call — light
/// mode just calls it on demand instead of materializing every item.
pub fn calc_dag_item(cache: &[Node], index: u64) -> Node {
    let n = cache.len() as u64;
    let r = NODE_BYTES / 4; // words per node, for the `j % r` index below

    let seed_node = &cache[(index % n) as usize];
    let mut mix = *seed_node;
    let w0 = mix.word(0) ^ (index as u32);
    mix.set_word(0, w0);
    mix = Node::from_bytes(Keccak512::digest(mix.as_bytes()).into());

    for j in 0..DATASET_PARENTS {
        let cache_index = fnv((index as u32) ^ j, mix.word((j as usize) % r));
        let parent = &cache[(cache_index as u64 % n) as usize];
        for w in 0..NODE_WORDS {
            let mixed = fnv(mix.word(w), parent.word(w));
            mix.set_word(w, mixed);
        }
    }

    Node::from_bytes(Keccak512::digest(mix.as_bytes()).into())
}

/// Fills `dataset` with every DAG item for the given cache, reporting
/// progress as a non-decreasing percentage in `0..=99`.
///
/// `progress` is called at most once per percentage point, never with a
/// decreasing value. If it returns `true`, generation stops immediately
/// and this returns [`EtchashError::Cancelled`]; the caller is responsible
/// for discarding (or not persisting) a partially-built dataset.
///
/// Returns [`EtchashError::InvalidSize`] if `dataset`'s byte length isn't
/// a multiple of [`MIX_BYTES`] — the hash evaluator reads the dataset two
/// nodes (one [`MIX_BYTES`] page) at a time and requires an exact fit.
pub fn generate_dataset(
    cache: &[Node],
    dataset: &mut [Node],
    mut progress: impl FnMut(u32) -> bool,
) -> Result<(), EtchashError> {
    let mix_nodes = MIX_BYTES / NODE_BYTES;
    if dataset.len() % mix_nodes != 0 {
        return Err(EtchashError::InvalidSize {
            what: "full dataset",
            size: (dataset.len() * NODE_BYTES) as u64,
            unit: MIX_BYTES as u64,
        });
    }

    let total = dataset.len();
    let mut last_percent = None;

    for (i, slot) in dataset.iter_mut().enumerate() {
        *slot = calc_dag_item(cache, i as u64);

        let percent = ((i as u64 * 100) / total as u64).min(99) as u32;
        if last_percent != Some(percent) {
            last_percent = Some(percent);
            if progress(percent) {
                log::warn!("DAG generation cancelled at {percent}% ({i}/{total} items)");
                return Err(EtchashError::Cancelled);
            }
        }
    }

    log::debug!("generated {total} DAG items");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::build_cache;

    #[test]
    fn dag_item_is_deterministic() {
        let cache = build_cache(&[3u8; 32], NODE_BYTES as u64 * 64).unwrap();
        let a = calc_dag_item(&cache, 5);
        let b = calc_dag_item(&cache, 5);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn distinct_indices_diverge() {
        let cache = build_cache(&[3u8; 32], NODE_BYTES as u64 * 64).unwrap();
        let a = calc_dag_item(&cache, 0);
        let b = calc_dag_item(&cache, 1);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn generate_dataset_matches_item_by_item() {
        let cache = build_cache(&[9u8; 32], NODE_BYTES as u64 * 64).unwrap();
        let mut dataset = vec![Node::zeroed(); 32];
        generate_dataset(&cache, &mut dataset, |_| false).unwrap();
        for (i, item) in dataset.iter().enumerate() {
            assert_eq!(item.as_bytes(), calc_dag_item(&cache, i as u64).as_bytes());
        }
    }

    #[test]
    fn progress_is_non_decreasing_and_bounded() {
        let cache = build_cache(&[9u8; 32], NODE_BYTES as u64 * 64).unwrap();
        let mut dataset = vec![Node::zeroed(); 200];
        let mut seen = Vec::new();
        generate_dataset(&cache, &mut dataset, |p| {
            seen.push(p);
            false
        })
        .unwrap();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|&p| p <= 99));
    }

    #[test]
    fn cancellation_stops_generation() {
        let cache = build_cache(&[9u8; 32], NODE_BYTES as u64 * 64).unwrap();
        let mut dataset = vec![Node::zeroed(); 200];
        let mut calls = 0;
        let result = generate_dataset(&cache, &mut dataset, |_| {
            calls += 1;
            calls >= 3
        });
        assert!(matches!(result, Err(EtchashError::Cancelled)));
    }

    #[test]
    fn rejects_dataset_not_a_whole_number_of_mix_pages() {
        let cache = build_cache(&[9u8; 32], NODE_BYTES as u64 * 64).unwrap();
        let mut dataset = vec![Node::zeroed(); 3]; // 3 nodes, not a multiple of 2
        let result = generate_dataset(&cache, &mut dataset, |_| false);
        assert!(matches!(
            result,
            Err(EtchashError::InvalidSize { what: "full dataset", .. })
        ));
    }
}
