//! All-pairs Tanimoto similarity over a filtered table.

use rayon::prelude::*;
use tracing::{debug, info_span};

use crate::fingerprint::{tanimoto, Fingerprint};
use crate::filter::FilteredTable;

/// Similarities of every pair `(i, i + j)` for `0 <= i < n` and
/// `0 <= j < n - i`, in that nested order.
///
/// Self-pairs are included, so the result has `n (n + 1) / 2` entries and
/// each row's block starts with a 1.0 (0.0 for an all-zero fingerprint).
pub fn similarity(filtered: &FilteredTable, parallel_threshold: usize) -> Vec<f64> {
    let fingerprints: Vec<&Fingerprint> = filtered.rows().iter().map(|r| r.fingerprint()).collect();
    pairwise_similarities(&fingerprints, parallel_threshold)
}

pub fn pairwise_similarities(fingerprints: &[&Fingerprint], parallel_threshold: usize) -> Vec<f64> {
    let n = fingerprints.len();
    let _span = info_span!("similarity", n).entered();

    let row = |i: usize| -> Vec<f64> {
        fingerprints[i..]
            .iter()
            .map(|other| tanimoto(fingerprints[i], other))
            .collect()
    };

    let out: Vec<f64> = if n >= parallel_threshold {
        (0..n).into_par_iter().map(row).flatten_iter().collect()
    } else {
        (0..n).flat_map(row).collect()
    };

    debug!(pairs = out.len(), "similarities computed");
    out
}

/// Number of values [`similarity`] returns for `n` rows.
pub fn pair_count(n: usize) -> usize {
    n * (n + 1) / 2
}
