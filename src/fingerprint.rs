//! Fixed-length bit-vector fingerprints and their similarity.

use serde::{Deserialize, Serialize};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::rings::RingInfo;

/// A fixed-size bit vector, stored as `u64` words.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    bits: Vec<u64>,
    nbits: usize,
}

impl Fingerprint {
    /// An all-zero fingerprint of `nbits` bits.
    pub fn new(nbits: usize) -> Self {
        Fingerprint {
            bits: vec![0u64; nbits.div_ceil(64)],
            nbits,
        }
    }

    /// Sets bit `pos`, folded into range.
    pub fn set_bit(&mut self, pos: usize) {
        if self.nbits == 0 {
            return;
        }
        let pos = pos % self.nbits;
        self.bits[pos / 64] |= 1u64 << (pos % 64);
    }

    pub fn get_bit(&self, pos: usize) -> bool {
        if pos >= self.nbits {
            return false;
        }
        (self.bits[pos / 64] >> (pos % 64)) & 1 == 1
    }

    pub fn count_ones(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    pub fn nbits(&self) -> usize {
        self.nbits
    }

    pub fn words(&self) -> &[u64] {
        &self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }
}

/// Jaccard distance: bits set in exactly one vector over bits set in at
/// least one. Two all-zero vectors are at distance 1.0.
///
/// Fingerprints of different lengths are compared over their common words.
pub fn jaccard_distance(a: &Fingerprint, b: &Fingerprint) -> f64 {
    debug_assert_eq!(a.nbits, b.nbits, "fingerprints must have the same size");

    let mut xor_count = 0u32;
    let mut or_count = 0u32;
    for (w1, w2) in a.bits.iter().zip(&b.bits) {
        xor_count += (w1 ^ w2).count_ones();
        or_count += (w1 | w2).count_ones();
    }

    if or_count == 0 {
        return 1.0;
    }
    f64::from(xor_count) / f64::from(or_count)
}

/// Tanimoto similarity, `1 - jaccard_distance`. All-zero pairs score 0.0.
pub fn tanimoto(a: &Fingerprint, b: &Fingerprint) -> f64 {
    1.0 - jaccard_distance(a, b)
}

/// Morgan (ECFP-like) fingerprint of a parsed molecule.
///
/// `radius` 2 corresponds to ECFP4. Atom invariants are element, degree,
/// hydrogen count, charge, isotope, ring membership and aromaticity; each
/// iteration folds in the sorted `(neighbour identifier, bond order)` pairs.
pub fn morgan_fingerprint(
    mol: &Mol<Atom, Bond>,
    rings: &RingInfo,
    radius: u32,
    nbits: usize,
) -> Fingerprint {
    let mut fp = Fingerprint::new(nbits);
    if mol.atom_count() == 0 || nbits == 0 {
        return fp;
    }

    let mut identifiers: Vec<u64> = mol
        .atoms()
        .map(|idx| {
            let atom = mol.atom(idx);
            let mut h = FNV_OFFSET;
            h = fnv1a_update(h, u64::from(atom.atomic_num()));
            h = fnv1a_update(h, mol.degree(idx) as u64);
            h = fnv1a_update(h, u64::from(atom.hydrogen_count));
            h = fnv1a_update(h, atom.formal_charge as u64);
            h = fnv1a_update(h, u64::from(atom.isotope));
            h = fnv1a_update(h, u64::from(rings.is_ring_atom(idx)));
            fnv1a_update(h, u64::from(atom.is_aromatic))
        })
        .collect();

    for &id in &identifiers {
        fp.set_bit(fold_hash(id, nbits));
    }

    for _ in 0..radius {
        let next: Vec<u64> = mol
            .atoms()
            .map(|idx| {
                let mut neighbor_ids: Vec<(u64, u64)> = mol
                    .bonds_of(idx)
                    .filter_map(|e| {
                        let (a, b) = mol.bond_endpoints(e)?;
                        let other = if a == idx { b } else { a };
                        Some((identifiers[other.index()], mol.bond(e).order.hash_code()))
                    })
                    .collect();
                neighbor_ids.sort_unstable();

                let mut h = fnv1a_update(FNV_OFFSET, identifiers[idx.index()]);
                for (nid, order) in neighbor_ids {
                    h = fnv1a_update(h, nid);
                    h = fnv1a_update(h, order);
                }
                h
            })
            .collect();
        for &id in &next {
            fp.set_bit(fold_hash(id, nbits));
        }
        identifiers = next;
    }

    fp
}

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a_update(hash: u64, value: u64) -> u64 {
    value
        .to_le_bytes()
        .iter()
        .fold(hash, |h, &b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

fn fold_hash(hash: u64, nbits: usize) -> usize {
    (hash % nbits as u64) as usize
}
