//! SMARTS query compilation and matching.
//!
//! Patterns compile to a [`QueryMol`], a molecular graph whose atoms and
//! bonds are boolean expressions. Matching runs against a parsed molecule
//! together with its [`RingInfo`], wrapped in a [`MatchContext`] that also
//! memoises recursive `$(...)` results for the duration of one search.

mod error;
mod parser;
pub mod query;

pub use error::SmartsError;
pub use query::{AtomExpr, BondExpr, MatchContext, QueryMol};

use petgraph::graph::NodeIndex;

use crate::substruct::{
    get_substruct_match_with, get_substruct_matches_with,
    get_unique_substruct_matches_with, has_rooted_match_with, AtomMapping,
};

pub fn from_smarts(s: &str) -> Result<QueryMol, SmartsError> {
    parser::parse(s)
}

pub fn has_smarts_match(ctx: &MatchContext, query: &QueryMol) -> bool {
    get_smarts_match(ctx, query).is_some()
}

pub fn get_smarts_match(ctx: &MatchContext, query: &QueryMol) -> Option<AtomMapping> {
    get_substruct_match_with(
        ctx.mol,
        query,
        |t, q| query.atom(q).matches(ctx, t),
        |t, q| query.bond(q).matches(ctx, t),
    )
}

/// All embeddings, including those that differ only by a permutation of
/// the same target atoms.
pub fn get_smarts_matches(ctx: &MatchContext, query: &QueryMol) -> Vec<AtomMapping> {
    get_substruct_matches_with(
        ctx.mol,
        query,
        |t, q| query.atom(q).matches(ctx, t),
        |t, q| query.bond(q).matches(ctx, t),
    )
}

/// Embeddings with pairwise distinct target atom sets.
pub fn get_unique_smarts_matches(ctx: &MatchContext, query: &QueryMol) -> Vec<AtomMapping> {
    get_unique_substruct_matches_with(
        ctx.mol,
        query,
        |t, q| query.atom(q).matches(ctx, t),
        |t, q| query.bond(q).matches(ctx, t),
    )
}

/// Number of matches of `query`, counting each covered atom set once.
pub fn count_unique_matches(ctx: &MatchContext, query: &QueryMol) -> usize {
    get_unique_smarts_matches(ctx, query).len()
}

pub(crate) fn rooted_match_exists(ctx: &MatchContext, query: &QueryMol, root: NodeIndex) -> bool {
    has_rooted_match_with(
        ctx.mol,
        query,
        root,
        |t, q| query.atom(q).matches(ctx, t),
        |t, q| query.bond(q).matches(ctx, t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_with_rings;

    fn count(smiles: &str, pattern: &str) -> usize {
        let (mol, rings) =
            parse_with_rings(smiles).unwrap_or_else(|e| panic!("bad SMILES {smiles:?}: {e}"));
        let query = from_smarts(pattern).unwrap_or_else(|e| panic!("bad SMARTS {pattern:?}: {e}"));
        let ctx = MatchContext::new(&mol, &rings);
        count_unique_matches(&ctx, &query)
    }

    #[test]
    fn primary_amine() {
        assert_eq!(count("c1ccccc1N", "[NH2,nH2]"), 1);
        assert_eq!(count("CN(C)C", "[NH2,nH2]"), 0);
        assert_eq!(count("NCCN", "[NH2,nH2]"), 2);
    }

    #[test]
    fn tertiary_amine() {
        assert_eq!(count("CN(C)C", "C(N(C)(C))"), 1);
        assert_eq!(count("CN(C)c1ccccc1", "c(N(C)(C))"), 1);
        assert_eq!(count("CNC", "C(N(C)(C))"), 0);
    }

    #[test]
    fn alcohol_excludes_acids() {
        assert_eq!(count("CCO", "[C!$(C=O)]-[OH]"), 1);
        assert_eq!(count("CC(=O)O", "[C!$(C=O)]-[OH]"), 0);
        assert_eq!(count("Oc1ccccc1", "c[OH1]"), 1);
    }

    #[test]
    fn sulfide_and_thiol() {
        assert_eq!(count("CSC", "[#16X2H0]"), 1);
        assert_eq!(count("CS", "[#16X2H0]"), 0);
        assert_eq!(count("CS", "[SH]"), 1);
    }

    #[test]
    fn nitro_both_forms() {
        let pattern = "[$([NX3](=O)=O),$([NX3+](=O)[O-])][!#8]";
        assert_eq!(count("c1ccccc1[N+](=O)[O-]", pattern), 1);
        assert_eq!(count("c1ccccc1N(=O)=O", pattern), 1);
        assert_eq!(count("c1ccccc1N", pattern), 0);
    }

    #[test]
    fn carboxylic_acid_and_carboxylate() {
        let pattern = "c-C(=O)[O;H1,-1]";
        assert_eq!(count("OC(=O)c1ccccc1", pattern), 1);
        assert_eq!(count("[O-]C(=O)c1ccccc1", pattern), 1);
        assert_eq!(count("CC(=O)O", pattern), 0);
    }

    #[test]
    fn trifluoromethyl_counts_once() {
        assert_eq!(count("CC(F)(F)F", "FC(F)(F)"), 1);
        assert_eq!(count("CC(F)(F)F", "C(F)"), 3);
        assert_eq!(count("CC(F)(F)F", "c(F)"), 0);
    }

    #[test]
    fn nitrile_and_sulfonic_acid() {
        assert_eq!(count("CC#N", "C#N"), 1);
        assert_eq!(count("CS(=O)(=O)O", "S(=O)(=O)(O)"), 1);
    }

    #[test]
    fn aryl_halide_with_ring_recursion() {
        let pattern = "[Cl,Br,I][c;$(c1:[c,n]:[c,n]:[c,n]:[c,n]:[c,n]:1):1]";
        assert_eq!(count("Brc1ccccc1", pattern), 1);
        assert_eq!(count("Clc1ccncc1", pattern), 1);
        assert_eq!(count("BrCC", pattern), 0);
        assert_eq!(count("Brc1ccsc1", pattern), 0);
    }

    #[test]
    fn mida_boronate() {
        let pattern = "[#6:1]B12OC(=O)C[N+](C)1CC(=O)O2";
        assert_eq!(count("c1ccccc1[B-]12OC(=O)C[N+](C)1CC(=O)O2", pattern), 1);
        assert_eq!(count("c1ccccc1B(O)O", pattern), 0);
    }

    #[test]
    fn kekule_input_matches_aromatic_patterns() {
        assert_eq!(count("C1=CC=CC=C1Br", "c(Br)"), 1);
        assert_eq!(count("C1=CC=CC=C1N", "[NH2,nH2]"), 1);
    }

    #[test]
    fn first_match_and_all_embeddings() {
        let (mol, rings) = parse_with_rings("CCO").unwrap();
        let ctx = MatchContext::new(&mol, &rings);
        let query = from_smarts("CO").unwrap();
        assert!(has_smarts_match(&ctx, &query));
        assert_eq!(get_smarts_matches(&ctx, &query).len(), 1);
        let query = from_smarts("CC").unwrap();
        assert_eq!(get_smarts_matches(&ctx, &query).len(), 2);
        assert_eq!(get_unique_smarts_matches(&ctx, &query).len(), 1);
    }
}
