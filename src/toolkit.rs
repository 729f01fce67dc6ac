//! The chemistry boundary the pipeline talks to.
//!
//! Pipeline stages only see [`ChemistryToolkit`]; [`GraphToolkit`] is the
//! in-crate implementation over the petgraph molecule model.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::fingerprint::{morgan_fingerprint, Fingerprint};
use crate::mol::Mol;
use crate::properties::{crippen_log_p, exact_weight};
use crate::rings::RingInfo;
use crate::smarts::{count_unique_matches, from_smarts, MatchContext, QueryMol, SmartsError};
use crate::smiles::{parse_with_rings, SmilesError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolkitError {
    #[error("invalid SMILES: {0}")]
    InvalidSmiles(#[from] SmilesError),
    #[error("invalid SMARTS pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: SmartsError,
    },
}

/// Cheminformatics primitives required by the pipeline.
pub trait ChemistryToolkit: Send + Sync {
    /// Parsed molecule handle. Opaque to the pipeline.
    type Molecule: Send + Sync;

    fn parse_molecule(&self, smiles: &str) -> Result<Self::Molecule, ToolkitError>;

    fn fingerprint(&self, mol: &Self::Molecule, radius: u32, n_bits: usize) -> Fingerprint;

    /// Number of unique matches of the SMARTS `pattern`.
    fn substructure_match_count(&self, mol: &Self::Molecule, pattern: &str)
        -> Result<u32, ToolkitError>;

    fn log_p(&self, mol: &Self::Molecule) -> f64;

    fn exact_weight(&self, mol: &Self::Molecule) -> f64;
}

/// A parsed molecule with its ring perception.
#[derive(Debug, Clone)]
pub struct ParsedMolecule {
    pub mol: Mol<Atom, Bond>,
    pub rings: RingInfo,
}

/// [`ChemistryToolkit`] over [`Mol`], caching compiled SMARTS by pattern text.
#[derive(Debug, Default)]
pub struct GraphToolkit {
    patterns: DashMap<String, Arc<QueryMol>>,
}

impl GraphToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `pattern`, or returns the cached compilation.
    pub fn compile(&self, pattern: &str) -> Result<Arc<QueryMol>, ToolkitError> {
        if let Some(query) = self.patterns.get(pattern) {
            return Ok(Arc::clone(query.value()));
        }
        debug!(pattern, "compiling SMARTS");
        let query = from_smarts(pattern).map_err(|source| ToolkitError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let query = Arc::new(query);
        self.patterns
            .entry(pattern.to_string())
            .or_insert_with(|| Arc::clone(&query));
        Ok(query)
    }

    pub fn cached_patterns(&self) -> usize {
        self.patterns.len()
    }
}

impl ChemistryToolkit for GraphToolkit {
    type Molecule = ParsedMolecule;

    fn parse_molecule(&self, smiles: &str) -> Result<ParsedMolecule, ToolkitError> {
        let (mol, rings) = parse_with_rings(smiles)?;
        Ok(ParsedMolecule { mol, rings })
    }

    fn fingerprint(&self, mol: &ParsedMolecule, radius: u32, n_bits: usize) -> Fingerprint {
        morgan_fingerprint(&mol.mol, &mol.rings, radius, n_bits)
    }

    fn substructure_match_count(
        &self,
        mol: &ParsedMolecule,
        pattern: &str,
    ) -> Result<u32, ToolkitError> {
        let query = self.compile(pattern)?;
        let ctx = MatchContext::new(&mol.mol, &mol.rings);
        let n = count_unique_matches(&ctx, &query);
        Ok(u32::try_from(n).unwrap_or(u32::MAX))
    }

    fn log_p(&self, mol: &ParsedMolecule) -> f64 {
        crippen_log_p(&mol.mol, &mol.rings)
    }

    fn exact_weight(&self, mol: &ParsedMolecule) -> f64 {
        exact_weight(&mol.mol)
    }
}
