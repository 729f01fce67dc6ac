//! Feature extraction: raw SMILES rows to a [`FeatureTable`].

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::config::PipelineConfig;
use crate::registry::DescriptorRegistry;
use crate::table::{FeatureRow, FeatureTable};
use crate::toolkit::ChemistryToolkit;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DropReason {
    /// The toolkit could not parse the SMILES.
    Parse(String),
    /// A registered detector failed on a parsed molecule.
    Detector { name: String, message: String },
}

/// A raw input row that produced no feature row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRow {
    /// Position in the raw input.
    pub index: usize,
    pub smiles: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub table: FeatureTable,
    pub dropped: Vec<DroppedRow>,
}

impl Extraction {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Parses every row and applies the whole registry to each molecule.
///
/// Rows that fail to parse, or on which a detector fails, are left out of
/// the table and reported in [`Extraction::dropped`]. Output order is input
/// order whether or not the work is spread over rayon.
pub fn extract<T, S>(
    toolkit: &T,
    registry: &DescriptorRegistry<T>,
    config: &PipelineConfig,
    rows: &[S],
) -> Extraction
where
    T: ChemistryToolkit,
    S: AsRef<str> + Sync,
{
    let _span = info_span!("extract", rows = rows.len()).entered();

    let run = |(index, raw): (usize, &S)| {
        extract_row(toolkit, registry, config, index, raw.as_ref())
    };
    let results: Vec<Result<FeatureRow, DroppedRow>> = if rows.len() >= config.parallel_threshold {
        rows.par_iter().enumerate().map(run).collect()
    } else {
        rows.iter().enumerate().map(run).collect()
    };

    let mut kept = Vec::with_capacity(results.len());
    let mut dropped = Vec::new();
    for result in results {
        match result {
            Ok(row) => kept.push(row),
            Err(drop) => {
                debug!(
                    index = drop.index,
                    smiles = %drop.smiles,
                    reason = ?drop.reason,
                    "row dropped"
                );
                dropped.push(drop);
            }
        }
    }

    if !dropped.is_empty() {
        warn!(dropped = dropped.len(), "rows dropped during extraction");
    }
    info!(rows = kept.len(), dropped = dropped.len(), "extraction complete");

    Extraction {
        table: FeatureTable::new(registry.schema().clone(), kept),
        dropped,
    }
}

fn extract_row<T: ChemistryToolkit>(
    toolkit: &T,
    registry: &DescriptorRegistry<T>,
    config: &PipelineConfig,
    index: usize,
    smiles: &str,
) -> Result<FeatureRow, DroppedRow> {
    let dropped_as = |reason| DroppedRow {
        index,
        smiles: smiles.to_string(),
        reason,
    };

    let mol = toolkit
        .parse_molecule(smiles)
        .map_err(|e| dropped_as(DropReason::Parse(e.to_string())))?;
    let fingerprint = toolkit.fingerprint(&mol, config.fingerprint_radius, config.fingerprint_bits);

    let mut values = Vec::with_capacity(registry.len());
    for descriptor in registry.descriptors() {
        let value = (descriptor.compute)(toolkit, &mol, config).map_err(|e| {
            warn!(descriptor = descriptor.name, smiles, error = %e, "detector failed");
            dropped_as(DropReason::Detector {
                name: descriptor.name.to_string(),
                message: e.to_string(),
            })
        })?;
        values.push(value);
    }

    Ok(FeatureRow::new(
        smiles.to_string(),
        fingerprint,
        values,
        registry.schema().clone(),
    ))
}
