//! Building-block database construction from SMILES.
//!
//! Raw SMILES rows are parsed into hydrogen-suppressed molecular graphs,
//! annotated with a registry of descriptors (logP, exact weight, functional
//! group counts and reaction-class indicators), filtered by group
//! membership and property cutoffs, and compared pairwise by Tanimoto
//! similarity of Morgan fingerprints.
//!
//! ```
//! use moldb::{FilterCriteria, Pipeline, PipelineConfig};
//!
//! let pipeline = Pipeline::standard(PipelineConfig::default()).unwrap();
//! let session = pipeline.session();
//! pipeline.upload(&session, &["CCO", "CCN", "c1ccccc1O"]);
//!
//! let criteria = FilterCriteria::default().include(["OH"]);
//! let eval = pipeline.evaluate(&session, &criteria).unwrap();
//! assert_eq!(eval.filtered.len(), 2);
//! assert_eq!(eval.similarity.len(), 3);
//! ```

pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod config;
pub mod element;
pub mod error;
pub mod extract;
pub mod filter;
pub mod fingerprint;
pub mod input;
pub mod logging;
pub mod mol;
pub mod properties;
pub mod registry;
pub mod report;
pub mod rings;
pub mod session;
pub mod similarity;
pub mod smarts;
pub mod smiles;
pub mod substruct;
pub mod table;
pub mod toolkit;

pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use config::{ConfigError, PipelineConfig};
pub use element::Element;
pub use error::{Error, Result};
pub use extract::{extract, DropReason, DroppedRow, Extraction};
pub use filter::{filter, FilterCriteria, FilterError, FilteredTable};
pub use fingerprint::{tanimoto, Fingerprint};
pub use input::{read_smiles, read_smiles_path, InputError};
pub use logging::init_tracing;
pub use mol::Mol;
pub use registry::{Descriptor, DescriptorRegistry, Family, RegistryError};
pub use report::{export_csv, summarize, ReportError, Summary};
pub use rings::RingInfo;
pub use session::{Dataset, Evaluation, Pipeline, Session};
pub use similarity::{pairwise_similarities, similarity};
pub use smarts::{from_smarts, QueryMol, SmartsError};
pub use smiles::{parse_smiles, parse_with_rings, SmilesError};
pub use table::{Column, FeatureRow, FeatureTable, FeatureValue, Schema};
pub use toolkit::{ChemistryToolkit, GraphToolkit, ParsedMolecule, ToolkitError};

#[cfg(test)]
mod tests;
