//! The current dataset and the request entry points.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{info, info_span};

use crate::config::{ConfigError, PipelineConfig};
use crate::extract::{extract, DroppedRow};
use crate::filter::{filter, FilterCriteria, FilterError, FilteredTable};
use crate::registry::DescriptorRegistry;
use crate::report::{summarize, Summary};
use crate::similarity::similarity;
use crate::table::FeatureTable;
use crate::toolkit::{ChemistryToolkit, GraphToolkit};

/// One uploaded dataset. Read-only once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: FeatureTable,
    pub dropped: Vec<DroppedRow>,
}

/// Holds the current dataset. A new upload swaps it wholesale.
#[derive(Debug)]
pub struct Session {
    current: RwLock<Arc<Dataset>>,
}

impl Session {
    /// A session whose dataset is the empty table for `registry`.
    pub fn new<T: ChemistryToolkit>(registry: &DescriptorRegistry<T>) -> Self {
        Self {
            current: RwLock::new(Arc::new(Dataset {
                table: FeatureTable::empty(registry.schema().clone()),
                dropped: Vec::new(),
            })),
        }
    }

    pub fn current(&self) -> Arc<Dataset> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn replace(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&dataset);
        dataset
    }
}

/// Result of one filtering request.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub filtered: FilteredTable,
    /// Includes the self-pairs, which all sit in the top histogram bin.
    pub similarity: Vec<f64>,
    pub summary: Summary,
}

/// Toolkit, registry and configuration bundled for request handling.
pub struct Pipeline<T: ChemistryToolkit> {
    toolkit: T,
    registry: DescriptorRegistry<T>,
    config: PipelineConfig,
}

impl Pipeline<GraphToolkit> {
    /// The in-crate toolkit with the standard registry.
    pub fn standard(config: PipelineConfig) -> Result<Self, ConfigError> {
        Self::new(GraphToolkit::new(), DescriptorRegistry::standard(), config)
    }
}

impl<T: ChemistryToolkit> Pipeline<T> {
    pub fn new(
        toolkit: T,
        registry: DescriptorRegistry<T>,
        config: PipelineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            toolkit,
            registry,
            config,
        })
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn registry(&self) -> &DescriptorRegistry<T> {
        &self.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn session(&self) -> Session {
        Session::new(&self.registry)
    }

    /// Runs extraction without touching any session.
    pub fn build_dataset<S: AsRef<str> + Sync>(&self, rows: &[S]) -> Dataset {
        let extraction = extract(&self.toolkit, &self.registry, &self.config, rows);
        Dataset {
            table: extraction.table,
            dropped: extraction.dropped,
        }
    }

    /// Extracts `rows` and makes the result the session's current dataset.
    pub fn upload<S: AsRef<str> + Sync>(&self, session: &Session, rows: &[S]) -> Arc<Dataset> {
        let dataset = self.build_dataset(rows);
        info!(
            rows = dataset.table.len(),
            dropped = dataset.dropped.len(),
            "dataset uploaded"
        );
        session.replace(dataset)
    }

    /// Filters the current dataset and computes similarity over the result.
    pub fn evaluate(
        &self,
        session: &Session,
        criteria: &FilterCriteria,
    ) -> Result<Evaluation, FilterError> {
        self.evaluate_dataset(&session.current(), criteria)
    }

    pub fn evaluate_dataset(
        &self,
        dataset: &Dataset,
        criteria: &FilterCriteria,
    ) -> Result<Evaluation, FilterError> {
        let _span = info_span!("evaluate").entered();
        let filtered = filter(&dataset.table, criteria)?;
        let sims = similarity(&filtered, self.config.parallel_threshold);
        info!(
            total = dataset.table.len(),
            filtered = filtered.len(),
            pairs = sims.len(),
            "request evaluated"
        );
        let summary = summarize(&dataset.table, dataset.dropped.len(), &filtered);
        Ok(Evaluation {
            filtered,
            similarity: sims,
            summary,
        })
    }
}
