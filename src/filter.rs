//! Group inclusion/exclusion and continuous cutoffs over a feature table.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info_span};

use crate::config::PipelineConfig;
use crate::table::{FeatureRow, FeatureTable, Schema};

pub const MOLWT: &str = "molwt";
pub const LOGP: &str = "logp";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("unknown group {0:?}")]
    UnknownGroup(String),
    #[error("{0:?} is a scalar descriptor, not a group")]
    NotAGroup(String),
    #[error("cutoff {field} is NaN")]
    InvalidCutoff { field: &'static str },
    #[error("feature table has no {0:?} column")]
    MissingColumn(&'static str),
    #[error("invalid criteria JSON: {0}")]
    Json(String),
}

/// One filtering request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    /// Groups whose members are added (union).
    pub include: BTreeSet<String>,
    /// Groups whose members are removed.
    pub exclude: BTreeSet<String>,
    /// Rows need `molwt` strictly below this.
    pub molwt_cutoff: f64,
    /// Rows need `logp` strictly below this.
    pub logp_cutoff: f64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::with_cutoffs(&PipelineConfig::default())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CriteriaJson {
    #[serde(default)]
    include: BTreeSet<String>,
    #[serde(default)]
    exclude: BTreeSet<String>,
    molwt_cutoff: Option<f64>,
    logp_cutoff: Option<f64>,
}

impl FilterCriteria {
    /// Empty selections with the configured default cutoffs.
    pub fn with_cutoffs(config: &PipelineConfig) -> Self {
        Self {
            include: BTreeSet::new(),
            exclude: BTreeSet::new(),
            molwt_cutoff: config.default_molwt_cutoff,
            logp_cutoff: config.default_logp_cutoff,
        }
    }

    /// Parses `{"include": [...], "exclude": [...], "molwt_cutoff": x,
    /// "logp_cutoff": y}`; omitted fields take their defaults from `config`.
    pub fn from_json(json: &str, config: &PipelineConfig) -> Result<Self, FilterError> {
        let raw: CriteriaJson =
            serde_json::from_str(json).map_err(|e| FilterError::Json(e.to_string()))?;
        Ok(Self {
            include: raw.include,
            exclude: raw.exclude,
            molwt_cutoff: raw.molwt_cutoff.unwrap_or(config.default_molwt_cutoff),
            logp_cutoff: raw.logp_cutoff.unwrap_or(config.default_logp_cutoff),
        })
    }

    pub fn include<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(groups.into_iter().map(Into::into));
        self
    }
}

/// Rows of a feature table that survived a filter, in table order.
#[derive(Debug, Clone)]
pub struct FilteredTable {
    schema: Arc<Schema>,
    rows: Vec<FeatureRow>,
    positions: Vec<usize>,
}

impl FilteredTable {
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    /// Position of each kept row in the source table.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<f64>> {
        let i = self.schema.position(name)?;
        Some(self.rows.iter().map(|r| r.values()[i].as_f64()).collect())
    }
}

impl Serialize for FilteredTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

/// Applies `criteria` to `table`.
///
/// 1. Union of rows with a positive value in any included group.
/// 2. Rows equal by value are kept once (first occurrence).
/// 3. Rows positive in any excluded group are removed.
/// 4. `molwt < molwt_cutoff` and `logp < logp_cutoff`.
///
/// Nothing is included when `include` is empty.
pub fn filter(
    table: &FeatureTable,
    criteria: &FilterCriteria,
) -> Result<FilteredTable, FilterError> {
    let _span = info_span!("filter", rows = table.len()).entered();
    let schema = table.schema();

    let included = group_columns(schema, &criteria.include)?;
    let excluded = group_columns(schema, &criteria.exclude)?;
    for (field, value) in [
        ("molwt_cutoff", criteria.molwt_cutoff),
        ("logp_cutoff", criteria.logp_cutoff),
    ] {
        if value.is_nan() {
            return Err(FilterError::InvalidCutoff { field });
        }
    }
    let molwt = schema.position(MOLWT).ok_or(FilterError::MissingColumn(MOLWT))?;
    let logp = schema.position(LOGP).ok_or(FilterError::MissingColumn(LOGP))?;

    let rows = table.rows();
    let positive_in = |columns: &[usize]| -> BTreeSet<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| columns.iter().any(|&c| row.values()[c].is_positive()))
            .map(|(i, _)| i)
            .collect()
    };

    let inclusion = positive_in(&included);

    let mut seen: HashSet<&FeatureRow> = HashSet::new();
    let unique: BTreeSet<usize> = inclusion
        .into_iter()
        .filter(|&i| seen.insert(&rows[i]))
        .collect();

    let exclusion = positive_in(&excluded);

    let positions: Vec<usize> = unique
        .difference(&exclusion)
        .copied()
        .filter(|&i| {
            let values = rows[i].values();
            values[molwt].as_f64() < criteria.molwt_cutoff
                && values[logp].as_f64() < criteria.logp_cutoff
        })
        .collect();

    debug!(kept = positions.len(), "filter applied");
    Ok(FilteredTable {
        schema: schema.clone(),
        rows: positions.iter().map(|&i| rows[i].clone()).collect(),
        positions,
    })
}

fn group_columns(schema: &Schema, names: &BTreeSet<String>) -> Result<Vec<usize>, FilterError> {
    names
        .iter()
        .map(|name| {
            let column = schema
                .column(name)
                .ok_or_else(|| FilterError::UnknownGroup(name.clone()))?;
            if !column.family.is_group() {
                return Err(FilterError::NotAGroup(name.clone()));
            }
            schema
                .position(name)
                .ok_or_else(|| FilterError::UnknownGroup(name.clone()))
        })
        .collect()
}
