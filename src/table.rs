//! The typed feature table produced by extraction.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::fingerprint::Fingerprint;
use crate::registry::Family;

/// One computed feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Group detector result. Signed because some detectors subtract the
    /// matches of a more specific pattern.
    Count(i64),
    /// Scalar descriptor result.
    Scalar(f64),
}

impl FeatureValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FeatureValue::Count(n) => n as f64,
            FeatureValue::Scalar(x) => x,
        }
    }

    /// Strictly positive, i.e. the group is present.
    pub fn is_positive(self) -> bool {
        match self {
            FeatureValue::Count(n) => n > 0,
            FeatureValue::Scalar(x) => x > 0.0,
        }
    }

    fn bits(self) -> (u8, u64) {
        match self {
            FeatureValue::Count(n) => (0, n as u64),
            FeatureValue::Scalar(x) => (1, x.to_bits()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub label: String,
    pub family: Family,
}

/// Ordered column set shared by every row of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self { columns, index }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One successfully parsed molecule with all of its features.
///
/// `values` is positionally aligned with the shared schema. Equality and
/// hashing look at the SMILES, the fingerprint and the exact bit patterns of
/// the values.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    smiles: String,
    fingerprint: Fingerprint,
    values: Vec<FeatureValue>,
    schema: Arc<Schema>,
}

impl FeatureRow {
    pub fn new(
        smiles: String,
        fingerprint: Fingerprint,
        values: Vec<FeatureValue>,
        schema: Arc<Schema>,
    ) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        Self {
            smiles,
            fingerprint,
            values,
            schema,
        }
    }

    pub fn smiles(&self) -> &str {
        &self.smiles
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.schema.position(name).and_then(|i| self.values.get(i).copied())
    }

    /// `(name, value)` pairs in column order.
    pub fn features(&self) -> impl Iterator<Item = (&str, FeatureValue)> + '_ {
        self.schema.names().zip(self.values.iter().copied())
    }
}

impl PartialEq for FeatureRow {
    fn eq(&self, other: &Self) -> bool {
        self.smiles == other.smiles
            && self.fingerprint == other.fingerprint
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.bits() == b.bits())
    }
}

impl Eq for FeatureRow {}

impl Hash for FeatureRow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.smiles.hash(state);
        self.fingerprint.hash(state);
        for v in &self.values {
            v.bits().hash(state);
        }
    }
}

impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 2))?;
        map.serialize_entry("smiles", &self.smiles)?;
        for (name, value) in self.features() {
            map.serialize_entry(name, &value)?;
        }
        map.serialize_entry("fp", &self.fingerprint)?;
        map.end()
    }
}

/// Every parsed row of one upload, in input order.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    schema: Arc<Schema>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(schema: Arc<Schema>, rows: Vec<FeatureRow>) -> Self {
        Self { schema, rows }
    }

    pub fn empty(schema: Arc<Schema>) -> Self {
        Self::new(schema, Vec::new())
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, or `None` when the column does not exist.
    pub fn column_values(&self, name: &str) -> Option<Vec<f64>> {
        let i = self.schema.position(name)?;
        Some(self.rows.iter().map(|r| r.values[i].as_f64()).collect())
    }
}

impl Serialize for FeatureTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}
