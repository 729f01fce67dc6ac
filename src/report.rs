//! Summaries of the full and filtered tables, and CSV export.

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::filter::{FilteredTable, LOGP, MOLWT};
use crate::registry::Family;
use crate::table::FeatureTable;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV export failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Values of one scalar column, for overlaid histograms.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Distribution {
    pub full: Vec<f64>,
    pub filtered: Vec<f64>,
}

/// Summed counts of one functional group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub name: String,
    pub label: String,
    pub full: i64,
    pub filtered: i64,
}

/// Counts and histogram inputs for one request. The similarity values travel
/// alongside in [`Evaluation`](crate::session::Evaluation).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_molecules: usize,
    pub filtered_molecules: usize,
    pub dropped: usize,
    pub logp: Distribution,
    pub molwt: Distribution,
    pub group_totals: Vec<GroupTotal>,
}

pub fn summarize(
    table: &FeatureTable,
    dropped: usize,
    filtered: &FilteredTable,
) -> Summary {
    let distribution = |name: &str| Distribution {
        full: table.column_values(name).unwrap_or_default(),
        filtered: filtered.column_values(name).unwrap_or_default(),
    };

    let sum = |values: Option<Vec<f64>>| -> i64 {
        values.unwrap_or_default().iter().map(|&v| v as i64).sum()
    };
    let group_totals = table
        .schema()
        .columns()
        .iter()
        .filter(|c| c.family == Family::FunctionalGroup)
        .map(|c| GroupTotal {
            name: c.name.clone(),
            label: c.label.clone(),
            full: sum(table.column_values(&c.name)),
            filtered: sum(filtered.column_values(&c.name)),
        })
        .collect();

    Summary {
        total_molecules: table.len(),
        filtered_molecules: filtered.len(),
        dropped,
        logp: distribution(LOGP),
        molwt: distribution(MOLWT),
        group_totals,
    }
}

/// Writes the filtered SMILES as a one-column CSV with a `smiles` header.
pub fn export_csv<W: Write>(filtered: &FilteredTable, writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["smiles"])?;
    for row in filtered.rows() {
        wtr.write_record([row.smiles()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv_string(filtered: &FilteredTable) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    export_csv(filtered, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
