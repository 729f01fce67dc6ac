//! CSV input adapter.

use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("no `smiles` column among {headers:?}")]
    MissingColumn { headers: Vec<String> },
}

/// Reads the SMILES column of a CSV with a header row.
///
/// The column is the one named `smiles` (any case), or the only column when
/// there is exactly one. Blank cells are skipped.
pub fn read_smiles<R: Read>(reader: R) -> Result<Vec<String>, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("smiles"))
        .or_else(|| (headers.len() == 1).then_some(0))
        .ok_or_else(|| InputError::MissingColumn {
            headers: headers.clone(),
        })?;

    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record?;
        match record.get(column).map(str::trim) {
            Some(cell) if !cell.is_empty() => out.push(cell.to_string()),
            _ => {}
        }
    }
    info!(rows = out.len(), column = %headers[column], "input read");
    Ok(out)
}

pub fn read_smiles_path(path: &Path) -> Result<Vec<String>, InputError> {
    let file = std::fs::File::open(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_smiles(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_column_any_case() {
        let data = "id,SMILES\n1,CCO\n2,c1ccccc1N\n";
        assert_eq!(read_smiles(data.as_bytes()).unwrap(), ["CCO", "c1ccccc1N"]);
    }

    #[test]
    fn single_unnamed_column() {
        let data = "structure\nCCO\n\nCCN\n";
        assert_eq!(read_smiles(data.as_bytes()).unwrap(), ["CCO", "CCN"]);
    }

    #[test]
    fn blank_cells_skipped() {
        let data = "smiles,name\nCCO,ethanol\n ,blank\n,none\n";
        assert_eq!(read_smiles(data.as_bytes()).unwrap(), ["CCO"]);
    }

    #[test]
    fn missing_column() {
        let data = "a,b\n1,2\n";
        assert!(matches!(
            read_smiles(data.as_bytes()),
            Err(InputError::MissingColumn { headers }) if headers == ["a", "b"]
        ));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "smiles\nC\n").unwrap();
        assert_eq!(read_smiles_path(&path).unwrap(), ["C"]);
        assert!(matches!(
            read_smiles_path(&dir.path().join("nope.csv")),
            Err(InputError::Io { .. })
        ));
    }
}
