use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;

/// One row of the input table. `CE` and `BL` are opaque identifiers; any
/// other columns in the file are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputRow {
    #[serde(rename = "CE")]
    pub ce: String,
    #[serde(rename = "BL")]
    pub bl: String,
}

/// Read every row of the input CSV, in file order.
pub fn read_input(path: &Path) -> Result<Vec<InputRow>> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("opening input CSV {}", path.display()))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize().enumerate() {
        let row: InputRow = result
            .with_context(|| format!("reading row {} of {}", idx + 1, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}
