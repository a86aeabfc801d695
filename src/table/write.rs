use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use encoding_rs::mem::encode_latin1_lossy;
use serde_json::Value;

use crate::flatten::FlatRecord;

/// Write one CSV row per record.
///
/// The header is the sorted union of every record's keys and cells a record
/// does not carry are left blank. The file is encoded as ISO-8859-1 to match
/// the codepage the upstream payloads use.
pub fn write_records(path: &Path, records: &[FlatRecord]) -> Result<()> {
    let columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.keys().map(String::as_str))
        .collect();

    let mut buf = Vec::new();
    if !columns.is_empty() {
        let mut writer = WriterBuilder::new().from_writer(&mut buf);
        writer
            .write_record(columns.iter().copied())
            .context("writing CSV header")?;
        for record in records {
            let row: Vec<String> = columns
                .iter()
                .map(|col| cell_text(record.get(*col)))
                .collect();
            writer.write_record(&row).context("writing CSV row")?;
        }
        writer.flush().context("flushing CSV writer")?;
        drop(writer);
    }

    let text = String::from_utf8(buf).context("CSV buffer was not UTF-8")?;
    fs::write(path, encode_latin1_lossy(&text))
        .with_context(|| format!("writing output CSV {}", path.display()))?;
    Ok(())
}

/// Render one cell: strings as their raw text, `null` and absent cells
/// blank, everything else in its compact JSON form.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
