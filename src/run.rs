use serde_json::Value;
use tracing::{error, info};

use crate::fetch::{FetchError, StatusSource};
use crate::flatten::{flatten, FlatRecord};
use crate::table::InputRow;

/// Fixed message carried by the placeholder record of a failed row.
pub const ROW_ERROR_MESSAGE: &str = "No data found or API error";

/// Observes row outcomes for one batch run.
///
/// Injected into [`run`] so progress and error reporting stay scoped to the
/// run instead of being wired into process-global state. [`TracingReporter`]
/// is the production implementation; tests substitute a recording one.
pub trait RunReporter {
    fn row_succeeded(&mut self, index: usize, row: &InputRow);
    fn row_failed(&mut self, index: usize, row: &InputRow, err: &FetchError);
    fn finished(&mut self, total: usize);
}

/// Emits run progress as structured tracing events.
pub struct TracingReporter {
    total: usize,
}

impl TracingReporter {
    pub fn new(total: usize) -> Self {
        Self { total }
    }
}

impl RunReporter for TracingReporter {
    fn row_succeeded(&mut self, index: usize, row: &InputRow) {
        info!(done = index + 1, total = self.total, ce = %row.ce, bl = %row.bl, "row ok");
    }

    fn row_failed(&mut self, index: usize, row: &InputRow, err: &FetchError) {
        error!(
            done = index + 1,
            total = self.total,
            ce = %row.ce,
            bl = %row.bl,
            error = %err,
            "status lookup failed"
        );
    }

    fn finished(&mut self, total: usize) {
        info!(rows = total, "batch complete");
    }
}

/// Process every input row in order, one blocking fetch per row.
///
/// Failures are row-local: a failed lookup is reported and replaced with a
/// placeholder record, and the loop moves on. The result always holds exactly
/// one record per input row, in input order.
pub fn run<S, R>(source: &S, rows: &[InputRow], reporter: &mut R) -> Vec<FlatRecord>
where
    S: StatusSource,
    R: RunReporter,
{
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        match fetch_row(source, row) {
            Ok(record) => {
                reporter.row_succeeded(index, row);
                records.push(record);
            }
            Err(err) => {
                reporter.row_failed(index, row, &err);
                records.push(error_record(row));
            }
        }
    }

    reporter.finished(records.len());
    records
}

fn fetch_row<S: StatusSource>(source: &S, row: &InputRow) -> Result<FlatRecord, FetchError> {
    let payload = source.status(&row.ce, &row.bl)?;
    match payload.get("data") {
        Some(Value::Object(data)) => Ok(flatten(data)),
        _ => Err(FetchError::MissingData),
    }
}

fn error_record(row: &InputRow) -> FlatRecord {
    let mut record = FlatRecord::new();
    record.insert("codConhecimento".into(), Value::String(row.ce.clone()));
    record.insert("numConhecimento".into(), Value::String(row.bl.clone()));
    record.insert("error".into(), Value::String(ROW_ERROR_MESSAGE.into()));
    record
}
