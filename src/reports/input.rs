use crate::Result;
use camino::Utf8Path;
use ohno::{IntoAppError, bail};
use std::collections::BTreeMap;

const LOG_TARGET: &str = "   reports";

/// One row of a previously written output file, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRecord {
    fields: BTreeMap<String, String>,
}

impl InputRecord {
    /// Non-blank value of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(|v| v.trim()).filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InputRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Read every row of a CSV file produced by an earlier stage.
///
/// Rows that cannot be parsed are logged and skipped. A missing file is an error, since the
/// stage that depends on it cannot run.
pub fn read_records(path: &Utf8Path) -> Result<Vec<InputRecord>> {
    if !path.exists() {
        bail!("input file {path} does not exist");
    }

    let mut reader = csv::Reader::from_path(path).into_app_err_with(|| format!("opening {path}"))?;
    let header = reader.headers().into_app_err_with(|| format!("reading header of {path}"))?.clone();

    let mut records: Vec<InputRecord> = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => records.push(header.iter().zip(record.iter()).collect()),
            Err(e) => log::warn!(target: LOG_TARGET, "Skipping malformed row {} of {path}: {e}", index + 2),
        }
    }

    log::info!(target: LOG_TARGET, "Read {} rows from {path}", records.len());
    Ok(records)
}
