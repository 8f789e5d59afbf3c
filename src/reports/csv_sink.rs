use super::OutputRow;
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{IntoAppError, bail};
use std::fs::{self, File, OpenOptions};

const LOG_TARGET: &str = "   reports";

/// Append-only CSV output file.
///
/// The header is written with the first row when the file is empty. When appending to a file that
/// already has a header, every row must carry exactly those columns.
#[derive(Debug)]
pub struct CsvSink {
    path: Utf8PathBuf,
    writer: csv::Writer<File>,
    header: Option<Vec<String>>,
    rows_written: usize,
}

/// Header of an existing CSV file, or `None` if it is missing or empty.
fn existing_header(path: &Utf8Path) -> Result<Option<Vec<String>>> {
    let Ok(metadata) = fs::metadata(path) else {
        return Ok(None);
    };

    if metadata.len() == 0 {
        return Ok(None);
    }

    let mut reader = csv::Reader::from_path(path).into_app_err_with(|| format!("opening {path}"))?;
    let header = reader.headers().into_app_err_with(|| format!("reading header of {path}"))?;
    Ok(Some(header.iter().map(str::to_string).collect()))
}

impl CsvSink {
    /// Open `path` for appending, creating it and its parent directories as needed.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory {parent}"))?;
        }

        let header = existing_header(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .into_app_err_with(|| format!("opening {path} for appending"))?;

        if header.is_some() {
            log::debug!(target: LOG_TARGET, "Appending to existing {path}");
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(file),
            header,
            rows_written: 0,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Rows written through this sink (not counting rows already in the file).
    #[must_use]
    pub const fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append one row and flush it to disk.
    pub fn write(&mut self, row: &OutputRow) -> Result<()> {
        match &self.header {
            None => {
                let header: Vec<String> = row.columns().map(str::to_string).collect();
                self.writer
                    .write_record(&header)
                    .into_app_err_with(|| format!("writing header to {}", self.path))?;
                self.header = Some(header);
            }
            Some(header) => {
                if !header.iter().map(String::as_str).eq(row.columns()) {
                    bail!(
                        "columns [{}] do not match the header of {} ([{}])",
                        row.columns().collect::<Vec<_>>().join(", "),
                        self.path,
                        header.join(", ")
                    );
                }
            }
        }

        self.writer
            .write_record(row.values())
            .into_app_err_with(|| format!("writing row to {}", self.path))?;
        self.writer.flush().into_app_err_with(|| format!("flushing {}", self.path))?;
        self.rows_written += 1;
        Ok(())
    }
}
