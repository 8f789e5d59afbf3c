//! Incremental CSV output
//!
//! Every collection stage writes one CSV file. Rows are appended and flushed one at a time so that
//! an interrupted run keeps everything collected so far. The header is written lazily with the first
//! row of an empty file; appending to an existing file requires the same columns.
//!
//! Composite values are JSON text inside a CSV field, written by [`OutputRow::push_json`] and read
//! back with [`decode_list`]. [`read_records`] loads an earlier stage's output as input.

mod csv_sink;
mod input;
mod output_row;
mod row_mapping;

pub use csv_sink::CsvSink;
pub use input::{InputRecord, read_records};
pub use output_row::{OutputRow, decode_list};
pub use row_mapping::{RowSource, normalize_language};
