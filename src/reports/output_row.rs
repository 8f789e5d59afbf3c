use serde::Serialize;

const LOG_TARGET: &str = "   reports";

/// One output record: ordered column names with their text values.
///
/// Composite values (lists, counts, sets) are stored as JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    fields: Vec<(String, String)>,
}

impl OutputRow {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a scalar column.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.push((column.into(), value.into()));
    }

    /// Append a column holding the JSON encoding of `value`.
    pub fn push_json<T: Serialize + ?Sized>(&mut self, column: impl Into<String>, value: &T) {
        let text = serde_json::to_string(value).unwrap_or_else(|e| {
            log::warn!(target: LOG_TARGET, "Could not encode a field as JSON: {e}");
            String::new()
        });
        self.push(column, text);
    }

    /// Append every column of `other`, in order.
    pub fn append(&mut self, other: Self) {
        self.fields.extend(other.fields);
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.iter().find(|(c, _)| c == column).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decode a JSON array of strings read back from an output file.
///
/// Blank or unparseable fields decode to an empty list.
#[must_use]
pub fn decode_list(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || text == "null" {
        return Vec::new();
    }

    serde_json::from_str(text).unwrap_or_else(|e| {
        log::warn!(target: LOG_TARGET, "Ignoring malformed list field '{text}': {e}");
        Vec::new()
    })
}
