use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::fmt::{Display, Formatter};
use ohno::IntoAppError;
use std::fs;

/// Outcome of one collection stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub stage: String,

    /// Rows appended to the output file.
    pub written: usize,

    /// Items deliberately left out (filtered, duplicates, anonymous contributors).
    pub skipped: usize,

    /// Identifiers of items that could not be collected.
    pub missed: Vec<String>,
}

impl CollectionSummary {
    #[must_use]
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Self::default()
        }
    }

    pub fn miss(&mut self, id: impl Into<String>) {
        self.missed.push(id.into());
    }

    /// Write the missed identifiers, one per line, to `dir/<stage>_missed.txt`.
    ///
    /// Nothing is written when nothing was missed.
    pub fn write_missed(&self, dir: &Utf8Path) -> Result<Option<Utf8PathBuf>> {
        if self.missed.is_empty() {
            return Ok(None);
        }

        fs::create_dir_all(dir).into_app_err_with(|| format!("creating directory {dir}"))?;
        let path = dir.join(format!("{}_missed.txt", self.stage));

        let mut text = self.missed.join("\n");
        text.push('\n');
        fs::write(&path, text).into_app_err_with(|| format!("writing {path}"))?;

        Ok(Some(path))
    }
}

impl Display for CollectionSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}: {} written, {} skipped, {} missed",
            self.stage,
            self.written,
            self.skipped,
            self.missed.len()
        )
    }
}

/// Selects a window of input items: skip the first `skip`, then take at most `limit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputWindow {
    pub skip: usize,
    pub limit: Option<usize>,
}

impl InputWindow {
    #[must_use]
    pub const fn new(skip: usize, limit: Option<usize>) -> Self {
        Self { skip, limit }
    }

    /// Apply the window to a list of items.
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit.unwrap_or(usize::MAX)).collect()
    }

    /// Whether `count` items already reach the limit.
    #[must_use]
    pub fn is_full(&self, count: usize) -> bool {
        self.limit.is_some_and(|limit| count >= limit)
    }
}
