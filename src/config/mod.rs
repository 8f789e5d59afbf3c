//! Configuration for gh-harvest.
//!
//! A single [`Config`] document drives the whole pipeline: API endpoint and retry behavior,
//! output locations and column lists, the classification pattern sets used by the tree walker,
//! and the lookup tables used by the field extractors.

#[expect(clippy::module_inception, reason = "Config lives in its own file for readability")]
mod config;

pub use config::{CiCdTool, Columns, Config, DEFAULT_CONFIG_YAML, OutputFiles, PatternSets, RetrySettings};
