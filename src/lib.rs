//! gh-harvest crate
//!
//! This crate is an implementation detail of the `gh-harvest` tool. This crate's API is fluid and may change without warning
//! and in a semver-incompatible way.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and stage orchestration
//! - [`collectors`]: The pipeline stages that turn searches and CSV inputs into CSV outputs
//! - [`facts`]: GitHub access and per-repository fact extraction
//! - [`reports`]: CSV input and output
//! - [`config`]: Configuration loading and validation

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod collectors;

#[doc(hidden)]
pub mod commands;

#[doc(hidden)]
pub mod config;

#[doc(hidden)]
pub mod facts;

#[doc(hidden)]
pub mod reports;

pub use crate::commands::{Host, run};
