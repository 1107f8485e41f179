//! # Resbundle Common
//!
//! Shared error types and logging setup for the resbundle workspace.
//!
//! This crate provides the error taxonomy used across the resolver and
//! loader crates, plus tracing-subscriber initialization helpers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;

pub use error::{BundleError, Result};
pub use logging::{init_logging, LoggingConfig};
