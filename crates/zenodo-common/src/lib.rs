//! Zenodo Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities for the Zenodo workspace members.
//!
//! - **Logging**: explicit, caller-constructed tracing subscriber setup

pub mod logging;

pub use logging::{init_logging, LogConfig, LoggingGuard};
