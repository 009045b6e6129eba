//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod download;
pub mod extract;
pub mod publish;
pub mod upload;
pub mod zip;
