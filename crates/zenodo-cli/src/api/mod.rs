//! API client module
//!
//! Authenticated HTTP access to the Zenodo REST API.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{AuthScheme, ZenodoClient};
pub use types::*;
