#![deny(unsafe_code)]

//! Shared test utilities for the fwstamp workspace.
//!
//! Provides fake version-control queries, scratch git repositories, config
//! builders, and tracing helpers so that individual crate tests stay concise
//! and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! fwstamp-test-utils = { workspace = true }
//! ```

pub mod capture;
pub mod config;
pub mod query;
pub mod repo;
