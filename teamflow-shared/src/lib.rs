//! # Teamflow Shared Library
//!
//! This crate contains the models, authentication primitives, and reporting
//! logic shared by the Teamflow API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pooling and migrations
//! - `mail`: Outbound mail seam (reset links, temporary passwords)
//! - `report`: Activity aggregation and PDF report rendering

pub mod auth;
pub mod db;
pub mod mail;
pub mod models;
pub mod report;

/// Current version of the Teamflow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
