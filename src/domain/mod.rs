//! Domain layer for Ruff Bridge
//!
//! CDD Principle: Domain Model - Pure data model for translated lint diagnostics
//! - Contains the normalized diagnostic entities and their value objects
//! - Independent of the wire format, the editor host, and the filesystem
//! - Expresses the ubiquitous language of lint records, fixes, and severities

pub mod diagnostics;

// Re-export main domain types for convenience
pub use diagnostics::*;
