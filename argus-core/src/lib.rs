//! # argus-core
//!
//! Foundation crate for the Argus security-intelligence system.
//! Defines all types, traits, errors, config, and the static taxonomy.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod taxonomy;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ArgusConfig;
pub use errors::{ArgusError, ArgusResult};
pub use models::{Finding, FindingGroup, ScanSummary, Severity};
