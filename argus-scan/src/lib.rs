//! Scan normalization and risk scoring.
//!
//! Raw scanner output goes in; deduplicated, severity-ranked groups
//! with a 0..=100 risk score come out, plus the two renderings the
//! downstream layers consume.

pub mod normalize;
pub mod render;
pub mod score;

pub use normalize::{normalize, NormalizedScan};
pub use render::{render_analyst, render_compact};
pub use score::overall_risk_score;
