//! Advisory ingestion: feed client, code-example extraction, and the
//! resumable partition-driven pipeline.

pub mod extract;
pub mod feed;
pub mod pipeline;
pub mod seed;

pub use feed::GhsaFeed;
pub use pipeline::IngestPipeline;
