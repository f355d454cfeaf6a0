//! Security-intelligence retrieval: similarity search over the
//! knowledge store, optional re-ranking, cross-reference expansion,
//! and context assembly.

pub mod assemble;
pub mod crossref;
pub mod engine;
pub mod rank;

pub use assemble::render_context;
pub use engine::RetrievalEngine;
