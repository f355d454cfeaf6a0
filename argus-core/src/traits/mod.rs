//! Trait seams between subsystems. Storage is synchronous (SQLite);
//! the embedding, feed, and ranking seams are network calls and async.

mod embedding;
mod feed;
mod ranker;
mod store;

pub use embedding::IEmbeddingProvider;
pub use feed::IAdvisoryFeed;
pub use ranker::IRelevanceRanker;
pub use store::IKnowledgeStore;
