//! Dense vector retrieval for Meridian.
//!
//! The semantic leg of hybrid search: turns the query into an embedding
//! and runs nearest-neighbor lookups against every configured content
//! source, including the dedicated transcript index.
//!
//! ## How It Works
//!
//! 1. The query text is embedded once via an [`EmbeddingProvider`]
//! 2. Each [`VectorStore`] is asked for `ceil(target * 1.5)` neighbors
//! 3. Candidates below the similarity floor are dropped
//! 4. Survivors are sorted by similarity across all sources (the stores
//!    share one embedding space, so scores are comparable)
//!
//! Store and provider failures degrade to an empty contribution; they
//! never fail the search.

mod embedding;
mod index;
mod retriever;

pub use embedding::{
    CachedEmbeddingProvider, Embedding, EmbeddingError, EmbeddingProvider, HashEmbedding,
    OpenAIEmbedding, OpenAIEmbeddingConfig,
};
pub use index::InMemoryVectorIndex;
pub use retriever::{VectorHit, VectorRetriever, VectorStore};
