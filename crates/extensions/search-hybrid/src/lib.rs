//! Hybrid knowledge retrieval for Meridian.
//!
//! Combines dense vector search with keyword-based FTS5 full-text search
//! using Reciprocal Rank Fusion (RRF), with an optional language-model
//! rerank of the fused head.
//!
//! ## How It Works
//!
//! 1. The query runs against both the vector and lexical legs in parallel
//! 2. The two ranked lists are fused with RRF (k = 60), deduplicating on
//!    `(source_type, id)`
//! 3. When enough candidates fused, the top of the list is reordered by a
//!    language model; on any model failure the fused order stands
//! 4. The result is truncated to the caller's budget and annotated with a
//!    bounded confidence score
//!
//! Every external call degrades rather than fails: a dead leg contributes
//! zero results, a dead reranker leaves the fused order untouched.

mod completion;
mod engine;
mod extension;
mod fusion;
mod lexical;
mod rerank;
mod tool;

pub use completion::{OpenAICompletion, OpenAICompletionConfig};
pub use engine::{HybridSearchConfig, HybridSearchEngine, METHOD_FUSED, METHOD_RERANKED};
pub use extension::HybridSearchExtension;
pub use fusion::{reciprocal_rank_fusion, FusionConfig};
pub use lexical::{FtsStore, LexicalHit, LexicalRetriever, LexicalStore};
pub use rerank::{LlmReranker, RerankConfig};
pub use tool::KnowledgeSearchTool;
