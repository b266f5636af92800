//! Multi-source vector retrieval.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use meridian_protocols::error::RetrievalError;
use meridian_protocols::knowledge::{KnowledgeItem, SourceType};

use crate::embedding::{Embedding, EmbeddingProvider};

/// A nearest-neighbor hit from one store.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub item: KnowledgeItem,
    /// Store-reported similarity (roughly 0.0 - 1.0, higher is closer).
    pub similarity: f32,
}

/// Read-only nearest-neighbor capability of one content source.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The source this store serves.
    fn source_type(&self) -> SourceType;

    /// Return up to `limit` nearest neighbors ordered by descending
    /// similarity.
    async fn search_vector(
        &self,
        query: &Embedding,
        limit: usize,
    ) -> Result<Vec<VectorHit>, RetrievalError>;
}

/// Candidates requested per source: `ceil(target * 1.5)`.
pub(crate) fn overfetch(target: usize) -> usize {
    target + target.div_ceil(2)
}

/// The vector leg of hybrid search.
///
/// Embeds the query once and fans out to every configured store,
/// including the dedicated transcript index. Individual store failures
/// are logged and skipped; an embedding failure makes the whole leg
/// unavailable, which the facade treats as an empty contribution.
pub struct VectorRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    stores: Vec<Arc<dyn VectorStore>>,
}

impl VectorRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            stores: Vec::new(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.stores.push(store);
        self
    }

    pub fn add_store(&mut self, store: Arc<dyn VectorStore>) {
        self.stores.push(store);
    }

    /// Run the vector leg: embed, fan out, filter by the similarity
    /// floor, and sort survivors across all sources.
    pub async fn search(
        &self,
        text: &str,
        target: usize,
        min_similarity: f32,
    ) -> Result<Vec<VectorHit>, RetrievalError> {
        let query = self
            .embedder
            .embed(text)
            .await
            .map_err(|e| RetrievalError::SourceUnavailable(format!("embedding: {}", e)))?;

        let per_source = overfetch(target);
        let futures = self
            .stores
            .iter()
            .map(|store| store.search_vector(&query, per_source));

        let mut hits: Vec<VectorHit> = Vec::new();
        for (store, result) in self.stores.iter().zip(join_all(futures).await) {
            match result {
                Ok(store_hits) => hits.extend(store_hits),
                Err(e) => {
                    warn!(
                        source = %store.source_type(),
                        "vector store failed, skipping: {}",
                        e
                    );
                }
            }
        }

        hits.retain(|hit| hit.similarity >= min_similarity);

        // Cross-source sort is valid: every store shares the query
        // embedding space.
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.item.key().cmp(&b.item.key()))
        });

        debug!(
            candidates = hits.len(),
            per_source, "vector leg complete"
        );
        Ok(hits)
    }
}

#[cfg(test)]
#[path = "retriever_tests.rs"]
mod tests;
