//! In-memory vector index.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use meridian_protocols::error::RetrievalError;
use meridian_protocols::knowledge::{KnowledgeItem, SourceType};

use crate::embedding::Embedding;
use crate::retriever::{VectorHit, VectorStore};

/// Brute-force cosine index over one content source.
///
/// Suits the per-tenant corpus sizes the assistant works with; larger
/// deployments swap in an external index behind the same [`VectorStore`]
/// trait.
pub struct InMemoryVectorIndex {
    source: SourceType,
    items: RwLock<HashMap<String, (KnowledgeItem, Embedding)>>,
}

impl InMemoryVectorIndex {
    pub fn new(source: SourceType) -> Self {
        Self {
            source,
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace an item and its embedding.
    pub fn insert(&self, item: KnowledgeItem, embedding: Embedding) {
        self.items.write().insert(item.id.clone(), (item, embedding));
    }

    /// Remove an item by ID.
    pub fn remove(&self, id: &str) -> Option<KnowledgeItem> {
        self.items.write().remove(id).map(|(item, _)| item)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn clear(&self) {
        self.items.write().clear();
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorIndex {
    fn source_type(&self) -> SourceType {
        self.source
    }

    async fn search_vector(
        &self,
        query: &Embedding,
        limit: usize,
    ) -> Result<Vec<VectorHit>, RetrievalError> {
        let items = self.items.read();
        let mut hits: Vec<VectorHit> = items
            .values()
            .map(|(item, embedding)| VectorHit {
                item: item.clone(),
                similarity: query.cosine_similarity(embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.item.id.cmp(&b.item.id))
        });

        hits.truncate(limit);
        Ok(hits)
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
