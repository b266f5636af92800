//! Hybrid search facade.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use meridian_protocols::knowledge::{KnowledgeQuery, ScoredItem, SearchResultSet};
use meridian_search_vector::{VectorHit, VectorRetriever};

use crate::fusion::{reciprocal_rank_fusion, FusionConfig};
use crate::lexical::{LexicalHit, LexicalRetriever};
use crate::rerank::LlmReranker;

/// Method label for a fused result set.
pub const METHOD_FUSED: &str = "hybrid_rrf";
/// Method label when the reranked order was applied.
pub const METHOD_RERANKED: &str = "hybrid_rrf+rerank";

/// Per-source lexical fetch is this multiple of the result target.
const LEXICAL_FETCH_FACTOR: usize = 2;

/// Configuration for the hybrid search facade.
#[derive(Debug, Clone)]
pub struct HybridSearchConfig {
    /// Fusion configuration.
    pub fusion: FusionConfig,
    /// Upper bound on each retrieval leg; an unresponsive leg must not
    /// block the other leg's results.
    pub leg_timeout: Duration,
}

impl Default for HybridSearchConfig {
    fn default() -> Self {
        Self {
            fusion: FusionConfig::default(),
            leg_timeout: Duration::from_secs(4),
        }
    }
}

impl HybridSearchConfig {
    pub fn with_leg_timeout(mut self, leg_timeout: Duration) -> Self {
        self.leg_timeout = leg_timeout;
        self
    }
}

/// The public entry point for hybrid retrieval.
///
/// Runs the vector and lexical legs concurrently, fuses their rankings,
/// optionally reranks the fused head, truncates to the caller's budget
/// and annotates the set with a bounded confidence. Infallible by
/// construction: every failure below degrades to fewer results.
pub struct HybridSearchEngine {
    vector: VectorRetriever,
    lexical: LexicalRetriever,
    reranker: Option<LlmReranker>,
    config: HybridSearchConfig,
}

impl HybridSearchEngine {
    pub fn new(vector: VectorRetriever, lexical: LexicalRetriever) -> Self {
        Self {
            vector,
            lexical,
            reranker: None,
            config: HybridSearchConfig::default(),
        }
    }

    pub fn with_reranker(mut self, reranker: LlmReranker) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn with_config(mut self, config: HybridSearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one search call.
    ///
    /// Sequence: parallel retrieve, fuse, rerank when eligible, truncate.
    /// Both legs failing yields a well-formed empty set with confidence 0.
    pub async fn search(&self, query: &KnowledgeQuery) -> SearchResultSet {
        let text = query.text.trim();
        if text.is_empty() {
            return SearchResultSet::empty(query.text.as_str(), METHOD_FUSED);
        }

        let (vector_leg, lexical_leg) = tokio::join!(
            timeout(
                self.config.leg_timeout,
                self.vector.search(text, query.limit, query.min_similarity),
            ),
            timeout(
                self.config.leg_timeout,
                self.lexical.search(text, query.limit * LEXICAL_FETCH_FACTOR),
            ),
        );

        // Each leg is total over unavailability: a timeout or adapter
        // error contributes an empty list.
        let vector_hits: Vec<VectorHit> = match vector_leg {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                warn!("vector leg unavailable: {}", e);
                Vec::new()
            }
            Err(_) => {
                warn!("vector leg timed out after {:?}", self.config.leg_timeout);
                Vec::new()
            }
        };
        let lexical_hits: Vec<LexicalHit> = match lexical_leg {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                warn!("lexical leg unavailable: {}", e);
                Vec::new()
            }
            Err(_) => {
                warn!("lexical leg timed out after {:?}", self.config.leg_timeout);
                Vec::new()
            }
        };

        debug!(
            vector = vector_hits.len(),
            lexical = lexical_hits.len(),
            "retrieval legs joined"
        );

        let mut fused = reciprocal_rank_fusion(&vector_hits, &lexical_hits, &self.config.fusion);

        let mut method = METHOD_FUSED;
        if query.rerank {
            if let Some(reranker) = &self.reranker {
                if reranker.should_rerank(fused.len()) {
                    let outcome = reranker.rerank(text, fused).await;
                    fused = outcome.candidates;
                    if outcome.applied {
                        method = METHOD_RERANKED;
                    }
                }
            }
        }

        fused.truncate(query.limit);
        let confidence = confidence(&fused);

        SearchResultSet::new(fused, text, method, confidence)
    }
}

/// Aggregate confidence over the final set.
///
/// `min(0.5 + avg_score * 0.4, 0.9)` for a non-empty set, 0 for an empty
/// one. The compressed range keeps the value informative without ever
/// reading as certainty. Averaging does conflate many mediocre matches
/// with a few excellent ones; that is the contracted behavior.
fn confidence(results: &[ScoredItem]) -> f32 {
    if results.is_empty() {
        return 0.0;
    }

    let avg: f32 =
        results.iter().map(|scored| scored.score()).sum::<f32>() / results.len() as f32;
    (0.5 + avg * 0.4).min(0.9)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
