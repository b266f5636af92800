//! Reciprocal Rank Fusion.

use std::collections::HashMap;

use meridian_protocols::knowledge::{ItemKey, ScoredItem};
use meridian_search_vector::VectorHit;

use crate::lexical::LexicalHit;

/// Configuration for result fusion.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// RRF parameter k (typically 60).
    pub k: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self { k: 60.0 }
    }
}

/// Reciprocal Rank Fusion (RRF).
///
/// Each ranked list contributes `1 / (k + rank)` per item, with 1-based
/// ranks; an item present in both lists sums both contributions. Rank
/// positions are all that is consumed, so the two lists' scoring scales
/// never need to be commensurable. Items that rank well under either
/// method rise, items that rank well under both rise furthest.
///
/// Deduplicates on `(source_type, id)`: an item retrieved by both legs
/// appears exactly once, keeping the vector leg's similarity annotation.
/// Output order is fully deterministic; equal fused scores break ties by
/// item key.
pub fn reciprocal_rank_fusion(
    vector_hits: &[VectorHit],
    lexical_hits: &[LexicalHit],
    config: &FusionConfig,
) -> Vec<ScoredItem> {
    let mut fused: HashMap<ItemKey, ScoredItem> = HashMap::new();

    for (idx, hit) in vector_hits.iter().enumerate() {
        let rank = (idx + 1) as u32;
        let contribution = 1.0 / (config.k + rank as f32);
        fused.insert(
            hit.item.key(),
            ScoredItem {
                item: hit.item.clone(),
                similarity: Some(hit.similarity),
                vector_rank: Some(rank),
                keyword_rank: None,
                fused_score: contribution,
            },
        );
    }

    for (idx, hit) in lexical_hits.iter().enumerate() {
        let rank = (idx + 1) as u32;
        let contribution = 1.0 / (config.k + rank as f32);
        fused
            .entry(hit.item.key())
            .and_modify(|scored| {
                scored.fused_score += contribution;
                scored.keyword_rank = Some(rank);
            })
            .or_insert_with(|| ScoredItem {
                item: hit.item.clone(),
                similarity: None,
                vector_rank: None,
                keyword_rank: Some(rank),
                fused_score: contribution,
            });
    }

    let mut results: Vec<ScoredItem> = fused.into_values().collect();
    results.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item.key().cmp(&b.item.key()))
    });

    results
}

#[cfg(test)]
#[path = "fusion_tests.rs"]
mod tests;
