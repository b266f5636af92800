//! Knowledge retrieval protocol definitions.
//!
//! The assistant answers questions by searching heterogeneous content
//! stores (email messages, documents, meeting transcripts, calendar
//! events). These types define the contract between the retrieval engine
//! and its callers: what a query looks like, what a piece of knowledge
//! looks like, and what a ranked answer looks like.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The content store a knowledge item originates from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Message,
    Document,
    Transcript,
    Event,
}

impl SourceType {
    /// All source types, in the order legs fan out over them.
    pub const ALL: [SourceType; 4] = [
        SourceType::Message,
        SourceType::Document,
        SourceType::Transcript,
        SourceType::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Message => "message",
            SourceType::Document => "document",
            SourceType::Transcript => "transcript",
            SourceType::Event => "event",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source metadata, tagged by source type.
///
/// Each variant carries only the fields its source actually has. Ids are
/// scoped to the source type; global identity is the `(source_type, id)`
/// pair (see [`ItemKey`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source_type", rename_all = "snake_case")]
pub enum SourceMeta {
    Message {
        #[serde(skip_serializing_if = "Option::is_none")]
        sender: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        sent_at: Option<DateTime<Utc>>,
    },
    Document {
        #[serde(skip_serializing_if = "Option::is_none")]
        author: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        updated_at: Option<DateTime<Utc>>,
    },
    Transcript {
        #[serde(skip_serializing_if = "Option::is_none")]
        meeting_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        speaker: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        recorded_at: Option<DateTime<Utc>>,
    },
    Event {
        #[serde(skip_serializing_if = "Option::is_none")]
        organizer: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        starts_at: Option<DateTime<Utc>>,
    },
}

impl SourceMeta {
    pub fn source_type(&self) -> SourceType {
        match self {
            SourceMeta::Message { .. } => SourceType::Message,
            SourceMeta::Document { .. } => SourceType::Document,
            SourceMeta::Transcript { .. } => SourceType::Transcript,
            SourceMeta::Event { .. } => SourceType::Event,
        }
    }

    /// The item's reference timestamp, used for recency tie-breaking.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SourceMeta::Message { sent_at, .. } => *sent_at,
            SourceMeta::Document { updated_at, .. } => *updated_at,
            SourceMeta::Transcript { recorded_at, .. } => *recorded_at,
            SourceMeta::Event { starts_at, .. } => *starts_at,
        }
    }
}

/// Global identity of a knowledge item: `(source_type, id)`.
///
/// Ids are only unique within their source, so deduplication and map
/// keys always use this pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub source_type: SourceType,
    pub id: String,
}

impl ItemKey {
    pub fn new(source_type: SourceType, id: impl Into<String>) -> Self {
        Self {
            source_type,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source_type, self.id)
    }
}

/// A piece of knowledge pulled from one of the content stores.
///
/// Owned by its originating store; the retrieval engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// Stable identifier, scoped to the source type.
    pub id: String,

    /// Human-readable title (subject line, document name, meeting name).
    pub title: String,

    /// Full body text.
    pub body: String,

    /// Optional short summary, preferred over the body when presenting
    /// the item in a bounded context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Source-specific metadata; also carries the source type tag.
    #[serde(flatten)]
    pub meta: SourceMeta,
}

impl KnowledgeItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        meta: SourceMeta,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            summary: None,
            meta,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn source_type(&self) -> SourceType {
        self.meta.source_type()
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.source_type(), self.id.clone())
    }

    /// The text to show when space is limited: summary if present,
    /// otherwise the body.
    pub fn snippet_text(&self) -> &str {
        self.summary.as_deref().unwrap_or(&self.body)
    }
}

/// A single search request. Immutable, created per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeQuery {
    /// Raw query text.
    pub text: String,

    /// Result-count target.
    pub limit: usize,

    /// Minimum vector similarity a candidate must reach (0.0 - 1.0).
    pub min_similarity: f32,

    /// Whether second-pass reranking may run.
    pub rerank: bool,
}

impl KnowledgeQuery {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: Self::DEFAULT_LIMIT,
            min_similarity: 0.0,
            rerank: true,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn with_rerank(mut self, rerank: bool) -> Self {
        self.rerank = rerank;
        self
    }
}

/// A knowledge item annotated with ranking signals for one search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: KnowledgeItem,

    /// Vector similarity reported by the store, if the vector leg found
    /// this item (roughly 0.0 - 1.0, higher is closer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,

    /// 1-based position in the vector-ranked list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_rank: Option<u32>,

    /// 1-based position in the lexical-ranked list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_rank: Option<u32>,

    /// Reciprocal-rank-fusion score.
    pub fused_score: f32,
}

impl ScoredItem {
    /// The per-item score confidence is averaged over: the similarity
    /// when the vector leg saw the item, the fused score otherwise.
    pub fn score(&self) -> f32 {
        self.similarity.unwrap_or(self.fused_score)
    }
}

/// The ordered answer to one search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultSet {
    pub results: Vec<ScoredItem>,

    /// Number of results, always `results.len()`.
    pub count: usize,

    /// The query text this set answers.
    pub query: String,

    /// Retrieval method label, e.g. `hybrid_rrf` or `hybrid_rrf+rerank`.
    pub method: String,

    /// Aggregate confidence: 0.0 for an empty set, otherwise within
    /// [0.5, 0.9].
    pub confidence: f32,
}

impl SearchResultSet {
    pub fn new(
        results: Vec<ScoredItem>,
        query: impl Into<String>,
        method: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            count: results.len(),
            results,
            query: query.into(),
            method: method.into(),
            confidence,
        }
    }

    /// A well-formed empty set: retrieval emptiness is a valid outcome,
    /// not an exceptional one.
    pub fn empty(query: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            count: 0,
            query: query.into(),
            method: method.into(),
            confidence: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
#[path = "knowledge_tests.rs"]
mod tests;
