//! Lexical (keyword) retrieval over SQLite FTS5.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use meridian_protocols::error::RetrievalError;
use meridian_protocols::knowledge::{KnowledgeItem, SourceType};

/// A ranked full-text hit from one store.
///
/// The score is only meaningful within the store that produced it;
/// fusion consumes list positions, not scores.
#[derive(Debug, Clone)]
pub struct LexicalHit {
    pub item: KnowledgeItem,
    pub score: f32,
}

/// Read-only ranked full-text capability of one content source.
#[async_trait]
pub trait LexicalStore: Send + Sync {
    /// The source this store serves.
    fn source_type(&self) -> SourceType;

    /// Return up to `limit` hits ordered by descending relevance, ties
    /// broken most-recent-first.
    async fn search_text(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LexicalHit>, RetrievalError>;
}

/// FTS5-backed lexical store for one content source.
///
/// Tokenizes with `porter unicode61` and ranks with `bm25()`. The items
/// themselves live in an in-process map; the virtual table only carries
/// the searchable text plus the recency tie-break column.
pub struct FtsStore {
    source: SourceType,
    conn: Arc<Connection>,
    entries: RwLock<HashMap<String, KnowledgeItem>>,
}

impl FtsStore {
    /// Create a store backed by an in-memory database.
    pub async fn new(source: SourceType) -> Result<Self, RetrievalError> {
        Self::with_path(source, ":memory:").await
    }

    /// Create a store backed by a file database.
    pub async fn with_path(
        source: SourceType,
        path: impl Into<PathBuf>,
    ) -> Result<Self, RetrievalError> {
        let path: PathBuf = path.into();
        let path_str = path.to_string_lossy().to_string();

        let conn = Connection::open(path_str)
            .await
            .map_err(|e| RetrievalError::StorageError(e.to_string()))?;

        conn.call(|conn| {
            conn.execute_batch(
                r#"
                CREATE VIRTUAL TABLE IF NOT EXISTS knowledge_fts USING fts5(
                    id UNINDEXED,
                    title,
                    body,
                    summary,
                    created_at UNINDEXED,
                    tokenize='porter unicode61'
                );
                "#,
            )?;
            Ok(())
        })
        .await
        .map_err(|e| RetrievalError::StorageError(e.to_string()))?;

        Ok(Self {
            source,
            conn: Arc::new(conn),
            entries: RwLock::new(HashMap::new()),
        })
    }

    /// Index an item, replacing any previous version.
    pub async fn index(&self, item: &KnowledgeItem) -> Result<(), RetrievalError> {
        let id = item.id.clone();
        let title = item.title.clone();
        let body = item.body.clone();
        let summary = item.summary.clone().unwrap_or_default();
        let created_at = item
            .meta
            .timestamp()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM knowledge_fts WHERE id = ?",
                    rusqlite::params![id],
                )?;
                conn.execute(
                    "INSERT INTO knowledge_fts (id, title, body, summary, created_at) \
                     VALUES (?, ?, ?, ?, ?)",
                    rusqlite::params![id, title, body, summary, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| RetrievalError::StorageError(e.to_string()))?;

        self.entries.write().insert(item.id.clone(), item.clone());

        debug!(source = %self.source, id = %item.id, "indexed item for FTS");
        Ok(())
    }

    /// Remove an item from the index.
    pub async fn remove(&self, id: &str) -> Result<(), RetrievalError> {
        let id_owned = id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "DELETE FROM knowledge_fts WHERE id = ?",
                    rusqlite::params![id_owned],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| RetrievalError::StorageError(e.to_string()))?;

        self.entries.write().remove(id);
        Ok(())
    }

    /// Get an indexed item by ID.
    pub fn get(&self, id: &str) -> Option<KnowledgeItem> {
        self.entries.read().get(id).cloned()
    }
}

#[async_trait]
impl LexicalStore for FtsStore {
    fn source_type(&self) -> SourceType {
        self.source
    }

    async fn search_text(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LexicalHit>, RetrievalError> {
        if query.trim().is_empty() {
            return Ok(vec![]);
        }

        let escaped_query = escape_fts_query(query);

        // bm25() returns lower-is-better; ascending order puts the best
        // match first, with recency as the stable secondary key.
        let rows: Vec<(String, f32)> = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, bm25(knowledge_fts) AS rank_score
                    FROM knowledge_fts
                    WHERE knowledge_fts MATCH ?
                    ORDER BY rank_score, created_at DESC
                    LIMIT ?
                    "#,
                )?;

                let results: Vec<(String, f32)> = stmt
                    .query_map(rusqlite::params![escaped_query, limit as i64], |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)? as f32))
                    })?
                    .filter_map(|r| r.ok())
                    .collect();

                Ok(results)
            })
            .await
            .map_err(|e| RetrievalError::QueryFailed(format!("FTS search failed: {}", e)))?;

        let entries = self.entries.read();
        Ok(rows
            .into_iter()
            .filter_map(|(id, rank_score)| {
                entries.get(&id).map(|item| LexicalHit {
                    item: item.clone(),
                    // Flip the sign so higher means more relevant.
                    score: -rank_score,
                })
            })
            .collect())
    }
}

/// Escape special FTS5 query characters.
fn escape_fts_query(query: &str) -> String {
    let words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }

    // Quote each word and OR-join for broader matching
    words
        .iter()
        .map(|w| format!("\"{}\"", w.replace('"', "")))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// The lexical leg of hybrid search.
///
/// Fans out over every configured source and concatenates the per-source
/// lists in configuration order. The concatenation is deliberately not
/// re-sorted: relevance scores are not comparable across sources, and
/// fusion only consumes positions in the returned list.
pub struct LexicalRetriever {
    stores: Vec<Arc<dyn LexicalStore>>,
}

impl LexicalRetriever {
    pub fn new() -> Self {
        Self { stores: Vec::new() }
    }

    pub fn with_store(mut self, store: Arc<dyn LexicalStore>) -> Self {
        self.stores.push(store);
        self
    }

    pub fn add_store(&mut self, store: Arc<dyn LexicalStore>) {
        self.stores.push(store);
    }

    /// Run the lexical leg: top-K per source, concatenated without
    /// re-sorting.
    pub async fn search(
        &self,
        text: &str,
        per_source_limit: usize,
    ) -> Result<Vec<LexicalHit>, RetrievalError> {
        if text.trim().is_empty() {
            return Ok(vec![]);
        }

        let futures = self
            .stores
            .iter()
            .map(|store| store.search_text(text, per_source_limit));

        let mut hits: Vec<LexicalHit> = Vec::new();
        for (store, result) in self.stores.iter().zip(join_all(futures).await) {
            match result {
                Ok(store_hits) => hits.extend(store_hits),
                Err(e) => {
                    warn!(
                        source = %store.source_type(),
                        "lexical store failed, skipping: {}",
                        e
                    );
                }
            }
        }

        debug!(candidates = hits.len(), "lexical leg complete");
        Ok(hits)
    }
}

impl Default for LexicalRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "lexical_tests.rs"]
mod tests;
