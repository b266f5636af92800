use super::*;
use chrono::{TimeZone, Utc};
use meridian_protocols::knowledge::SourceMeta;

fn message(id: &str, title: &str, body: &str, year: i32) -> KnowledgeItem {
    KnowledgeItem::new(
        id,
        title,
        body,
        SourceMeta::Message {
            sender: Some("pat@acme.test".to_string()),
            sent_at: Some(Utc.with_ymd_and_hms(year, 3, 1, 12, 0, 0).unwrap()),
        },
    )
}

fn document(id: &str, title: &str, body: &str) -> KnowledgeItem {
    KnowledgeItem::new(
        id,
        title,
        body,
        SourceMeta::Document {
            author: None,
            updated_at: None,
        },
    )
}

#[tokio::test]
async fn test_index_and_search() {
    let store = FtsStore::new(SourceType::Message).await.unwrap();
    store
        .index(&message("m1", "Renewal terms", "Acme renewal pricing discussion", 2026))
        .await
        .unwrap();

    let hits = store.search_text("renewal", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].item.id, "m1");
}

#[tokio::test]
async fn test_reindex_replaces_previous_version() {
    let store = FtsStore::new(SourceType::Message).await.unwrap();
    store
        .index(&message("m1", "Old subject", "about kickoff", 2026))
        .await
        .unwrap();
    store
        .index(&message("m1", "New subject", "about renewal", 2026))
        .await
        .unwrap();

    assert!(store.search_text("kickoff", 10).await.unwrap().is_empty());
    let hits = store.search_text("renewal", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_remove() {
    let store = FtsStore::new(SourceType::Message).await.unwrap();
    store
        .index(&message("m1", "Renewal", "renewal details", 2026))
        .await
        .unwrap();
    store.remove("m1").await.unwrap();

    assert!(store.search_text("renewal", 10).await.unwrap().is_empty());
    assert!(store.get("m1").is_none());
}

#[tokio::test]
async fn test_empty_query_returns_nothing() {
    let store = FtsStore::new(SourceType::Message).await.unwrap();
    assert!(store.search_text("", 10).await.unwrap().is_empty());
    assert!(store.search_text("   ", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_respects_limit() {
    let store = FtsStore::new(SourceType::Message).await.unwrap();
    for i in 0..8 {
        store
            .index(&message(
                &format!("m{}", i),
                "Pipeline update",
                "pipeline status for the quarter",
                2026,
            ))
            .await
            .unwrap();
    }

    let hits = store.search_text("pipeline", 3).await.unwrap();
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn test_equal_relevance_ties_break_most_recent_first() {
    let store = FtsStore::new(SourceType::Message).await.unwrap();
    // Identical text so bm25 scores are equal; only the timestamp differs.
    store
        .index(&message("older", "Budget review", "budget review notes", 2024))
        .await
        .unwrap();
    store
        .index(&message("newer", "Budget review", "budget review notes", 2026))
        .await
        .unwrap();

    let hits = store.search_text("budget", 10).await.unwrap();
    assert_eq!(hits[0].item.id, "newer");
    assert_eq!(hits[1].item.id, "older");
}

#[tokio::test]
async fn test_summary_is_searchable() {
    let store = FtsStore::new(SourceType::Document).await.unwrap();
    let item = document("d1", "Q3 deck", "slides")
        .with_summary("expansion strategy for the northeast region");
    store.index(&item).await.unwrap();

    let hits = store.search_text("northeast", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_file_backed_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexical.db");

    let store = FtsStore::with_path(SourceType::Document, &path)
        .await
        .unwrap();
    store
        .index(&document("d1", "Onboarding guide", "how to onboard a new tenant"))
        .await
        .unwrap();

    let hits = store.search_text("onboard", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_escape_fts_query() {
    let escaped = escape_fts_query("hello world");
    assert!(escaped.contains("\"hello\""));
    assert!(escaped.contains("\"world\""));
    assert!(escaped.contains("OR"));
}

#[test]
fn test_escape_fts_query_strips_quotes() {
    let escaped = escape_fts_query("say \"hello\"");
    assert!(!escaped.contains("\"\"hello\"\""));
    assert!(escaped.contains("\"hello\""));
}

#[test]
fn test_escape_fts_query_empty() {
    assert_eq!(escape_fts_query("   "), "");
}

#[tokio::test]
async fn test_retriever_concatenates_without_resorting() {
    let messages = FtsStore::new(SourceType::Message).await.unwrap();
    messages
        .index(&message("m1", "Renewal email", "acme renewal thread", 2026))
        .await
        .unwrap();

    let documents = FtsStore::new(SourceType::Document).await.unwrap();
    documents
        .index(&document("d1", "Renewal playbook", "renewal steps and owners"))
        .await
        .unwrap();

    let retriever = LexicalRetriever::new()
        .with_store(Arc::new(messages))
        .with_store(Arc::new(documents));

    let hits = retriever.search("renewal", 10).await.unwrap();
    // Message store is configured first, so its hits come first
    // regardless of raw scores.
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].item.source_type(), SourceType::Message);
    assert_eq!(hits[1].item.source_type(), SourceType::Document);
}

#[tokio::test]
async fn test_retriever_skips_failing_store() {
    struct BrokenStore;

    #[async_trait]
    impl LexicalStore for BrokenStore {
        fn source_type(&self) -> SourceType {
            SourceType::Event
        }

        async fn search_text(
            &self,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<LexicalHit>, RetrievalError> {
            Err(RetrievalError::QueryFailed("index corrupted".to_string()))
        }
    }

    let documents = FtsStore::new(SourceType::Document).await.unwrap();
    documents
        .index(&document("d1", "Renewal playbook", "renewal steps"))
        .await
        .unwrap();

    let retriever = LexicalRetriever::new()
        .with_store(Arc::new(BrokenStore))
        .with_store(Arc::new(documents));

    let hits = retriever.search("renewal", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].item.id, "d1");
}

#[tokio::test]
async fn test_retriever_empty_query() {
    let retriever = LexicalRetriever::new();
    assert!(retriever.search("", 10).await.unwrap().is_empty());
}
