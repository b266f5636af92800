use super::*;
use parking_lot::Mutex;

use meridian_protocols::extension::ToolRegistryAccess;
use meridian_protocols::tool::Tool;
use meridian_search_vector::{HashEmbedding, VectorRetriever};

use crate::lexical::LexicalRetriever;

#[derive(Default)]
struct RecordingRegistry {
    registered: Mutex<Vec<String>>,
}

impl ToolRegistryAccess for RecordingRegistry {
    fn register_tool(&self, tool: Arc<dyn Tool>) -> Result<(), ExtensionError> {
        self.registered.lock().push(tool.definition().id.clone());
        Ok(())
    }

    fn unregister_tool(&self, tool_id: &str) -> Result<(), ExtensionError> {
        self.registered.lock().retain(|id| id != tool_id);
        Ok(())
    }
}

fn engine() -> Arc<HybridSearchEngine> {
    let vector = VectorRetriever::new(Arc::new(HashEmbedding::default()));
    Arc::new(HybridSearchEngine::new(vector, LexicalRetriever::new()))
}

#[test]
fn test_manifest() {
    let extension = HybridSearchExtension::new();
    let manifest = extension.manifest();
    assert_eq!(manifest.id, "search-hybrid");
    assert_eq!(manifest.provides.tools, vec!["knowledge_search"]);
}

#[test]
fn test_engine_accessor() {
    let extension = HybridSearchExtension::new();
    assert!(extension.engine().is_none());

    let extension = extension.with_engine(engine());
    assert!(extension.engine().is_some());
}

#[tokio::test]
async fn test_initialize_registers_tool() {
    let registry = Arc::new(RecordingRegistry::default());
    let mut extension = HybridSearchExtension::new().with_engine(engine());

    extension
        .initialize(ExtensionContext::new(registry.clone()))
        .await
        .unwrap();

    assert_eq!(*registry.registered.lock(), vec!["knowledge_search"]);
}

#[tokio::test]
async fn test_initialize_without_engine_fails() {
    let registry = Arc::new(RecordingRegistry::default());
    let mut extension = HybridSearchExtension::new();

    let result = extension
        .initialize(ExtensionContext::new(registry))
        .await;

    assert!(matches!(
        result,
        Err(ExtensionError::InitializationFailed(_))
    ));
}

#[tokio::test]
async fn test_shutdown_default_is_ok() {
    let extension = HybridSearchExtension::new();
    assert!(extension.shutdown().await.is_ok());
}
