//! Hybrid search extension.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use meridian_protocols::error::ExtensionError;
use meridian_protocols::extension::{Extension, ExtensionContext, ExtensionManifest};
use meridian_protocols::types::Version;

use crate::engine::HybridSearchEngine;
use crate::tool::KnowledgeSearchTool;

/// Registers hybrid knowledge search with the tool registry.
pub struct HybridSearchExtension {
    manifest: ExtensionManifest,
    engine: Option<Arc<HybridSearchEngine>>,
}

impl HybridSearchExtension {
    /// Create a new hybrid search extension.
    ///
    /// Note: You must call `with_engine` before initialization.
    pub fn new() -> Self {
        let mut manifest = ExtensionManifest::new(
            "search-hybrid",
            "Hybrid Search",
            Version::new(0, 1, 0),
        )
        .with_description(
            "Hybrid retrieval combining vector and keyword search with RRF fusion",
        );
        manifest.provides.tools = vec!["knowledge_search".to_string()];

        Self {
            manifest,
            engine: None,
        }
    }

    /// Attach the engine the `knowledge_search` tool will run against.
    pub fn with_engine(mut self, engine: Arc<HybridSearchEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Get the engine after configuration.
    pub fn engine(&self) -> Option<Arc<HybridSearchEngine>> {
        self.engine.clone()
    }
}

impl Default for HybridSearchExtension {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extension for HybridSearchExtension {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError> {
        let engine = self.engine.clone().ok_or_else(|| {
            ExtensionError::InitializationFailed(
                "HybridSearchExtension requires an engine via with_engine()".to_string(),
            )
        })?;

        let tool = Arc::new(KnowledgeSearchTool::new(engine));
        ctx.tool_registry.register_tool(tool)?;

        tracing::info!("Hybrid search extension initialized");
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "extension_tests.rs"]
mod tests;
