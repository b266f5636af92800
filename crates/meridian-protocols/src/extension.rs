//! Extension protocol definitions.
//!
//! Extensions are the unit of registration: an extension declares what it
//! provides in a manifest and wires its tools into the registry during
//! `initialize`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ExtensionError;
use crate::tool::Tool;
use crate::types::{Author, Metadata, Version};

/// Extension manifest containing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionManifest {
    pub id: String,
    pub name: String,
    pub version: Version,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub provides: Provides,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ExtensionManifest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: Version) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version,
            description: String::new(),
            author: None,
            provides: Provides::default(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// What an extension provides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Provides {
    #[serde(default)]
    pub tools: Vec<String>,
}

/// Trait for accessing the tool registry from extensions.
pub trait ToolRegistryAccess: Send + Sync {
    /// Register a tool.
    fn register_tool(&self, tool: Arc<dyn Tool>) -> Result<(), ExtensionError>;

    /// Unregister a tool.
    fn unregister_tool(&self, tool_id: &str) -> Result<(), ExtensionError>;
}

/// Context passed to extensions during initialization.
#[derive(Clone)]
pub struct ExtensionContext {
    /// Registry the extension publishes its tools into.
    pub tool_registry: Arc<dyn ToolRegistryAccess>,
}

impl ExtensionContext {
    pub fn new(tool_registry: Arc<dyn ToolRegistryAccess>) -> Self {
        Self { tool_registry }
    }
}

/// Core trait for all extensions.
#[async_trait]
pub trait Extension: Send + Sync + 'static {
    /// Returns the extension manifest.
    fn manifest(&self) -> &ExtensionManifest;

    /// Initialize the extension with the given context.
    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError>;

    /// Shutdown the extension.
    async fn shutdown(&self) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Returns a reference to the extension as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to the extension as `Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_new() {
        let manifest = ExtensionManifest::new("search-hybrid", "Hybrid Search", Version::new(0, 1, 0));
        assert_eq!(manifest.id, "search-hybrid");
        assert_eq!(manifest.version, Version::new(0, 1, 0));
        assert!(manifest.description.is_empty());
    }

    #[test]
    fn test_manifest_with_description() {
        let manifest = ExtensionManifest::new("x", "X", Version::new(0, 1, 0))
            .with_description("does x");
        assert_eq!(manifest.description, "does x");
    }

    #[test]
    fn test_provides_default_is_empty() {
        let provides = Provides::default();
        assert!(provides.tools.is_empty());
    }

    #[test]
    fn test_manifest_serde_roundtrip() {
        let mut manifest = ExtensionManifest::new("x", "X", Version::new(1, 0, 0));
        manifest.provides.tools.push("knowledge_search".to_string());
        let json = serde_json::to_string(&manifest).unwrap();
        let back: ExtensionManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.provides.tools, vec!["knowledge_search"]);
    }
}
