//! The `knowledge_search` tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use meridian_protocols::error::ToolError;
use meridian_protocols::knowledge::KnowledgeQuery;
use meridian_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};
use meridian_protocols::types::RiskLevel;

use crate::engine::HybridSearchEngine;

#[derive(Debug, Deserialize)]
struct KnowledgeSearchParams {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
    #[serde(default)]
    min_similarity: Option<f32>,
    #[serde(default)]
    enable_reranking: Option<bool>,
}

/// Hybrid knowledge search exposed to the execution planner.
pub struct KnowledgeSearchTool {
    definition: ToolDefinition,
    engine: Arc<HybridSearchEngine>,
}

impl KnowledgeSearchTool {
    pub fn new(engine: Arc<HybridSearchEngine>) -> Self {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query text"
                },
                "top_k": {
                    "type": "integer",
                    "description": "Maximum number of results (default 10)"
                },
                "min_similarity": {
                    "type": "number",
                    "description": "Minimum vector similarity 0.0-1.0"
                },
                "enable_reranking": {
                    "type": "boolean",
                    "description": "Whether to apply second-pass reranking (default true)"
                }
            },
            "required": ["query"]
        });

        Self {
            definition: ToolDefinition::new(
                "knowledge_search",
                "Knowledge Search",
                "Search emails, documents, meeting transcripts and calendar events \
                 for relevant context. Use this to ground answers about accounts, \
                 deals and conversations.",
            )
            .with_parameters_schema(schema)
            .with_risk_level(RiskLevel::Low),
            engine,
        }
    }
}

#[async_trait]
impl Tool for KnowledgeSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: KnowledgeSearchParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        let mut query = KnowledgeQuery::new(params.query);
        if let Some(top_k) = params.top_k {
            query = query.with_limit(top_k);
        }
        if let Some(min_similarity) = params.min_similarity {
            query = query.with_min_similarity(min_similarity);
        }
        if let Some(enable_reranking) = params.enable_reranking {
            query = query.with_rerank(enable_reranking);
        }

        debug!(query = %query.text, limit = query.limit, "knowledge_search");

        let set = self.engine.search(&query).await;

        let content = if set.is_empty() {
            "No matching knowledge found.".to_string()
        } else {
            let mut lines = format!(
                "Found {} results (confidence {:.2}):\n",
                set.count, set.confidence
            );
            for (idx, scored) in set.results.iter().enumerate() {
                lines.push_str(&format!(
                    "{}. [{}] {}\n",
                    idx + 1,
                    scored.item.source_type(),
                    scored.item.title
                ));
            }
            lines
        };

        let payload = serde_json::to_value(&set)
            .map_err(|e| ToolError::ExecutionFailed(format!("serialize results: {}", e)))?;

        Ok(ToolResult::success_json(content, payload))
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
