//! Language-model reranking of the fused head.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, warn};

use meridian_protocols::knowledge::ScoredItem;
use meridian_protocols::provider::{CompletionProvider, CompletionRequest};

/// Configuration for the reranker.
#[derive(Debug, Clone)]
pub struct RerankConfig {
    /// Reranking only runs when the fused candidate count exceeds this.
    pub trigger_threshold: usize,
    /// At most this many candidates are sent to the model; the rest of
    /// the list is appended unchanged.
    pub window: usize,
    /// Token budget for the model reply.
    pub max_tokens: u32,
    /// Snippet length per candidate in the prompt.
    pub snippet_chars: usize,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            trigger_threshold: 5,
            window: 30,
            max_tokens: 128,
            snippet_chars: 200,
        }
    }
}

impl RerankConfig {
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_trigger_threshold(mut self, trigger_threshold: usize) -> Self {
        self.trigger_threshold = trigger_threshold;
        self
    }
}

/// Outcome of a rerank attempt.
pub struct RerankOutcome {
    pub candidates: Vec<ScoredItem>,
    /// Whether the model's ordering was actually applied.
    pub applied: bool,
}

/// Second-pass reranker backed by a completion provider.
///
/// Strictly best-effort: the model's reply is untrusted text, and every
/// failure mode (transport error, unparseable reply, bogus indices)
/// falls back to the fused order.
pub struct LlmReranker {
    provider: Arc<dyn CompletionProvider>,
    config: RerankConfig,
}

impl LlmReranker {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            config: RerankConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RerankConfig) -> Self {
        self.config = config;
        self
    }

    /// Whether a fused list of this size qualifies for reranking.
    pub fn should_rerank(&self, candidate_count: usize) -> bool {
        candidate_count > self.config.trigger_threshold
    }

    /// Reorder the head window by model-judged relevance; the tail is
    /// appended untouched. Never fails: any error returns the input
    /// order with `applied == false`.
    pub async fn rerank(&self, query: &str, candidates: Vec<ScoredItem>) -> RerankOutcome {
        let window = self.config.window.min(candidates.len());
        if window == 0 {
            return RerankOutcome {
                candidates,
                applied: false,
            };
        }

        let prompt = self.build_prompt(query, &candidates[..window]);
        let request = CompletionRequest::new(prompt)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(0.0);

        let reply = match self.provider.complete(request).await {
            Ok(response) => response.text,
            Err(e) => {
                warn!("rerank model call failed, keeping fused order: {}", e);
                return RerankOutcome {
                    candidates,
                    applied: false,
                };
            }
        };

        let Some(order) = parse_index_list(&reply, window) else {
            warn!("rerank reply had no usable index list, keeping fused order");
            return RerankOutcome {
                candidates,
                applied: false,
            };
        };

        debug!(window, listed = order.len(), "applying reranked order");

        let mut head: Vec<Option<ScoredItem>> =
            candidates.iter().take(window).cloned().map(Some).collect();
        let tail = candidates.into_iter().skip(window);

        let mut reordered = Vec::with_capacity(head.len());
        for idx in order {
            if let Some(item) = head[idx].take() {
                reordered.push(item);
            }
        }
        // Head items the model omitted keep their relative order.
        reordered.extend(head.into_iter().flatten());
        reordered.extend(tail);

        RerankOutcome {
            candidates: reordered,
            applied: true,
        }
    }

    fn build_prompt(&self, query: &str, head: &[ScoredItem]) -> String {
        let mut prompt = String::new();
        let _ = writeln!(
            prompt,
            "You are ranking search results for relevance to a query."
        );
        let _ = writeln!(prompt, "\nQuery: {}\n\nCandidates:", query);

        for (idx, scored) in head.iter().enumerate() {
            let snippet = truncate_chars(scored.item.snippet_text(), self.config.snippet_chars);
            let _ = writeln!(prompt, "{}. {}: {}", idx + 1, scored.item.title, snippet);
        }

        let _ = writeln!(
            prompt,
            "\nReturn a JSON array of the candidate numbers ordered from most to \
             least relevant, for example [2, 1, 3]. Include every number exactly once."
        );
        prompt
    }
}

/// Extract the first bracketed JSON integer list from unstructured text
/// and convert it to valid 0-based indices.
///
/// 1-based numbers outside `1..=window` and repeats are dropped. Returns
/// `None` when no parseable list exists, which callers treat as "keep
/// the input order".
fn parse_index_list(text: &str, window: usize) -> Option<Vec<usize>> {
    let start = text.find('[')?;
    let end = start + text[start..].find(']')?;
    let slice = &text[start..=end];

    let numbers: Vec<i64> = serde_json::from_str(slice).ok()?;

    let mut seen = vec![false; window];
    let mut indices = Vec::with_capacity(numbers.len());
    for number in numbers {
        if number < 1 || number as usize > window {
            continue;
        }
        let idx = (number - 1) as usize;
        if !seen[idx] {
            seen[idx] = true;
            indices.push(idx);
        }
    }

    if indices.is_empty() {
        None
    } else {
        Some(indices)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
#[path = "rerank_tests.rs"]
mod tests;
