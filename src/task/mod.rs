//! Task execution: result types, the handler extension point, and the
//! executor that normalizes every outcome into a [`TaskResult`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::TaskError;
use crate::graph::{NodeParameters, Outcome};
use crate::llm::CompletionProvider;

mod ai;
mod executor;

pub use ai::{AiTaskHandler, AI_TASK_TYPE};
pub use executor::TaskExecutor;

/// Output of a successful completion task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskData {
    pub text: String,
    pub tokens: i64,
    pub model: String,
}

/// Identity and timing metadata stamped on every result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMetadata {
    pub node_id: String,
    /// Filled in by the scheduler; handlers do not know the run identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

/// The outcome of executing one node, produced exactly once per node per run
/// and immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TaskData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: TaskMetadata,
}

impl TaskResult {
    pub fn succeeded(node_id: &str, data: TaskData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: TaskMetadata {
                node_id: node_id.to_string(),
                execution_id: None,
                timestamp: Utc::now(),
                task_type: None,
            },
        }
    }

    pub fn failed(node_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata: TaskMetadata {
                node_id: node_id.to_string(),
                execution_id: None,
                timestamp: Utc::now(),
                task_type: None,
            },
        }
    }

    /// Generated text, when the task produced any.
    pub fn text(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.text.as_str())
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_success(self.success)
    }
}

/// Per-node execution config handed to handlers.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    pub task_type: String,
    pub node_id: String,
    pub parameters: NodeParameters,
    /// Per-run completion API key, when the caller supplied one.
    pub api_key: Option<String>,
}

/// Insertion-ordered map of node ID to result.
///
/// Iteration order is completion order, which keeps context-block assembly
/// deterministic. A node ID is only recorded once; later inserts for the
/// same ID are ignored.
#[derive(Debug, Clone, Default)]
pub struct ResultMap {
    order: Vec<String>,
    results: HashMap<String, TaskResult>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_id: String, result: TaskResult) {
        if self.results.contains_key(&node_id) {
            return;
        }
        self.order.push(node_id.clone());
        self.results.insert(node_id, result);
    }

    pub fn get(&self, node_id: &str) -> Option<&TaskResult> {
        self.results.get(node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.results.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Results in completion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskResult)> {
        self.order
            .iter()
            .filter_map(|id| self.results.get(id).map(|r| (id.as_str(), r)))
    }

    pub fn node_ids(&self) -> &[String] {
        &self.order
    }
}

/// Pluggable implementation of one task type.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn execute(
        &self,
        config: &TaskConfig,
        previous: &ResultMap,
    ) -> Result<TaskResult, TaskError>;
}

/// Registry of task handlers by task-type string.
///
/// An explicit object injected into the scheduler at construction, so tests
/// can register stub handlers without touching shared state.
pub struct TaskHandlerRegistry {
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
}

impl TaskHandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, task_type: &str, handler: Arc<dyn TaskHandler>) {
        self.handlers.insert(task_type.to_string(), handler);
    }

    /// Register the built-in AI completion handler backed by `provider`.
    pub fn set_completion_provider(
        &mut self,
        provider: Arc<dyn CompletionProvider>,
        config: EngineConfig,
    ) {
        self.register(AI_TASK_TYPE, Arc::new(AiTaskHandler::new(provider, config)));
    }

    pub fn get(&self, task_type: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(task_type).cloned()
    }

    pub fn registered_types(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}

impl Default for TaskHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_map_insertion_order() {
        let mut map = ResultMap::new();
        map.insert("b".into(), TaskResult::failed("b", "x"));
        map.insert(
            "a".into(),
            TaskResult::succeeded(
                "a",
                TaskData {
                    text: "out".into(),
                    tokens: 1,
                    model: "m".into(),
                },
            ),
        );

        let ids: Vec<_> = map.iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(map.len(), 2);
        assert!(map.contains("a"));
        assert_eq!(map.get("a").unwrap().text(), Some("out"));
    }

    #[test]
    fn test_result_map_ignores_duplicate_insert() {
        let mut map = ResultMap::new();
        map.insert("a".into(), TaskResult::failed("a", "first"));
        map.insert("a".into(), TaskResult::failed("a", "second"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a").unwrap().error.as_deref(), Some("first"));
    }

    #[test]
    fn test_task_result_constructors() {
        let ok = TaskResult::succeeded(
            "n1",
            TaskData {
                text: "t".into(),
                tokens: 5,
                model: "m".into(),
            },
        );
        assert!(ok.success);
        assert_eq!(ok.outcome(), Outcome::Success);
        assert_eq!(ok.metadata.node_id, "n1");
        assert!(ok.metadata.execution_id.is_none());

        let err = TaskResult::failed("n2", "boom");
        assert!(!err.success);
        assert_eq!(err.outcome(), Outcome::Error);
        assert_eq!(err.error.as_deref(), Some("boom"));
        assert!(err.text().is_none());
    }

    #[test]
    fn test_task_result_serde_skips_absent_fields() {
        let result = TaskResult::failed("n", "e");
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("data").is_none());
        assert_eq!(value["error"], "e");
        assert!(value["metadata"].get("executionId").is_none());
    }

    #[test]
    fn test_registry_register_and_get() {
        struct Noop;
        #[async_trait]
        impl TaskHandler for Noop {
            async fn execute(
                &self,
                config: &TaskConfig,
                _previous: &ResultMap,
            ) -> Result<TaskResult, TaskError> {
                Ok(TaskResult::failed(&config.node_id, "noop"))
            }
        }

        let mut registry = TaskHandlerRegistry::new();
        registry.register("noop", Arc::new(Noop));
        assert!(registry.get("noop").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.registered_types(), vec!["noop".to_string()]);
    }
}
