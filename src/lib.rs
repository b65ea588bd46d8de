//! # aiflow — an execution engine for AI task workflows
//!
//! `aiflow` executes directed graphs of AI task nodes connected by
//! conditional edges. Each node calls a language-model completion; the
//! outgoing edges a result follows depend on whether the node succeeded or
//! failed (`always` / `success` / `error`). The engine:
//!
//! - **Dependency-gated traversal**: nodes run once all their incoming edges
//!   settle, in FIFO order; independent branches fan out, error branches
//!   enable in-graph recovery paths.
//! - **Pluggable task handlers**: register implementations per task type;
//!   the built-in `"aiTask"` handler calls a completion provider with
//!   template-substituted prompts and optional upstream-context injection.
//! - **Per-run records**: a run-level [`ExecutionRun`] plus per-node
//!   [`TaskResult`]s, persisted through the [`ExecutionRecordStore`]
//!   contract (in-memory implementation included).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use aiflow::{
//!     EngineConfig, ExecuteOptions, InMemoryRecordStore, OpenAiConfig, OpenAiProvider,
//!     TaskEdge, TaskHandlerRegistry, TaskNode, WorkflowScheduler,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut registry = TaskHandlerRegistry::new();
//!     registry.set_completion_provider(
//!         Arc::new(OpenAiProvider::new(OpenAiConfig::from_env())),
//!         EngineConfig::from_env(),
//!     );
//!     let scheduler = WorkflowScheduler::new(
//!         Arc::new(registry),
//!         Arc::new(InMemoryRecordStore::new()),
//!     );
//!
//!     let nodes: Vec<TaskNode> = serde_json::from_str(r#"[
//!         {"id": "1", "type": "aiTask", "parameters": {"prompt": "Say hello"}},
//!         {"id": "2", "type": "aiTask", "parameters": {"prompt": "Translate: {{1}}"}}
//!     ]"#).unwrap();
//!     let edges: Vec<TaskEdge> = serde_json::from_str(r#"[
//!         {"id": "e1", "source": "1", "target": "2", "condition": "success"}
//!     ]"#).unwrap();
//!
//!     let report = scheduler
//!         .execute_workflow(&nodes, &edges, ExecuteOptions::default())
//!         .await
//!         .unwrap();
//!     println!("{:?}", report.run.status);
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod prompt;
pub mod scheduler;
pub mod store;
pub mod task;

pub use config::EngineConfig;
pub use error::{EngineError, TaskError};
pub use graph::{EdgeCondition, GraphModel, NodeParameters, Outcome, TaskEdge, TaskNode};
pub use llm::{
    CompletionProvider, CompletionRequest, CompletionResponse, LlmError, OpenAiConfig,
    OpenAiProvider,
};
pub use prompt::PromptContextBuilder;
pub use scheduler::{ExecuteOptions, ExecutionReport, WorkflowScheduler};
pub use store::{
    ExecutionRecordStore, ExecutionRun, InMemoryRecordStore, RunPatch, RunStatus, StoreError,
};
pub use task::{
    AiTaskHandler, ResultMap, TaskConfig, TaskData, TaskExecutor, TaskHandler,
    TaskHandlerRegistry, TaskMetadata, TaskResult, AI_TASK_TYPE,
};
