//! Engine-level and task-level error types.

use thiserror::Error;

/// Errors that prevent a workflow from being scheduled at all.
///
/// Per-node failures are not errors: they are captured as failed
/// [`TaskResult`](crate::task::TaskResult)s and routed by the graph itself.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Graph build error: {0}")]
    GraphBuildError(String),
    #[error("No starting node found")]
    NoStartNode,
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Errors raised by task handlers.
///
/// The executor never lets these escape: they are normalized into failed
/// task results before the scheduler sees them.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("No handler for task type: {0}")]
    HandlerNotFound(String),
    #[error("Invalid task configuration: {0}")]
    InvalidConfig(String),
    #[error("Task execution error: {0}")]
    ExecutionError(String),
}

impl From<crate::llm::LlmError> for TaskError {
    fn from(e: crate::llm::LlmError) -> Self {
        TaskError::ExecutionError(e.to_string())
    }
}
