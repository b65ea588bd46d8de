//! Persistence contract for run-level and per-node records.
//!
//! The engine talks to an external key-value document store through this
//! trait with typed records; serialization is a concern of the concrete
//! adapter. No transactional atomicity is required, but a write made by this
//! process must be visible to its own subsequent reads within the run.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::task::TaskResult;

mod memory;

pub use memory::InMemoryRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Lifecycle status of a run. Terminal once it leaves `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::CompletedWithErrors => "completed_with_errors",
            RunStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

/// Run-level record: one per scheduler invocation, never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRun {
    pub execution_id: String,
    pub workflow_id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub total_nodes: usize,
    pub nodes_executed: usize,
    pub success_count: usize,
    pub error_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionRun {
    pub fn new(workflow_id: String, user_id: String, total_nodes: usize) -> Self {
        Self {
            execution_id: Uuid::new_v4().to_string(),
            workflow_id,
            user_id,
            start_time: Utc::now(),
            end_time: None,
            status: RunStatus::Running,
            total_nodes,
            nodes_executed: 0,
            success_count: 0,
            error_count: 0,
            error: None,
        }
    }
}

/// Optional-field patch for incremental run updates.
#[derive(Debug, Clone, Default)]
pub struct RunPatch {
    pub status: Option<RunStatus>,
    pub end_time: Option<DateTime<Utc>>,
    pub nodes_executed: Option<usize>,
    pub success_count: Option<usize>,
    pub error_count: Option<usize>,
    pub error: Option<String>,
}

impl RunPatch {
    pub fn apply(&self, run: &mut ExecutionRun) {
        if let Some(status) = self.status {
            run.status = status;
        }
        if let Some(end_time) = self.end_time {
            run.end_time = Some(end_time);
        }
        if let Some(nodes_executed) = self.nodes_executed {
            run.nodes_executed = nodes_executed;
        }
        if let Some(success_count) = self.success_count {
            run.success_count = success_count;
        }
        if let Some(error_count) = self.error_count {
            run.error_count = error_count;
        }
        if let Some(error) = &self.error {
            run.error = Some(error.clone());
        }
    }
}

/// Storage operations the engine requires.
#[async_trait]
pub trait ExecutionRecordStore: Send + Sync {
    async fn create_run(&self, run: &ExecutionRun) -> Result<(), StoreError>;

    async fn update_run(&self, execution_id: &str, patch: RunPatch) -> Result<(), StoreError>;

    async fn get_run(&self, execution_id: &str) -> Result<Option<ExecutionRun>, StoreError>;

    async fn create_node_result(
        &self,
        execution_id: &str,
        node_id: &str,
        result: &TaskResult,
    ) -> Result<(), StoreError>;

    /// All per-node results recorded for a run, in write order.
    async fn list_node_results(&self, execution_id: &str) -> Result<Vec<TaskResult>, StoreError>;
}
