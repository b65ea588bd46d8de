use async_trait::async_trait;
use dashmap::DashMap;

use crate::task::TaskResult;

use super::{ExecutionRecordStore, ExecutionRun, RunPatch, StoreError};

/// In-memory record store for tests and single-process embedding.
///
/// DashMap gives thread-safe access without a single store-wide lock; node
/// results are kept in write order per run.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    runs: DashMap<String, ExecutionRun>,
    node_results: DashMap<String, Vec<(String, TaskResult)>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionRecordStore for InMemoryRecordStore {
    async fn create_run(&self, run: &ExecutionRun) -> Result<(), StoreError> {
        self.runs.insert(run.execution_id.clone(), run.clone());
        Ok(())
    }

    async fn update_run(&self, execution_id: &str, patch: RunPatch) -> Result<(), StoreError> {
        let mut run = self
            .runs
            .get_mut(execution_id)
            .ok_or_else(|| StoreError::NotFound(execution_id.to_string()))?;
        patch.apply(&mut run);
        Ok(())
    }

    async fn get_run(&self, execution_id: &str) -> Result<Option<ExecutionRun>, StoreError> {
        Ok(self.runs.get(execution_id).map(|r| r.clone()))
    }

    async fn create_node_result(
        &self,
        execution_id: &str,
        node_id: &str,
        result: &TaskResult,
    ) -> Result<(), StoreError> {
        self.node_results
            .entry(execution_id.to_string())
            .or_default()
            .push((node_id.to_string(), result.clone()));
        Ok(())
    }

    async fn list_node_results(&self, execution_id: &str) -> Result<Vec<TaskResult>, StoreError> {
        Ok(self
            .node_results
            .get(execution_id)
            .map(|entries| entries.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default())
    }
}
