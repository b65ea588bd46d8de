use std::sync::Arc;

use tracing::{debug, warn};

use super::{ResultMap, TaskConfig, TaskHandlerRegistry, TaskResult};

/// Dispatches one node's execution to its registered handler and normalizes
/// every outcome into a [`TaskResult`].
///
/// No error escapes this layer: a missing handler or a handler failure both
/// come back as failed results with identity and timing metadata populated.
/// `metadata.execution_id` is left unset; the scheduler stamps it.
pub struct TaskExecutor {
    registry: Arc<TaskHandlerRegistry>,
}

impl TaskExecutor {
    pub fn new(registry: Arc<TaskHandlerRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, config: &TaskConfig, previous: &ResultMap) -> TaskResult {
        let Some(handler) = self.registry.get(&config.task_type) else {
            warn!(
                node_id = %config.node_id,
                task_type = %config.task_type,
                "no handler registered for task type"
            );
            return self.stamp(
                TaskResult::failed(
                    &config.node_id,
                    format!("No handler for task type: {}", config.task_type),
                ),
                config,
            );
        };

        debug!(node_id = %config.node_id, task_type = %config.task_type, "executing task");
        match handler.execute(config, previous).await {
            Ok(result) => self.stamp(result, config),
            Err(e) => self.stamp(TaskResult::failed(&config.node_id, e.to_string()), config),
        }
    }

    fn stamp(&self, mut result: TaskResult, config: &TaskConfig) -> TaskResult {
        result.metadata.node_id = config.node_id.clone();
        result.metadata.task_type.get_or_insert(config.task_type.clone());
        result
    }
}
