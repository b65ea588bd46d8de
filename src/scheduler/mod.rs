//! Workflow scheduler: dependency-gated traversal of the task graph.
//!
//! [`WorkflowScheduler`] resolves the start nodes, walks the graph in FIFO
//! order as dependencies settle, dispatches each ready node to the
//! [`TaskExecutor`], routes onward along edges whose condition matches the
//! node's outcome, and aggregates everything into one [`ExecutionRun`]
//! record plus a per-node [`ResultMap`].
//!
//! Traversal is event-driven: every node carries a counter of unsettled
//! incoming edges. Finishing a node settles each outgoing edge as traversed
//! (condition matched) or dead; a node whose counter reaches zero runs if at
//! least one incoming edge was traversed and is otherwise unreachable, which
//! settles its own outgoing edges as dead, transitively. Nodes inside cycles
//! never reach a zero counter, so termination is bounded without cycle
//! detection; they surface as `nodes_executed < total_nodes`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::graph::{GraphModel, TaskEdge, TaskNode};
use crate::store::{ExecutionRecordStore, ExecutionRun, RunPatch, RunStatus};
use crate::task::{ResultMap, TaskConfig, TaskExecutor, TaskHandlerRegistry};

/// Caller-supplied options for one run.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub workflow_id: Option<String>,
    pub user_id: Option<String>,
    /// Per-run completion API key forwarded to task handlers.
    pub completion_api_key: Option<String>,
}

/// Outcome of one scheduler invocation.
///
/// A `failed` run status means the workflow could not run at all; a
/// `completed_with_errors` status means it ran and some nodes failed per
/// design.
#[derive(Debug)]
pub struct ExecutionReport {
    pub run: ExecutionRun,
    pub results: ResultMap,
}

pub struct WorkflowScheduler {
    executor: TaskExecutor,
    store: Arc<dyn ExecutionRecordStore>,
}

impl WorkflowScheduler {
    pub fn new(registry: Arc<TaskHandlerRegistry>, store: Arc<dyn ExecutionRecordStore>) -> Self {
        Self {
            executor: TaskExecutor::new(registry),
            store,
        }
    }

    /// Execute the workflow described by `nodes` and `edges`.
    ///
    /// Graph-level problems (no start node, dangling edges) come back as a
    /// `failed` run with no nodes executed, not as an `Err`; per-node
    /// failures are recorded results routed by `error`-condition edges.
    pub async fn execute_workflow(
        &self,
        nodes: &[TaskNode],
        edges: &[TaskEdge],
        options: ExecuteOptions,
    ) -> Result<ExecutionReport, EngineError> {
        let workflow_id = options.workflow_id.clone().unwrap_or_default();
        let user_id = options.user_id.clone().unwrap_or_default();

        let model = match GraphModel::build(nodes, edges) {
            Ok(model) => model,
            Err(e) => {
                return Ok(self
                    .fail_run(workflow_id, user_id, nodes.len(), e.to_string())
                    .await);
            }
        };

        let roots: Vec<String> = model.start_nodes().iter().map(|n| n.id.clone()).collect();
        if roots.is_empty() {
            return Ok(self
                .fail_run(
                    workflow_id,
                    user_id,
                    model.node_count(),
                    "No starting node found".to_string(),
                )
                .await);
        }

        let mut run = ExecutionRun::new(workflow_id, user_id, model.node_count());
        if let Err(e) = self.store.create_run(&run).await {
            warn!(error = %e, execution_id = %run.execution_id, "failed to persist run record; continuing");
        }
        info!(
            execution_id = %run.execution_id,
            total_nodes = run.total_nodes,
            roots = roots.len(),
            "workflow execution started"
        );

        // Unsettled incoming edges per node; parallel edges count individually.
        let mut remaining: HashMap<String, usize> = model
            .node_ids()
            .iter()
            .map(|id| (id.clone(), model.incoming_edge_count(id)))
            .collect();
        // Nodes with at least one traversed incoming edge. Roots are seeded.
        let mut triggered: HashSet<String> = roots.iter().cloned().collect();
        // Guard against scheduling (or skipping) the same node twice.
        let mut enqueued: HashSet<String> = roots.iter().cloned().collect();
        let mut ready: VecDeque<String> = roots.into_iter().collect();

        let mut results = ResultMap::new();
        let mut success_count = 0usize;
        let mut error_count = 0usize;

        while let Some(node_id) = ready.pop_front() {
            // Queue entries always originate from the model.
            let Some(node) = model.node(&node_id) else {
                continue;
            };

            let config = TaskConfig {
                task_type: node.kind.clone(),
                node_id: node.id.clone(),
                parameters: node.parameters.clone(),
                api_key: options.completion_api_key.clone(),
            };
            let mut result = self.executor.execute(&config, &results).await;
            result.metadata.execution_id = Some(run.execution_id.clone());

            let outcome = result.outcome();
            if result.success {
                success_count += 1;
            } else {
                error_count += 1;
            }
            info!(
                execution_id = %run.execution_id,
                node_id = %node_id,
                outcome = outcome.as_str(),
                "node finished"
            );

            if let Err(e) = self
                .store
                .create_node_result(&run.execution_id, &node_id, &result)
                .await
            {
                warn!(error = %e, node_id = %node_id, "failed to persist node result; continuing");
            }
            results.insert(node_id.clone(), result);

            let progress = RunPatch {
                nodes_executed: Some(results.len()),
                success_count: Some(success_count),
                error_count: Some(error_count),
                ..Default::default()
            };
            if let Err(e) = self.store.update_run(&run.execution_id, progress).await {
                warn!(error = %e, execution_id = %run.execution_id, "failed to persist run progress; continuing");
            }

            // Settle outgoing edges; unreachable targets cascade dead edges.
            let mut worklist: VecDeque<(String, bool)> = model
                .outgoing_edges(&node_id)
                .into_iter()
                .map(|edge| {
                    let traversed = edge.condition.is_traversable(outcome);
                    debug!(
                        edge_id = %edge.id,
                        target = %edge.target,
                        condition = edge.condition.as_str(),
                        traversed,
                        "edge evaluated"
                    );
                    (edge.target.clone(), traversed)
                })
                .collect();

            while let Some((target, traversed)) = worklist.pop_front() {
                if traversed {
                    triggered.insert(target.clone());
                }
                let Some(count) = remaining.get_mut(&target) else {
                    continue;
                };
                *count = count.saturating_sub(1);
                if *count > 0 || enqueued.contains(&target) {
                    continue;
                }
                enqueued.insert(target.clone());
                if triggered.contains(&target) {
                    ready.push_back(target);
                } else {
                    debug!(node_id = %target, "node unreachable; no incoming edge traversed");
                    for edge in model.outgoing_edges(&target) {
                        worklist.push_back((edge.target.clone(), false));
                    }
                }
            }
        }

        run.nodes_executed = results.len();
        run.success_count = success_count;
        run.error_count = error_count;
        run.status = if error_count == 0 {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithErrors
        };
        run.end_time = Some(Utc::now());

        let final_patch = RunPatch {
            status: Some(run.status),
            end_time: run.end_time,
            nodes_executed: Some(run.nodes_executed),
            success_count: Some(run.success_count),
            error_count: Some(run.error_count),
            ..Default::default()
        };
        if let Err(e) = self.store.update_run(&run.execution_id, final_patch).await {
            warn!(error = %e, execution_id = %run.execution_id, "failed to persist final run record");
        }
        info!(
            execution_id = %run.execution_id,
            status = run.status.as_str(),
            nodes_executed = run.nodes_executed,
            total_nodes = run.total_nodes,
            "workflow execution finished"
        );

        Ok(ExecutionReport { run, results })
    }

    /// Finalize a run that could not be scheduled at all.
    async fn fail_run(
        &self,
        workflow_id: String,
        user_id: String,
        total_nodes: usize,
        error: String,
    ) -> ExecutionReport {
        let mut run = ExecutionRun::new(workflow_id, user_id, total_nodes);
        run.status = RunStatus::Failed;
        run.error = Some(error.clone());
        run.end_time = Some(Utc::now());
        warn!(execution_id = %run.execution_id, error = %error, "workflow could not run");
        if let Err(e) = self.store.create_run(&run).await {
            warn!(error = %e, execution_id = %run.execution_id, "failed to persist failed run record");
        }
        ExecutionReport {
            run,
            results: ResultMap::new(),
        }
    }
}
