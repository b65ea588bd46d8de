//! Workflow graph: node/edge types, the immutable per-run model, and the
//! edge-condition routing rule.

mod condition;
mod model;
mod types;

pub use condition::{EdgeCondition, Outcome};
pub use model::GraphModel;
pub use types::{NodeParameters, TaskEdge, TaskNode};
