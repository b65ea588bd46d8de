use serde::{Deserialize, Serialize};

use super::condition::EdgeCondition;

/// A unit of work in the workflow graph.
///
/// Nodes come from the graph editor and are read-only for the duration of a
/// run; the engine never writes topology back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNode {
    /// Node ID, unique within the workflow.
    pub id: String,

    /// Task type, e.g. `"aiTask"` (serialized as `type`).
    #[serde(rename = "type")]
    pub kind: String,

    /// Task parameters configured in the editor.
    #[serde(default)]
    pub parameters: NodeParameters,
}

/// Parameters of a task node, camelCase on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeParameters {
    #[serde(default)]
    pub prompt: String,

    /// Model identifier; falls back to the engine default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// When set, outputs of all successful upstream nodes are prepended to
    /// the prompt as labeled context blocks.
    #[serde(default)]
    pub inject_context: bool,
}

/// A directed, condition-labeled connection between two nodes.
///
/// Multiple outgoing edges from one node are allowed and independently
/// evaluated; a node may fan out to several next nodes at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub condition: EdgeCondition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_deserialize_wire_shape() {
        let json = r#"{
            "id": "1",
            "type": "aiTask",
            "parameters": {"prompt": "Hello", "maxTokens": 256, "temperature": 0.2}
        }"#;
        let node: TaskNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, "1");
        assert_eq!(node.kind, "aiTask");
        assert_eq!(node.parameters.prompt, "Hello");
        assert_eq!(node.parameters.max_tokens, Some(256));
        assert_eq!(node.parameters.temperature, Some(0.2));
        assert!(node.parameters.model.is_none());
        assert!(!node.parameters.inject_context);
    }

    #[test]
    fn test_node_parameters_default() {
        let json = r#"{"id": "n", "type": "aiTask"}"#;
        let node: TaskNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.parameters.prompt, "");
    }

    #[test]
    fn test_edge_condition_defaults_to_always() {
        let json = r#"{"id": "e1", "source": "a", "target": "b"}"#;
        let edge: TaskEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.condition, EdgeCondition::Always);
    }

    #[test]
    fn test_edge_unknown_condition_treated_as_always() {
        let json = r#"{"id": "e1", "source": "a", "target": "b", "condition": "whenever"}"#;
        let edge: TaskEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.condition, EdgeCondition::Always);
    }

    #[test]
    fn test_edge_roundtrip() {
        let json = r#"{"id": "e1", "source": "a", "target": "b", "condition": "error"}"#;
        let edge: TaskEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.condition, EdgeCondition::Error);
        let out = serde_json::to_value(&edge).unwrap();
        assert_eq!(out["condition"], "error");
    }
}
