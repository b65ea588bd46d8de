use serde::{Deserialize, Deserializer, Serialize};

/// Gate controlling whether an edge is followed after its source finishes.
///
/// Unknown condition strings deserialize to [`EdgeCondition::Always`] to stay
/// permissive toward editors that invent new values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeCondition {
    #[default]
    Always,
    Success,
    Error,
}

impl EdgeCondition {
    pub fn parse(s: &str) -> Self {
        match s {
            "success" => EdgeCondition::Success,
            "error" => EdgeCondition::Error,
            _ => EdgeCondition::Always,
        }
    }

    /// Pure routing rule: `Always` edges are always traversable, otherwise
    /// the condition must match the source node's outcome.
    pub fn is_traversable(self, outcome: Outcome) -> bool {
        match self {
            EdgeCondition::Always => true,
            EdgeCondition::Success => outcome == Outcome::Success,
            EdgeCondition::Error => outcome == Outcome::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeCondition::Always => "always",
            EdgeCondition::Success => "success",
            EdgeCondition::Error => "error",
        }
    }
}

impl<'de> Deserialize<'de> for EdgeCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EdgeCondition::parse(&s))
    }
}

/// How a node finished: the routing outcome fed to edge evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

impl Outcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            Outcome::Success
        } else {
            Outcome::Error
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Error => "error",
        }
    }
}
