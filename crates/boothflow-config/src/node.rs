use serde::{Deserialize, Serialize};

use crate::DEFAULT_OUTCOME;
use crate::step::StepType;

/// Opaque step configuration, interpreted only by the step renderer.
pub type StepConfig = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDef {
  pub node_id: String,
  pub step_type: StepType,
  #[serde(default)]
  pub label: String,
  #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
  pub config: StepConfig,
  #[serde(default)]
  pub outputs: Vec<NodeOutput>,
}

impl NodeDef {
  /// Create a node with no config and no declared outputs.
  pub fn new(node_id: impl Into<String>, step_type: StepType) -> Self {
    let node_id = node_id.into();
    Self {
      label: node_id.clone(),
      node_id,
      step_type,
      config: StepConfig::new(),
      outputs: Vec::new(),
    }
  }

  /// Add a declared output.
  pub fn with_output(mut self, output: NodeOutput) -> Self {
    self.outputs.push(output);
    self
  }

  /// Outcome ids this step can produce.
  ///
  /// A step without declared outputs produces exactly one implicit
  /// outcome, `"default"`.
  pub fn outcome_ids(&self) -> Vec<&str> {
    if self.outputs.is_empty() {
      return vec![DEFAULT_OUTCOME];
    }
    self.outputs.iter().map(|o| o.outcome_id.as_str()).collect()
  }

  /// Look up a declared output by outcome id.
  pub fn output(&self, outcome_id: &str) -> Option<&NodeOutput> {
    self.outputs.iter().find(|o| o.outcome_id == outcome_id)
  }

  /// Whether `outcome_id` is declared (or implied) by this node.
  pub fn declares_outcome(&self, outcome_id: &str) -> bool {
    self.outcome_ids().contains(&outcome_id)
  }
}

/// A labelled exit a rendered step may produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutput {
  pub outcome_id: String,
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub kind: OutputKind,
}

impl NodeOutput {
  pub fn new(outcome_id: impl Into<String>, kind: OutputKind) -> Self {
    let outcome_id = outcome_id.into();
    Self {
      label: outcome_id.clone(),
      outcome_id,
      kind,
    }
  }

  /// The implicit `"default"` exit.
  pub fn default_exit() -> Self {
    Self::new(DEFAULT_OUTCOME, OutputKind::Default)
  }
}

/// Styling hint for an output. Carries no engine semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
  #[default]
  Default,
  Conditional,
  Retake,
  Skip,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_outcome_ids_default_when_no_outputs() {
    let node = NodeDef::new("start", StepType::Idle);
    assert_eq!(node.outcome_ids(), vec!["default"]);
    assert!(node.declares_outcome("default"));
    assert!(!node.declares_outcome("retake"));
  }

  #[test]
  fn test_outcome_ids_declared() {
    let node = NodeDef::new("review", StepType::Selection)
      .with_output(NodeOutput::new("accept", OutputKind::Default))
      .with_output(NodeOutput::new("retake", OutputKind::Retake));

    assert_eq!(node.outcome_ids(), vec!["accept", "retake"]);
    assert!(!node.declares_outcome("default"));
    assert_eq!(node.output("retake").unwrap().kind, OutputKind::Retake);
  }

  #[test]
  fn test_deserialize_node_camel_case() {
    let node: NodeDef = serde_json::from_value(json!({
      "nodeId": "countdown",
      "stepType": "countdown",
      "label": "Get ready",
      "config": { "seconds": 3 },
      "outputs": [{ "outcomeId": "default", "label": "Done", "kind": "default" }]
    }))
    .unwrap();

    assert_eq!(node.node_id, "countdown");
    assert_eq!(node.step_type, StepType::Countdown);
    assert_eq!(node.config["seconds"], 3);
    assert_eq!(node.outputs[0].kind, OutputKind::Default);
  }

  #[test]
  fn test_deserialize_node_minimal() {
    let node: NodeDef = serde_json::from_value(json!({
      "nodeId": "done",
      "stepType": "share"
    }))
    .unwrap();

    assert_eq!(node.step_type, StepType::Result);
    assert!(node.outputs.is_empty());
    assert!(node.config.is_empty());
  }
}
