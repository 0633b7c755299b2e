use serde::{Deserialize, Serialize};

use crate::DEFAULT_OUTCOME;

/// A labelled transition from one node's outcome to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDef {
  pub source_node_id: String,
  pub target_node_id: String,
  #[serde(default = "default_outcome")]
  pub source_outcome_id: String,
}

impl EdgeDef {
  /// Edge leaving `from` through `outcome`.
  pub fn new(from: impl Into<String>, outcome: impl Into<String>, to: impl Into<String>) -> Self {
    Self {
      source_node_id: from.into(),
      target_node_id: to.into(),
      source_outcome_id: outcome.into(),
    }
  }

  /// Edge leaving `from` through the default outcome.
  pub fn default_exit(from: impl Into<String>, to: impl Into<String>) -> Self {
    Self::new(from, DEFAULT_OUTCOME, to)
  }
}

fn default_outcome() -> String {
  DEFAULT_OUTCOME.to_string()
}
