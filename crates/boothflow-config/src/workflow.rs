use serde::{Deserialize, Serialize};

use crate::edge::EdgeDef;
use crate::node::NodeDef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDef {
  pub workflow_id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// Logical key a kiosk uses to find its active definition, e.g. "photo-booth".
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(default = "default_version")]
  pub version: u32,
  /// Explicit start node. When absent the first node in `nodes` is used.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_node_id: Option<String>,
  pub nodes: Vec<NodeDef>,
  #[serde(default)]
  pub edges: Vec<EdgeDef>,
}

impl WorkflowDef {
  pub fn new(workflow_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      workflow_id: workflow_id.into(),
      name: name.into(),
      description: None,
      category: None,
      version: default_version(),
      start_node_id: None,
      nodes: Vec::new(),
      edges: Vec::new(),
    }
  }

  pub fn with_node(mut self, node: NodeDef) -> Self {
    self.nodes.push(node);
    self
  }

  pub fn with_edge(mut self, edge: EdgeDef) -> Self {
    self.edges.push(edge);
    self
  }

  pub fn with_start(mut self, node_id: impl Into<String>) -> Self {
    self.start_node_id = Some(node_id.into());
    self
  }

  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = Some(category.into());
    self
  }
}

fn default_version() -> u32 {
  1
}
