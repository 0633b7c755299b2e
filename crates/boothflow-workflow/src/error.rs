use thiserror::Error;

/// Structural problems that make a definition unusable.
///
/// These are raised while loading a definition. No partially-built
/// workflow is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
  #[error("workflow '{workflow_id}' has no nodes")]
  EmptyWorkflow { workflow_id: String },

  #[error("duplicate node id: {node_id}")]
  DuplicateNodeId { node_id: String },

  #[error("edge references unknown node: from={from}, to={to}")]
  InvalidEdge { from: String, to: String },

  #[error("start node not found: {node_id}")]
  UnknownStartNode { node_id: String },
}

/// Non-fatal findings about a definition.
///
/// Workflows with warnings still load and run. Authoring tools surface
/// these to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowWarning {
  /// More than one edge leaves `node_id` through `outcome_id`; the first wins.
  #[error("duplicate transition from '{node_id}' on '{outcome_id}' (first edge wins)")]
  DuplicateTransition { node_id: String, outcome_id: String },

  /// An edge leaves through an outcome the node does not declare.
  #[error("edge from '{node_id}' uses outcome '{outcome_id}' which the node does not declare")]
  UndeclaredOutcome { node_id: String, outcome_id: String },

  /// The node cannot be reached from the start node.
  #[error("node '{node_id}' is unreachable from the start node")]
  UnreachableNode { node_id: String },

  /// No explicit start node; the first listed node is used.
  #[error("no startNodeId set, using first node '{node_id}'")]
  ImplicitStartNode { node_id: String },
}
