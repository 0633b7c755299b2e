use std::collections::{HashMap, HashSet};

use boothflow_config::{NodeDef, WorkflowDef};
use tracing::{debug, warn};

use crate::error::{WorkflowError, WorkflowWarning};
use crate::graph::Graph;

/// A validated workflow ready for execution.
///
/// Built once from a [`WorkflowDef`] and never mutated afterwards, so a
/// run always sees the same graph it started with.
#[derive(Debug, Clone)]
pub struct Workflow {
  def: WorkflowDef,
  start_node_id: String,
  node_index: HashMap<String, usize>,
  graph: Graph,
  warnings: Vec<WorkflowWarning>,
}

impl Workflow {
  /// Validate a definition and build the workflow.
  ///
  /// Fails on an empty node set, duplicate node ids, edges that reference
  /// unknown nodes, or an explicit start node that does not exist.
  pub fn load(def: WorkflowDef) -> Result<Self, WorkflowError> {
    if def.nodes.is_empty() {
      return Err(WorkflowError::EmptyWorkflow {
        workflow_id: def.workflow_id.clone(),
      });
    }

    let mut node_index = HashMap::with_capacity(def.nodes.len());
    for (idx, node) in def.nodes.iter().enumerate() {
      if node_index.insert(node.node_id.clone(), idx).is_some() {
        return Err(WorkflowError::DuplicateNodeId {
          node_id: node.node_id.clone(),
        });
      }
    }

    for edge in &def.edges {
      if !node_index.contains_key(&edge.source_node_id)
        || !node_index.contains_key(&edge.target_node_id)
      {
        return Err(WorkflowError::InvalidEdge {
          from: edge.source_node_id.clone(),
          to: edge.target_node_id.clone(),
        });
      }
    }

    let mut warnings = Vec::new();

    let start_node_id = match &def.start_node_id {
      Some(id) if node_index.contains_key(id) => id.clone(),
      Some(id) => {
        return Err(WorkflowError::UnknownStartNode {
          node_id: id.clone(),
        });
      }
      None => {
        // nodes is non-empty, checked above
        let first = def.nodes[0].node_id.clone();
        debug!(
          workflow_id = %def.workflow_id,
          node_id = %first,
          "no explicit start node, using first node"
        );
        warnings.push(WorkflowWarning::ImplicitStartNode {
          node_id: first.clone(),
        });
        first
      }
    };

    let graph = Graph::new(&def.nodes, &def.edges);

    let mut workflow = Self {
      def,
      start_node_id,
      node_index,
      graph,
      warnings,
    };
    let lint = workflow.lint_edges();
    workflow.warnings.extend(lint);

    for warning in &workflow.warnings {
      if !matches!(warning, WorkflowWarning::ImplicitStartNode { .. }) {
        warn!(workflow_id = %workflow.def.workflow_id, "{}", warning);
      }
    }

    Ok(workflow)
  }

  fn lint_edges(&self) -> Vec<WorkflowWarning> {
    let mut warnings = Vec::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    for edge in &self.def.edges {
      let key = (
        edge.source_node_id.as_str(),
        edge.source_outcome_id.as_str(),
      );
      if !seen.insert(key) {
        warnings.push(WorkflowWarning::DuplicateTransition {
          node_id: edge.source_node_id.clone(),
          outcome_id: edge.source_outcome_id.clone(),
        });
      }

      if let Some(source) = self.node(&edge.source_node_id)
        && !source.declares_outcome(&edge.source_outcome_id)
        && edge.source_outcome_id != boothflow_config::DEFAULT_OUTCOME
      {
        warnings.push(WorkflowWarning::UndeclaredOutcome {
          node_id: edge.source_node_id.clone(),
          outcome_id: edge.source_outcome_id.clone(),
        });
      }
    }

    let reachable = self.graph.reachable_from(&self.start_node_id);
    for node in &self.def.nodes {
      if !reachable.contains(&node.node_id) {
        warnings.push(WorkflowWarning::UnreachableNode {
          node_id: node.node_id.clone(),
        });
      }
    }

    warnings
  }

  pub fn workflow_id(&self) -> &str {
    &self.def.workflow_id
  }

  pub fn name(&self) -> &str {
    &self.def.name
  }

  pub fn description(&self) -> Option<&str> {
    self.def.description.as_deref()
  }

  pub fn category(&self) -> Option<&str> {
    self.def.category.as_deref()
  }

  pub fn version(&self) -> u32 {
    self.def.version
  }

  /// The node a run starts at.
  pub fn start_node_id(&self) -> &str {
    &self.start_node_id
  }

  /// Get a node by ID.
  pub fn node(&self, node_id: &str) -> Option<&NodeDef> {
    self.node_index.get(node_id).map(|&idx| &self.def.nodes[idx])
  }

  pub fn contains_node(&self, node_id: &str) -> bool {
    self.node_index.contains_key(node_id)
  }

  /// Nodes in definition order.
  pub fn nodes_in_order(&self) -> &[NodeDef] {
    &self.def.nodes
  }

  pub fn edges(&self) -> &[boothflow_config::EdgeDef] {
    &self.def.edges
  }

  pub fn graph(&self) -> &Graph {
    &self.graph
  }

  /// Non-fatal findings collected while loading.
  pub fn lint(&self) -> &[WorkflowWarning] {
    &self.warnings
  }

  /// The definition this workflow was built from.
  pub fn definition(&self) -> &WorkflowDef {
    &self.def
  }
}

impl TryFrom<WorkflowDef> for Workflow {
  type Error = WorkflowError;

  fn try_from(def: WorkflowDef) -> Result<Self, Self::Error> {
    Workflow::load(def)
  }
}
