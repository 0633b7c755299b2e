use std::collections::{HashMap, HashSet, VecDeque};

use boothflow_config::{EdgeDef, NodeDef};

/// Outgoing-transition index for traversal and resolution.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Adjacency list: node_id -> outgoing edges, in definition order.
  outgoing: HashMap<String, Vec<EdgeDef>>,
}

impl Graph {
  /// Build a graph from nodes and edges.
  pub fn new(nodes: &[NodeDef], edges: &[EdgeDef]) -> Self {
    let mut outgoing: HashMap<String, Vec<EdgeDef>> = HashMap::new();

    for node in nodes {
      outgoing.entry(node.node_id.clone()).or_default();
    }

    for edge in edges {
      outgoing
        .entry(edge.source_node_id.clone())
        .or_default()
        .push(edge.clone());
    }

    Self { outgoing }
  }

  /// Outgoing edges of a node, in definition order.
  pub fn outgoing(&self, node_id: &str) -> &[EdgeDef] {
    self
      .outgoing
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Downstream node ids of a node, in definition order.
  pub fn downstream(&self, node_id: &str) -> impl Iterator<Item = &str> {
    self.outgoing(node_id).iter().map(|e| e.target_node_id.as_str())
  }

  /// Check if a node is terminal (has no outgoing edges at all).
  pub fn is_terminal(&self, node_id: &str) -> bool {
    self.outgoing(node_id).is_empty()
  }

  /// Node ids reachable from `start` (including `start`).
  pub fn reachable_from(&self, start: &str) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start.to_string()]);

    while let Some(node_id) = queue.pop_front() {
      if !seen.insert(node_id.clone()) {
        continue;
      }
      for next in self.downstream(&node_id) {
        if !seen.contains(next) {
          queue.push_back(next.to_string());
        }
      }
    }

    seen
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use boothflow_config::StepType;

  fn nodes(ids: &[&str]) -> Vec<NodeDef> {
    ids
      .iter()
      .map(|id| NodeDef::new(*id, StepType::Generic))
      .collect()
  }

  #[test]
  fn test_terminal_nodes() {
    let graph = Graph::new(
      &nodes(&["a", "b", "c"]),
      &[EdgeDef::default_exit("a", "b"), EdgeDef::default_exit("b", "c")],
    );

    assert!(!graph.is_terminal("a"));
    assert!(!graph.is_terminal("b"));
    assert!(graph.is_terminal("c"));
    assert!(graph.is_terminal("missing"));
  }

  #[test]
  fn test_outgoing_preserves_definition_order() {
    let graph = Graph::new(
      &nodes(&["a", "b", "c"]),
      &[
        EdgeDef::new("a", "retake", "a"),
        EdgeDef::default_exit("a", "b"),
        EdgeDef::new("a", "skip", "c"),
      ],
    );

    let targets: Vec<&str> = graph.downstream("a").collect();
    assert_eq!(targets, vec!["a", "b", "c"]);
  }

  #[test]
  fn test_reachable_from_handles_cycles() {
    let graph = Graph::new(
      &nodes(&["a", "b", "c", "orphan"]),
      &[
        EdgeDef::default_exit("a", "b"),
        EdgeDef::new("b", "retake", "a"),
        EdgeDef::default_exit("b", "c"),
      ],
    );

    let reachable = graph.reachable_from("a");
    assert_eq!(reachable.len(), 3);
    assert!(!reachable.contains("orphan"));
  }
}
