//! Transition resolution.
//!
//! Maps `(current node, outcome)` to the next node. Resolution is a pure,
//! total function of the workflow: it never errors, it either finds a
//! target or reports [`Resolution::NotFound`].

use boothflow_config::DEFAULT_OUTCOME;

use crate::workflow::Workflow;

/// Result of resolving a step outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
  /// An edge matched. `via_default` is set when the reported outcome had no
  /// edge of its own and the node's `"default"` exit was taken instead.
  Matched {
    target_node_id: &'a str,
    via_default: bool,
  },
  NotFound,
}

impl<'a> Resolution<'a> {
  pub fn target(&self) -> Option<&'a str> {
    match self {
      Resolution::Matched { target_node_id, .. } => Some(*target_node_id),
      Resolution::NotFound => None,
    }
  }
}

/// Resolve the next node for `outcome_id` leaving `current_node_id`.
///
/// The first edge in definition order whose source and outcome match wins.
/// If none matches and the outcome is not `"default"`, one retry is made
/// with `"default"`.
pub fn resolve<'a>(
  workflow: &'a Workflow,
  current_node_id: &str,
  outcome_id: &str,
) -> Resolution<'a> {
  let outgoing = workflow.graph().outgoing(current_node_id);

  let find = move |outcome: &str| {
    outgoing
      .iter()
      .find(|edge| edge.source_outcome_id == outcome)
      .map(|edge| edge.target_node_id.as_str())
  };

  if let Some(target_node_id) = find(outcome_id) {
    return Resolution::Matched {
      target_node_id,
      via_default: false,
    };
  }

  if outcome_id != DEFAULT_OUTCOME
    && let Some(target_node_id) = find(DEFAULT_OUTCOME)
  {
    return Resolution::Matched {
      target_node_id,
      via_default: true,
    };
  }

  Resolution::NotFound
}
