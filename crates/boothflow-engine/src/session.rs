//! Session state for a single run.
//!
//! The engine is the only writer. Hosts read snapshots through
//! [`Engine::state`](crate::Engine::state) or the state attached to every
//! event.

use boothflow_config::OutputKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Data a step reports when it completes, shallow-merged into the session.
pub type StepData = serde_json::Map<String, serde_json::Value>;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  #[default]
  Idle,
  Running,
  Completed,
  Error,
}

/// One completed step, appended on every successful `complete_step`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  pub node_id: String,
  pub outcome_id: String,
  /// Kind of the declared output, when the node declares this outcome.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kind: Option<OutputKind>,
  /// Node the session moved to. `None` when a terminal node completed.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub next_node_id: Option<String>,
  pub data_at_step: StepData,
  pub timestamp: DateTime<Utc>,
}

/// Why a session entered the `error` status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFailure {
  pub node_id: String,
  pub outcome_id: String,
  pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
  pub status: SessionStatus,
  pub current_node_id: Option<String>,
  pub history: Vec<HistoryEntry>,
  pub collected_data: StepData,
  pub error: Option<StepFailure>,
  pub started_at: Option<DateTime<Utc>>,
}

impl SessionState {
  /// Begin a fresh run at `start_node_id`.
  pub(crate) fn initialize(&mut self, start_node_id: &str, now: DateTime<Utc>) {
    *self = SessionState {
      status: SessionStatus::Running,
      current_node_id: Some(start_node_id.to_string()),
      started_at: Some(now),
      ..SessionState::default()
    };
  }

  /// Record a completed step and move to `next_node_id`, if any.
  ///
  /// Appends exactly one history entry. `data` is shallow-merged into the
  /// collected data; existing keys are overwritten, never removed.
  pub(crate) fn apply_transition(
    &mut self,
    next_node_id: Option<&str>,
    outcome_id: &str,
    kind: Option<OutputKind>,
    data: StepData,
    now: DateTime<Utc>,
  ) {
    let node_id = self.current_node_id.clone().unwrap_or_default();

    for (key, value) in &data {
      self.collected_data.insert(key.clone(), value.clone());
    }

    self.history.push(HistoryEntry {
      node_id,
      outcome_id: outcome_id.to_string(),
      kind,
      next_node_id: next_node_id.map(str::to_string),
      data_at_step: data,
      timestamp: now,
    });

    if let Some(next) = next_node_id {
      self.current_node_id = Some(next.to_string());
    }
  }

  pub(crate) fn complete(&mut self) {
    self.status = SessionStatus::Completed;
  }

  pub(crate) fn fail(&mut self, failure: StepFailure) {
    self.status = SessionStatus::Error;
    self.error = Some(failure);
  }

  /// Return to `idle`, dropping everything recorded for the run.
  pub(crate) fn clear(&mut self) {
    *self = SessionState::default();
  }

  pub fn is_running(&self) -> bool {
    self.status == SessionStatus::Running
  }

  /// Whether the run has ended, successfully or not.
  pub fn is_finished(&self) -> bool {
    matches!(
      self.status,
      SessionStatus::Completed | SessionStatus::Error
    )
  }

  /// Node ids in the order the session entered them.
  pub fn visited_node_ids(&self) -> Vec<&str> {
    let Some(first) = self.history.first() else {
      return self.current_node_id.as_deref().into_iter().collect();
    };

    std::iter::once(first.node_id.as_str())
      .chain(self.history.iter().filter_map(|e| e.next_node_id.as_deref()))
      .collect()
  }

  pub fn last_entry(&self) -> Option<&HistoryEntry> {
    self.history.last()
  }

  /// Snapshot as JSON, e.g. for analytics upload or debugging output.
  pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn data(value: serde_json::Value) -> StepData {
    value.as_object().cloned().unwrap_or_default()
  }

  #[test]
  fn test_initialize_resets_run() {
    let mut state = SessionState::default();
    state.collected_data.insert("old".into(), json!(1));
    state.fail(StepFailure {
      node_id: "a".into(),
      outcome_id: "x".into(),
      message: "boom".into(),
    });

    state.initialize("start", Utc::now());

    assert_eq!(state.status, SessionStatus::Running);
    assert_eq!(state.current_node_id.as_deref(), Some("start"));
    assert!(state.collected_data.is_empty());
    assert!(state.error.is_none());
    assert!(state.started_at.is_some());
  }

  #[test]
  fn test_apply_transition_merges_shallowly() {
    let mut state = SessionState::default();
    state.initialize("a", Utc::now());

    state.apply_transition(
      Some("b"),
      "default",
      None,
      data(json!({"photo": "one", "filter": "mono"})),
      Utc::now(),
    );
    state.apply_transition(
      Some("c"),
      "default",
      Some(OutputKind::Retake),
      data(json!({"photo": "two"})),
      Utc::now(),
    );

    assert_eq!(state.history.len(), 2);
    assert_eq!(state.collected_data["photo"], "two");
    assert_eq!(state.collected_data["filter"], "mono");
    assert_eq!(state.history[0].data_at_step["photo"], "one");
    assert_eq!(state.history[1].node_id, "b");
    assert_eq!(state.history[1].kind, Some(OutputKind::Retake));
    assert_eq!(state.current_node_id.as_deref(), Some("c"));
  }

  #[test]
  fn test_apply_transition_without_next_keeps_node() {
    let mut state = SessionState::default();
    state.initialize("end", Utc::now());

    state.apply_transition(None, "default", None, StepData::new(), Utc::now());

    assert_eq!(state.current_node_id.as_deref(), Some("end"));
    assert_eq!(state.history[0].next_node_id, None);
  }

  #[test]
  fn test_visited_node_ids() {
    let mut state = SessionState::default();
    state.initialize("a", Utc::now());
    state.apply_transition(Some("b"), "default", None, StepData::new(), Utc::now());
    state.apply_transition(Some("a"), "retake", None, StepData::new(), Utc::now());

    assert_eq!(state.visited_node_ids(), vec!["a", "b", "a"]);
  }

  #[test]
  fn test_visited_node_ids_self_loop() {
    let mut state = SessionState::default();
    state.initialize("a", Utc::now());
    assert_eq!(state.visited_node_ids(), vec!["a"]);

    state.apply_transition(Some("a"), "retake", None, StepData::new(), Utc::now());
    assert_eq!(state.visited_node_ids(), vec!["a", "a"]);
  }

  #[test]
  fn test_last_entry_tracks_latest_step() {
    let mut state = SessionState::default();
    state.initialize("countdown", Utc::now());
    assert!(state.last_entry().is_none());

    state.apply_transition(Some("capture"), "default", None, StepData::new(), Utc::now());
    state.apply_transition(
      Some("share"),
      "accept",
      Some(OutputKind::Default),
      data(json!({"photo": "x"})),
      Utc::now(),
    );

    let last = state.last_entry().unwrap();
    assert_eq!(last.node_id, "capture");
    assert_eq!(last.outcome_id, "accept");
    assert_eq!(last.next_node_id.as_deref(), Some("share"));
    assert_eq!(last.data_at_step["photo"], "x");
  }

  #[test]
  fn test_to_json_uses_camel_case() {
    let mut state = SessionState::default();
    state.initialize("start", Utc::now());

    let value = state.to_json().unwrap();
    assert_eq!(value["status"], "running");
    assert_eq!(value["currentNodeId"], "start");
    assert!(value["collectedData"].as_object().unwrap().is_empty());
  }
}
