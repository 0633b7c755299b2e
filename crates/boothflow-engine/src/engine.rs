//! The booth workflow engine.
//!
//! [`Engine`] owns one session and walks the workflow graph one step at a
//! time. It never blocks and never performs I/O.

use std::sync::Arc;

use boothflow_config::WorkflowDef;
use boothflow_workflow::{NodeDef, Resolution, Workflow, WorkflowError, resolve};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::events::{EngineEvent, EventKind, Listeners, Subscription};
use crate::session::{SessionState, SessionStatus, StepData, StepFailure};

/// Drives a single session through a workflow.
///
/// Operations on the wrong status are no-ops rather than errors: UI races
/// (double taps, effects firing twice) are expected and must not crash a
/// kiosk. Use independent engines for independent stations.
#[derive(Debug)]
pub struct Engine {
  workflow: Arc<Workflow>,
  state: SessionState,
  listeners: Listeners,
}

impl Engine {
  /// Validate a definition and create an idle engine for it.
  pub fn new(def: WorkflowDef) -> Result<Self, WorkflowError> {
    Ok(Self::from_workflow(Workflow::load(def)?))
  }

  /// Create an idle engine for an already validated workflow.
  pub fn from_workflow(workflow: impl Into<Arc<Workflow>>) -> Self {
    Self {
      workflow: workflow.into(),
      state: SessionState::default(),
      listeners: Listeners::default(),
    }
  }

  /// Start a run at the workflow's start node.
  ///
  /// Allowed from `idle`, `completed` and `error`. Calling it while a run is
  /// in progress returns the current state unchanged.
  pub fn start(&mut self) -> &SessionState {
    if self.state.is_running() {
      debug!(
        workflow_id = %self.workflow.workflow_id(),
        "start ignored, run already in progress"
      );
      return &self.state;
    }

    let start_node_id = self.workflow.start_node_id();
    self.state.initialize(start_node_id, Utc::now());

    info!(
      workflow_id = %self.workflow.workflow_id(),
      node_id = %start_node_id,
      "workflow_started"
    );

    self.emit(EventKind::StepEntered);
    &self.state
  }

  /// Report the outcome of the current step.
  ///
  /// Resolves the next node, records the step in history and merges `data`
  /// into the collected data. Reaching a terminal node completes the run.
  /// An outcome that cannot be routed from a node that does have outgoing
  /// edges puts the session in `error` without advancing it. A declared
  /// outcome without an edge of its own falls back to the `"default"` exit.
  ///
  /// Ignored unless a run is in progress.
  pub fn complete_step(&mut self, outcome_id: &str, data: StepData) -> &SessionState {
    if !self.state.is_running() {
      debug!(
        workflow_id = %self.workflow.workflow_id(),
        outcome_id = %outcome_id,
        status = ?self.state.status,
        "complete_step ignored, no run in progress"
      );
      return &self.state;
    }

    let Some(current) = self.state.current_node_id.clone() else {
      return &self.state;
    };

    let node = self.workflow.node(&current);
    let kind = node
      .and_then(|node| node.output(outcome_id))
      .map(|output| output.kind);
    let declared = node.is_some_and(|node| node.declares_outcome(outcome_id));

    // The default fallback only covers outcomes the step declares. An
    // undeclared outcome with no edge of its own is unroutable.
    let resolution = match resolve(&self.workflow, &current, outcome_id) {
      Resolution::Matched {
        via_default: true, ..
      } if !declared => Resolution::NotFound,
      resolution => resolution,
    };

    match resolution {
      Resolution::Matched {
        target_node_id,
        via_default,
      } => {
        let target = target_node_id.to_string();
        if via_default {
          debug!(
            workflow_id = %self.workflow.workflow_id(),
            node_id = %current,
            outcome_id = %outcome_id,
            "no edge for outcome, took default exit"
          );
        }

        self
          .state
          .apply_transition(Some(&target), outcome_id, kind, data, Utc::now());

        info!(
          workflow_id = %self.workflow.workflow_id(),
          from = %current,
          node_id = %target,
          outcome_id = %outcome_id,
          "step_entered"
        );

        if self.workflow.graph().is_terminal(&target) {
          self.finish();
        } else {
          self.emit(EventKind::StepEntered);
        }
      }
      Resolution::NotFound if self.workflow.graph().is_terminal(&current) => {
        self
          .state
          .apply_transition(None, outcome_id, kind, data, Utc::now());
        self.finish();
      }
      Resolution::NotFound => {
        let failure = StepFailure {
          message: format!(
            "no transition from '{}' for outcome '{}' and no default exit",
            current, outcome_id
          ),
          node_id: current,
          outcome_id: outcome_id.to_string(),
        };

        warn!(
          workflow_id = %self.workflow.workflow_id(),
          node_id = %failure.node_id,
          outcome_id = %outcome_id,
          "step_error"
        );

        self.state.fail(failure);
        self.emit(EventKind::StepError);
      }
    }

    &self.state
  }

  /// Abandon the current run and return to `idle`.
  ///
  /// Always allowed. The workflow is kept.
  pub fn reset(&mut self) -> &SessionState {
    debug!(
      workflow_id = %self.workflow.workflow_id(),
      status = ?self.state.status,
      "session reset"
    );
    self.state.clear();
    self.emit(EventKind::StateChanged);
    &self.state
  }

  pub fn state(&self) -> &SessionState {
    &self.state
  }

  pub fn status(&self) -> SessionStatus {
    self.state.status
  }

  /// The node awaiting an outcome, or the terminal node after completion.
  pub fn current_node(&self) -> Option<&NodeDef> {
    self
      .state
      .current_node_id
      .as_deref()
      .and_then(|id| self.workflow.node(id))
  }

  pub fn workflow(&self) -> &Arc<Workflow> {
    &self.workflow
  }

  /// Register a listener for every state change.
  pub fn on<F>(&mut self, listener: F) -> Subscription
  where
    F: FnMut(&EngineEvent) + Send + 'static,
  {
    self.listeners.add(Box::new(listener))
  }

  /// Remove a listener. Returns `false` if it was already removed.
  pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
    self.listeners.remove(subscription)
  }

  pub fn listener_count(&self) -> usize {
    self.listeners.len()
  }

  fn finish(&mut self) {
    self.state.complete();
    info!(
      workflow_id = %self.workflow.workflow_id(),
      node_id = ?self.state.current_node_id,
      steps = self.state.history.len(),
      "workflow_completed"
    );
    self.emit(EventKind::WorkflowCompleted);
  }

  fn emit(&mut self, kind: EventKind) {
    let event = EngineEvent {
      kind,
      workflow_id: self.workflow.workflow_id().to_string(),
      state: self.state.clone(),
    };
    self.listeners.notify(&event);
  }
}
