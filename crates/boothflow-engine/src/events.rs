//! Engine events and the listener list.
//!
//! Every state change emits one [`EngineEvent`] carrying a snapshot of the
//! session. Listeners are plain callbacks invoked synchronously, in
//! registration order, after the state has been updated.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::session::SessionState;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
  /// A node became the current node and is awaiting an outcome.
  StepEntered,
  /// The run reached a terminal node.
  WorkflowCompleted,
  /// A step reported an outcome the graph cannot route.
  StepError,
  /// Any other change, e.g. a reset.
  StateChanged,
}

/// Envelope delivered to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineEvent {
  #[serde(rename = "type")]
  pub kind: EventKind,
  pub workflow_id: String,
  pub state: SessionState,
}

impl EngineEvent {
  /// The node the session is at when the event fired.
  pub fn node_id(&self) -> Option<&str> {
    self.state.current_node_id.as_deref()
  }
}

/// Handle returned by [`Engine::on`](crate::Engine::on).
///
/// Pass it to [`Engine::unsubscribe`](crate::Engine::unsubscribe) to stop
/// receiving events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(&EngineEvent) + Send>;

#[derive(Default)]
pub(crate) struct Listeners {
  next_id: u64,
  entries: Vec<(Subscription, Listener)>,
}

impl Listeners {
  pub(crate) fn add(&mut self, listener: Listener) -> Subscription {
    let subscription = Subscription(self.next_id);
    self.next_id += 1;
    self.entries.push((subscription, listener));
    subscription
  }

  pub(crate) fn remove(&mut self, subscription: Subscription) -> bool {
    let before = self.entries.len();
    self.entries.retain(|(id, _)| *id != subscription);
    self.entries.len() != before
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  /// Deliver `event` to every listener.
  ///
  /// A panicking listener is logged and skipped; the remaining listeners
  /// still receive the event.
  pub(crate) fn notify(&mut self, event: &EngineEvent) {
    for (subscription, listener) in self.entries.iter_mut() {
      let result = panic::catch_unwind(AssertUnwindSafe(|| listener(event)));
      if let Err(payload) = result {
        error!(
          subscription = subscription.0,
          event = ?event.kind,
          panic = %panic_message(payload.as_ref()),
          "engine listener panicked"
        );
      }
    }
  }
}

impl fmt::Debug for Listeners {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Listeners")
      .field("count", &self.entries.len())
      .finish()
  }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}
