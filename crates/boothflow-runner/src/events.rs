//! Runner events and notifiers for observability.
//!
//! Hosts emit these around the engine's own events so consumers can drive a
//! display, record telemetry or stream to an authoring UI.

use boothflow_engine::{EngineEvent, SessionStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted while hosting runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunnerEvent {
  /// A run has started.
  RunStarted {
    run_id: String,
    run_number: u64,
    workflow_id: String,
  },

  /// An event forwarded from the engine.
  Engine(EngineEvent),

  /// A run has ended.
  RunFinished {
    run_id: String,
    run_number: u64,
    status: SessionStatus,
  },

  /// A run failed and no error step is configured.
  ErrorScreen { run_id: String, message: String },

  /// The kiosk is waiting before the next run.
  Restarting { delay_ms: u64 },

  /// The definition for the kiosk's category could not be loaded.
  DefinitionReloadFailed { category: String, error: String },
}

/// Trait for receiving runner events.
///
/// The runner calls `notify` for each event; implementations decide what to
/// do with them (render, persist, broadcast, ignore).
pub trait RunnerNotifier: Send + Sync {
  fn notify(&self, event: RunnerEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl RunnerNotifier for NoopNotifier {
  fn notify(&self, _event: RunnerEvent) {}
}

/// A notifier that sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so the runner never waits on a slow display. Volume is a
  // handful of events per step.
  sender: mpsc::UnboundedSender<RunnerEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<RunnerEvent>) -> Self {
    Self { sender }
  }

  /// Create a notifier together with its receiving end.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<RunnerEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl RunnerNotifier for ChannelNotifier {
  fn notify(&self, event: RunnerEvent) {
    // Receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
