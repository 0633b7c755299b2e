//! Built-in renderers.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::RenderError;
use crate::renderer::{StepContext, StepOutcome, StepRenderer};

/// Completes every step with the `"default"` outcome after an optional dwell.
///
/// Useful for attract loops, smoke tests and step types that need no input.
#[derive(Debug, Clone, Default)]
pub struct PassthroughRenderer {
  dwell: Duration,
}

impl PassthroughRenderer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_dwell(dwell: Duration) -> Self {
    Self { dwell }
  }
}

#[async_trait]
impl StepRenderer for PassthroughRenderer {
  async fn render(&self, step: StepContext) -> Result<StepOutcome, RenderError> {
    if !self.dwell.is_zero() {
      tokio::time::sleep(self.dwell).await;
    }
    debug!(node_id = %step.node.node_id, "passthrough step");
    Ok(StepOutcome::default_exit())
  }
}

/// Replays a fixed queue of outcomes, one per rendered step.
///
/// Records every node it was asked to render.
#[derive(Debug, Default)]
pub struct ScriptedRenderer {
  script: Mutex<VecDeque<StepOutcome>>,
  rendered: Mutex<Vec<String>>,
  repeat_default: bool,
}

impl ScriptedRenderer {
  pub fn new(script: impl IntoIterator<Item = StepOutcome>) -> Self {
    Self {
      script: Mutex::new(script.into_iter().collect()),
      rendered: Mutex::new(Vec::new()),
      repeat_default: false,
    }
  }

  /// Script made only of outcome ids with no data.
  pub fn from_outcomes<I, S>(outcomes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::new(outcomes.into_iter().map(StepOutcome::new))
  }

  /// Answer `"default"` once the script is used up instead of failing.
  pub fn then_default(mut self) -> Self {
    self.repeat_default = true;
    self
  }

  /// Node ids rendered so far, in order.
  pub fn rendered(&self) -> Vec<String> {
    self
      .rendered
      .lock()
      .map(|r| r.clone())
      .unwrap_or_default()
  }

  pub fn remaining(&self) -> usize {
    self.script.lock().map(|s| s.len()).unwrap_or(0)
  }
}

#[async_trait]
impl StepRenderer for ScriptedRenderer {
  async fn render(&self, step: StepContext) -> Result<StepOutcome, RenderError> {
    let node_id = step.node.node_id;
    if let Ok(mut rendered) = self.rendered.lock() {
      rendered.push(node_id.clone());
    }

    let next = self
      .script
      .lock()
      .map_err(|_| RenderError::failed(&node_id, "script lock poisoned"))?
      .pop_front();

    match next {
      Some(outcome) => Ok(outcome),
      None if self.repeat_default => Ok(StepOutcome::default_exit()),
      None => Err(RenderError::ScriptExhausted { node_id }),
    }
  }
}
