//! The step rendering contract.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use boothflow_config::{NodeDef, StepType};
use boothflow_engine::StepData;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RunnerError};

/// Identifiers of the run a step belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
  pub workflow_id: String,
  pub run_id: String,
  /// Monotonic per-host counter, starting at 1.
  pub run_number: u64,
}

/// Everything a renderer needs to show one step.
#[derive(Debug, Clone)]
pub struct StepContext {
  pub node: NodeDef,
  /// Data collected by earlier steps of this run.
  pub collected_data: StepData,
  pub context: RunContext,
}

/// What a step produced once the user or hardware finished with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
  pub outcome_id: String,
  #[serde(default)]
  pub data: StepData,
}

impl StepOutcome {
  pub fn new(outcome_id: impl Into<String>) -> Self {
    Self {
      outcome_id: outcome_id.into(),
      data: StepData::new(),
    }
  }

  /// The `"default"` outcome with no data.
  pub fn default_exit() -> Self {
    Self::new(boothflow_config::DEFAULT_OUTCOME)
  }

  pub fn with_data(mut self, data: StepData) -> Self {
    self.data = data;
    self
  }
}

/// Renders one step type.
///
/// `render` is called once per activation of a node and resolves when the
/// step is finished. Returning a single outcome means a step can complete
/// at most once per activation.
#[async_trait]
pub trait StepRenderer: Send + Sync {
  async fn render(&self, step: StepContext) -> Result<StepOutcome, RenderError>;
}

#[async_trait]
impl<T: StepRenderer + ?Sized> StepRenderer for Arc<T> {
  async fn render(&self, step: StepContext) -> Result<StepOutcome, RenderError> {
    (**self).render(step).await
  }
}

/// Renderers keyed by step type.
#[derive(Clone, Default)]
pub struct RendererRegistry {
  renderers: HashMap<StepType, Arc<dyn StepRenderer>>,
  fallback: Option<Arc<dyn StepRenderer>>,
}

impl RendererRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a renderer for a step type, replacing any previous one.
  pub fn register(&mut self, step_type: StepType, renderer: impl StepRenderer + 'static) {
    self.renderers.insert(step_type, Arc::new(renderer));
  }

  pub fn with(mut self, step_type: StepType, renderer: impl StepRenderer + 'static) -> Self {
    self.register(step_type, renderer);
    self
  }

  /// Renderer used for step types with no registered renderer.
  pub fn with_fallback(mut self, renderer: impl StepRenderer + 'static) -> Self {
    self.fallback = Some(Arc::new(renderer));
    self
  }

  pub fn contains(&self, step_type: &StepType) -> bool {
    self.renderers.contains_key(step_type)
  }

  pub fn get(&self, step_type: &StepType) -> Result<Arc<dyn StepRenderer>, RunnerError> {
    self
      .renderers
      .get(step_type)
      .or(self.fallback.as_ref())
      .cloned()
      .ok_or_else(|| RunnerError::NoRenderer {
        step_type: step_type.clone(),
      })
  }
}

impl fmt::Debug for RendererRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut step_types: Vec<&str> = self.renderers.keys().map(|s| s.as_str()).collect();
    step_types.sort_unstable();
    f.debug_struct("RendererRegistry")
      .field("step_types", &step_types)
      .field("fallback", &self.fallback.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::renderers::PassthroughRenderer;

  #[test]
  fn test_missing_renderer() {
    let registry = RendererRegistry::new().with(StepType::Capture, PassthroughRenderer::new());

    assert!(registry.get(&StepType::Capture).is_ok());
    assert!(matches!(
      registry.get(&StepType::Countdown),
      Err(RunnerError::NoRenderer { step_type }) if step_type == StepType::Countdown
    ));
  }

  #[test]
  fn test_fallback_covers_custom_steps() {
    let registry = RendererRegistry::new().with_fallback(PassthroughRenderer::new());
    assert!(registry.get(&StepType::Custom("gif-burst".into())).is_ok());
    assert!(!registry.contains(&StepType::Custom("gif-burst".into())));
  }
}
