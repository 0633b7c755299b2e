//! Runner error types.

use boothflow_config::StepType;
use boothflow_store::StoreError;
use boothflow_workflow::WorkflowError;

/// Errors a step renderer can report instead of an outcome.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
  /// The step could not be shown or its hardware failed.
  #[error("step '{node_id}' failed: {message}")]
  Failed { node_id: String, message: String },

  /// A scripted renderer ran out of outcomes.
  #[error("no scripted outcome left for step '{node_id}'")]
  ScriptExhausted { node_id: String },
}

impl RenderError {
  pub fn failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Failed {
      node_id: node_id.into(),
      message: message.into(),
    }
  }
}

/// Errors that can occur while hosting a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
  /// Run was cancelled.
  #[error("run cancelled")]
  Cancelled,

  /// No renderer registered for the step type and no fallback.
  #[error("no renderer registered for step type '{step_type}'")]
  NoRenderer { step_type: StepType },

  #[error("render failed: {0}")]
  Render(#[from] RenderError),

  #[error("invalid workflow: {0}")]
  Workflow(#[from] WorkflowError),

  #[error("store error: {0}")]
  Store(#[from] StoreError),
}
