//! Authoring preview host.
//!
//! Runs a single session of a definition being edited and stops when it
//! ends. The canvas can either let renderers drive the whole run or click
//! through steps by hand.

use std::sync::Arc;

use boothflow_config::WorkflowDef;
use boothflow_engine::{Engine, SessionState, StepData};
use boothflow_workflow::{Workflow, WorkflowWarning};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::drive::{drive, forward_engine_events};
use crate::error::RunnerError;
use crate::events::{NoopNotifier, RunnerEvent, RunnerNotifier};
use crate::renderer::{RendererRegistry, RunContext};

/// Runs one preview session of a workflow.
pub struct PreviewRunner<N: RunnerNotifier = NoopNotifier> {
  engine: Engine,
  renderers: RendererRegistry,
  notifier: Arc<N>,
  runs: u64,
}

impl PreviewRunner<NoopNotifier> {
  /// Validate `def` and create a preview with no-op notifications.
  pub fn new(def: WorkflowDef, renderers: RendererRegistry) -> Result<Self, RunnerError> {
    Self::with_notifier(def, renderers, NoopNotifier)
  }
}

impl<N: RunnerNotifier + 'static> PreviewRunner<N> {
  pub fn with_notifier(
    def: WorkflowDef,
    renderers: RendererRegistry,
    notifier: N,
  ) -> Result<Self, RunnerError> {
    let workflow = Workflow::load(def)?;
    let notifier = Arc::new(notifier);
    let mut engine = Engine::from_workflow(workflow);
    forward_engine_events(&mut engine, &notifier);

    Ok(Self {
      engine,
      renderers,
      notifier,
      runs: 0,
    })
  }

  /// Non-fatal findings about the definition, for the canvas to display.
  pub fn warnings(&self) -> &[WorkflowWarning] {
    self.engine.workflow().lint()
  }

  pub fn engine(&self) -> &Engine {
    &self.engine
  }

  pub fn state(&self) -> &SessionState {
    self.engine.state()
  }

  /// Start (or restart) the preview session without rendering anything.
  pub fn start(&mut self) -> &SessionState {
    self.engine.reset();
    self.runs += 1;
    let context = self.context();
    self.notifier.notify(RunnerEvent::RunStarted {
      run_id: context.run_id,
      run_number: context.run_number,
      workflow_id: context.workflow_id,
    });
    self.engine.start()
  }

  /// Complete the current step by hand, as if its renderer had reported
  /// `outcome_id`.
  pub fn step(&mut self, outcome_id: &str, data: StepData) -> &SessionState {
    let was_running = self.engine.state().is_running();
    self.engine.complete_step(outcome_id, data);
    if was_running && self.engine.state().is_finished() {
      self.notify_finished();
    }
    self.engine.state()
  }

  /// Run one full session with the registered renderers and stop.
  ///
  /// Returns the final state, which is `completed` or `error`. Renderer
  /// failures and missing renderers are returned as errors.
  #[instrument(
    name = "preview_run",
    skip(self, cancel),
    fields(workflow_id = %self.engine.workflow().workflow_id())
  )]
  pub async fn run(&mut self, cancel: CancellationToken) -> Result<SessionState, RunnerError> {
    self.start();
    let context = self.context();

    drive(&mut self.engine, &self.renderers, &context, &cancel).await?;

    self.notify_finished();
    info!(
      status = ?self.engine.status(),
      steps = self.engine.state().history.len(),
      "preview finished"
    );
    Ok(self.engine.state().clone())
  }

  fn context(&self) -> RunContext {
    RunContext {
      workflow_id: self.engine.workflow().workflow_id().to_string(),
      run_id: format!("preview-{}", self.runs),
      run_number: self.runs,
    }
  }

  fn notify_finished(&self) {
    let context = self.context();
    self.notifier.notify(RunnerEvent::RunFinished {
      run_id: context.run_id,
      run_number: context.run_number,
      status: self.engine.status(),
    });
  }
}
