//! Unattended kiosk loop.
//!
//! The [`KioskRunner`] loads the active definition for its category, runs a
//! session, keeps its final step on screen for a fixed delay and starts
//! again. It never stops on its own
//! because of a failing run; only cancellation (or `max_runs`) ends it.

use std::sync::Arc;

use boothflow_config::WorkflowDef;
use boothflow_engine::{Engine, SessionStatus};
use boothflow_store::WorkflowStore;
use boothflow_workflow::Workflow;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::config::KioskConfig;
use crate::drive::{drive, forward_engine_events};
use crate::error::RunnerError;
use crate::events::{NoopNotifier, RunnerEvent, RunnerNotifier};
use crate::renderer::{RendererRegistry, RunContext, StepContext};

const GENERIC_ERROR_MESSAGE: &str = "Something went wrong, restarting";

/// Counts of what happened while the kiosk was running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KioskSummary {
  pub runs: u64,
  pub completed: u64,
  pub failed: u64,
}

/// How a single run ended.
enum RunEnd {
  Completed,
  Failed(String),
  Cancelled,
}

/// The loaded definition and the engine built for it.
struct Loaded {
  def: WorkflowDef,
  engine: Engine,
}

/// A kiosk host that runs sessions back to back.
///
/// # Usage
///
/// ```ignore
/// let runner = KioskRunner::new(store, renderers, KioskConfig::new("photo-booth"));
///
/// let cancel = CancellationToken::new();
/// runner.start(cancel).await?;
/// ```
pub struct KioskRunner<S: WorkflowStore, N: RunnerNotifier = NoopNotifier> {
  store: S,
  renderers: RendererRegistry,
  config: KioskConfig,
  notifier: Arc<N>,
}

impl<S: WorkflowStore> KioskRunner<S, NoopNotifier> {
  /// Create a kiosk runner with no-op notifications.
  pub fn new(store: S, renderers: RendererRegistry, config: KioskConfig) -> Self {
    Self::with_notifier(store, renderers, config, NoopNotifier)
  }
}

impl<S: WorkflowStore, N: RunnerNotifier + 'static> KioskRunner<S, N> {
  /// Create a kiosk runner with a custom notifier.
  pub fn with_notifier(
    store: S,
    renderers: RendererRegistry,
    config: KioskConfig,
    notifier: N,
  ) -> Self {
    Self {
      store,
      renderers,
      config,
      notifier: Arc::new(notifier),
    }
  }

  pub fn config(&self) -> &KioskConfig {
    &self.config
  }

  /// Run the kiosk loop.
  ///
  /// Returns when the cancellation token is triggered or `max_runs` runs
  /// have finished.
  #[instrument(name = "kiosk", skip(self, cancel), fields(category = %self.config.category))]
  pub async fn start(self, cancel: CancellationToken) -> Result<KioskSummary, RunnerError> {
    info!("starting kiosk runner");

    let mut summary = KioskSummary::default();
    let mut loaded: Option<Loaded> = None;

    loop {
      if cancel.is_cancelled() {
        break;
      }
      if self
        .config
        .max_runs
        .is_some_and(|max| summary.runs >= max)
      {
        info!(runs = summary.runs, "max runs reached");
        break;
      }

      loaded = self.reload(loaded).await;
      let Some(current) = loaded.as_mut() else {
        // nothing to run yet, wait for a definition to appear
        if !self.pause(self.config.poll_interval(), &cancel).await {
          break;
        }
        continue;
      };

      summary.runs += 1;
      let context = RunContext {
        workflow_id: current.def.workflow_id.clone(),
        run_id: uuid::Uuid::new_v4().to_string(),
        run_number: summary.runs,
      };

      match self.run_once(&mut current.engine, &context, &cancel).await {
        RunEnd::Cancelled => {
          info!(run_number = context.run_number, "kiosk run cancelled");
          break;
        }
        RunEnd::Completed => {
          summary.completed += 1;
          let final_step = self.final_step(&current.engine, &context);
          if !self.linger(final_step, &context, &cancel).await {
            break;
          }
        }
        RunEnd::Failed(reason) => {
          summary.failed += 1;
          error!(
            run_id = %context.run_id,
            run_number = context.run_number,
            error = %reason,
            "kiosk run failed"
          );
          let error_step = self.error_step(&current.engine, &context);
          if !self.show_error(error_step, &context, &cancel).await {
            break;
          }
        }
      }
    }

    info!(
      runs = summary.runs,
      completed = summary.completed,
      failed = summary.failed,
      "kiosk runner stopped"
    );
    Ok(summary)
  }

  /// Fetch the active definition, keeping the previous one if that fails.
  ///
  /// The engine is rebuilt only when the definition changed.
  async fn reload(&self, previous: Option<Loaded>) -> Option<Loaded> {
    let def = match self.store.find_by_category(&self.config.category).await {
      Ok(def) => def,
      Err(e) => {
        warn!(error = %e, "failed to load workflow definition");
        self.notifier.notify(RunnerEvent::DefinitionReloadFailed {
          category: self.config.category.clone(),
          error: e.to_string(),
        });
        return previous;
      }
    };

    let previous = match previous {
      Some(previous) if previous.def == def => return Some(previous),
      other => other,
    };

    match Workflow::load(def.clone()) {
      Ok(workflow) => {
        info!(
          workflow_id = %workflow.workflow_id(),
          version = workflow.version(),
          "loaded workflow definition"
        );
        let mut engine = Engine::from_workflow(workflow);
        forward_engine_events(&mut engine, &self.notifier);
        Some(Loaded { def, engine })
      }
      Err(e) => {
        warn!(workflow_id = %def.workflow_id, error = %e, "invalid workflow definition");
        self.notifier.notify(RunnerEvent::DefinitionReloadFailed {
          category: self.config.category.clone(),
          error: e.to_string(),
        });
        previous
      }
    }
  }

  async fn run_once(
    &self,
    engine: &mut Engine,
    context: &RunContext,
    cancel: &CancellationToken,
  ) -> RunEnd {
    engine.reset();
    engine.start();

    self.notifier.notify(RunnerEvent::RunStarted {
      run_id: context.run_id.clone(),
      run_number: context.run_number,
      workflow_id: context.workflow_id.clone(),
    });
    info!(
      run_id = %context.run_id,
      run_number = context.run_number,
      workflow_id = %context.workflow_id,
      "kiosk run started"
    );

    let result = drive(engine, &self.renderers, context, cancel).await;

    let end = match result {
      Err(RunnerError::Cancelled) => return RunEnd::Cancelled,
      Err(e) => RunEnd::Failed(e.to_string()),
      Ok(()) => match engine.status() {
        SessionStatus::Completed => RunEnd::Completed,
        _ => RunEnd::Failed(
          engine
            .state()
            .error
            .as_ref()
            .map(|f| f.message.clone())
            .unwrap_or_else(|| "run ended without completing".to_string()),
        ),
      },
    };

    self.notifier.notify(RunnerEvent::RunFinished {
      run_id: context.run_id.clone(),
      run_number: context.run_number,
      status: match end {
        RunEnd::Completed => SessionStatus::Completed,
        _ => SessionStatus::Error,
      },
    });

    end
  }

  /// The configured error step, if the definition has it.
  fn error_step(&self, engine: &Engine, context: &RunContext) -> Option<StepContext> {
    let node = self
      .config
      .error_step_id
      .as_deref()
      .and_then(|id| engine.workflow().node(id))?
      .clone();

    Some(StepContext {
      node,
      collected_data: engine.state().collected_data.clone(),
      context: context.clone(),
    })
  }

  /// The terminal node the run completed on, shown until the next run.
  fn final_step(&self, engine: &Engine, context: &RunContext) -> Option<StepContext> {
    let node = engine.current_node()?.clone();

    Some(StepContext {
      node,
      collected_data: engine.state().collected_data.clone(),
      context: context.clone(),
    })
  }

  /// Show the error step, or the generic message when it cannot be rendered.
  ///
  /// Returns `false` if cancelled meanwhile.
  async fn show_error(
    &self,
    step: Option<StepContext>,
    context: &RunContext,
    cancel: &CancellationToken,
  ) -> bool {
    let step = step.filter(|step| self.renderers.get(&step.node.step_type).is_ok());
    if step.is_none() {
      self.notifier.notify(RunnerEvent::ErrorScreen {
        run_id: context.run_id.clone(),
        message: GENERIC_ERROR_MESSAGE.to_string(),
      });
    }
    self.linger(step, context, cancel).await
  }

  /// Wait one restart delay, rendering `step` meanwhile if given.
  ///
  /// The step's outcome is not routed anywhere; the render is cut short
  /// when the delay runs out. Returns `false` if cancelled meanwhile.
  async fn linger(
    &self,
    step: Option<StepContext>,
    context: &RunContext,
    cancel: &CancellationToken,
  ) -> bool {
    self.notifier.notify(RunnerEvent::Restarting {
      delay_ms: self.config.restart_delay_ms,
    });

    let delay = tokio::time::sleep(self.config.restart_delay());
    tokio::pin!(delay);

    if let Some(step) = step
      && let Ok(renderer) = self.renderers.get(&step.node.step_type)
    {
      let node_id = step.node.node_id.clone();
      tokio::select! {
        _ = cancel.cancelled() => return false,
        _ = &mut delay => return true,
        result = renderer.render(step) => {
          if let Err(e) = result {
            warn!(run_id = %context.run_id, node_id = %node_id, error = %e, "step failed to render between runs");
          }
        }
      }
    }

    tokio::select! {
      _ = cancel.cancelled() => false,
      _ = &mut delay => true,
    }
  }

  /// Sleep unless cancelled. Returns `false` if cancelled.
  async fn pause(&self, duration: std::time::Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
      _ = cancel.cancelled() => false,
      _ = tokio::time::sleep(duration) => true,
    }
  }
}
