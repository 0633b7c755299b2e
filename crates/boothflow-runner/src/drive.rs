//! The render/complete loop shared by the kiosk and preview hosts.

use std::sync::Arc;

use boothflow_engine::Engine;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{RenderError, RunnerError};
use crate::events::{RunnerEvent, RunnerNotifier};
use crate::renderer::{RendererRegistry, RunContext, StepContext};

/// Forward every engine event to the notifier.
pub(crate) fn forward_engine_events<N>(engine: &mut Engine, notifier: &Arc<N>)
where
  N: RunnerNotifier + 'static,
{
  let notifier = Arc::clone(notifier);
  engine.on(move |event| notifier.notify(RunnerEvent::Engine(event.clone())));
}

/// Render steps and report outcomes until the run is no longer running.
///
/// Assumes `engine.start()` has been called. Renderer failures are returned
/// as errors; the engine is left at the failing step.
pub(crate) async fn drive(
  engine: &mut Engine,
  renderers: &RendererRegistry,
  context: &RunContext,
  cancel: &CancellationToken,
) -> Result<(), RunnerError> {
  while engine.state().is_running() {
    let Some(node) = engine.current_node().cloned() else {
      // current node always exists in a validated workflow
      break;
    };

    let renderer = renderers.get(&node.step_type)?;
    let node_id = node.node_id.clone();
    let step = StepContext {
      node,
      collected_data: engine.state().collected_data.clone(),
      context: context.clone(),
    };

    debug!(run_id = %context.run_id, node_id = %node_id, "rendering step");

    let outcome = tokio::select! {
      _ = cancel.cancelled() => return Err(RunnerError::Cancelled),
      outcome = renderer.render(step) => outcome,
    }?;

    if outcome.outcome_id.is_empty() {
      return Err(RenderError::failed(node_id, "renderer returned an empty outcome id").into());
    }

    engine.complete_step(&outcome.outcome_id, outcome.data);
  }

  Ok(())
}
