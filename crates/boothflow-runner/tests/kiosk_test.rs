//! Integration tests for the kiosk loop.

mod common;

use std::sync::Arc;
use std::time::Duration;

use boothflow_config::StepType;
use boothflow_engine::{EventKind, SessionStatus};
use boothflow_runner::{
  ChannelNotifier, KioskConfig, KioskRunner, KioskSummary, PassthroughRenderer, RendererRegistry,
  RunnerEvent, ScriptedRenderer, StepOutcome,
};
use boothflow_store::{MemoryWorkflowStore, WorkflowStore};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use common::{booth_def, drain};

fn fast_config(max_runs: u64) -> KioskConfig {
  KioskConfig {
    restart_delay_ms: 1,
    poll_interval_ms: 1,
    max_runs: Some(max_runs),
    ..KioskConfig::new("photo")
  }
}

fn passthrough_capture_accepts() -> RendererRegistry {
  RendererRegistry::new()
    .with_fallback(PassthroughRenderer::new())
    .with(
      StepType::Capture,
      ScriptedRenderer::from_outcomes(Vec::<String>::new()).then_default(),
    )
}

#[tokio::test]
async fn test_runs_back_to_back() {
  let store = MemoryWorkflowStore::with_definitions([booth_def("booth", 1)]);
  let renderers = RendererRegistry::new()
    .with(StepType::Result, PassthroughRenderer::new())
    .with_fallback(ScriptedRenderer::new((0..3).flat_map(|i| {
      [
        StepOutcome::default_exit(),
        StepOutcome::new("accept").with_data(
          json!({ "photo": format!("shot-{i}") })
            .as_object()
            .cloned()
            .unwrap(),
        ),
      ]
    })));
  let (notifier, mut rx) = ChannelNotifier::channel();

  let runner = KioskRunner::with_notifier(store, renderers, fast_config(3), notifier);
  let summary = runner.start(CancellationToken::new()).await.unwrap();

  assert_eq!(
    summary,
    KioskSummary {
      runs: 3,
      completed: 3,
      failed: 0
    }
  );

  let events = drain(&mut rx);
  let run_numbers: Vec<u64> = events
    .iter()
    .filter_map(|e| match e {
      RunnerEvent::RunStarted { run_number, .. } => Some(*run_number),
      _ => None,
    })
    .collect();
  assert_eq!(run_numbers, vec![1, 2, 3]);

  let completions: Vec<_> = events
    .iter()
    .filter_map(|e| match e {
      RunnerEvent::Engine(ev) if ev.kind == EventKind::WorkflowCompleted => Some(ev),
      _ => None,
    })
    .collect();
  assert_eq!(completions.len(), 3);
  assert_eq!(completions[2].state.collected_data["photo"], "shot-2");
  assert_eq!(completions[2].node_id(), Some("share"));
}

#[tokio::test]
async fn test_terminal_step_is_shown_before_restart() {
  let store = MemoryWorkflowStore::with_definitions([booth_def("booth", 1)]);
  let screens = Arc::new(ScriptedRenderer::from_outcomes(["default", "accept"]).then_default());
  let renderers = RendererRegistry::new().with_fallback(screens.clone());
  let config = KioskConfig {
    restart_delay_ms: 50,
    ..fast_config(1)
  };

  let runner = KioskRunner::new(store, renderers, config);
  let summary = runner.start(CancellationToken::new()).await.unwrap();

  assert_eq!(summary.completed, 1);
  assert_eq!(
    screens.rendered(),
    vec![
      "countdown".to_string(),
      "capture".to_string(),
      "share".to_string()
    ]
  );
}

#[tokio::test]
async fn test_unroutable_outcome_shows_generic_error_and_continues() {
  let store = MemoryWorkflowStore::with_definitions([booth_def("booth", 1)]);
  let renderers = RendererRegistry::new()
    .with_fallback(PassthroughRenderer::new())
    .with(
      StepType::Capture,
      ScriptedRenderer::from_outcomes(["bogus", "bogus"]),
    );
  let (notifier, mut rx) = ChannelNotifier::channel();

  let runner = KioskRunner::with_notifier(store, renderers, fast_config(2), notifier);
  let summary = runner.start(CancellationToken::new()).await.unwrap();

  assert_eq!(summary.runs, 2);
  assert_eq!(summary.failed, 2);

  let events = drain(&mut rx);
  let screens = events
    .iter()
    .filter(|e| matches!(e, RunnerEvent::ErrorScreen { message, .. } if message.contains("restarting")))
    .count();
  assert_eq!(screens, 2);
  assert!(events.iter().any(|e| matches!(
    e,
    RunnerEvent::RunFinished {
      status: SessionStatus::Error,
      ..
    }
  )));
}

#[tokio::test]
async fn test_configured_error_step_is_rendered() {
  let store = MemoryWorkflowStore::with_definitions([booth_def("booth", 1)]);
  let error_screen = Arc::new(ScriptedRenderer::from_outcomes(["default"]));
  let renderers = RendererRegistry::new()
    .with_fallback(PassthroughRenderer::new())
    .with(
      StepType::Capture,
      ScriptedRenderer::from_outcomes(["bogus"]),
    )
    .with(
      StepType::Custom("error-screen".to_string()),
      error_screen.clone(),
    );
  let config = KioskConfig {
    error_step_id: Some("oops".to_string()),
    ..fast_config(1)
  };
  let (notifier, mut rx) = ChannelNotifier::channel();

  let runner = KioskRunner::with_notifier(store, renderers, config, notifier);
  let summary = runner.start(CancellationToken::new()).await.unwrap();

  assert_eq!(summary.failed, 1);
  assert_eq!(error_screen.rendered(), vec!["oops".to_string()]);
  assert!(
    !drain(&mut rx)
      .iter()
      .any(|e| matches!(e, RunnerEvent::ErrorScreen { .. }))
  );
}

#[tokio::test]
async fn test_renderer_failure_does_not_halt_loop() {
  let store = MemoryWorkflowStore::with_definitions([booth_def("booth", 1)]);
  // capture renderer has nothing scripted, so every capture fails
  let renderers = RendererRegistry::new()
    .with_fallback(PassthroughRenderer::new())
    .with(
      StepType::Capture,
      ScriptedRenderer::from_outcomes(Vec::<String>::new()),
    );

  let runner = KioskRunner::new(store, renderers, fast_config(3));
  let summary = runner.start(CancellationToken::new()).await.unwrap();

  assert_eq!(
    summary,
    KioskSummary {
      runs: 3,
      completed: 0,
      failed: 3
    }
  );
}

#[tokio::test]
async fn test_waits_for_definition_until_cancelled() {
  let store = MemoryWorkflowStore::new();
  let (notifier, mut rx) = ChannelNotifier::channel();
  let config = KioskConfig {
    poll_interval_ms: 5,
    ..KioskConfig::new("photo")
  };

  let runner = KioskRunner::with_notifier(store, passthrough_capture_accepts(), config, notifier);
  let cancel = CancellationToken::new();
  let handle = tokio::spawn(runner.start(cancel.clone()));

  tokio::time::sleep(Duration::from_millis(30)).await;
  cancel.cancel();

  let summary = handle.await.unwrap().unwrap();
  assert_eq!(summary.runs, 0);
  assert!(
    drain(&mut rx)
      .iter()
      .any(|e| matches!(e, RunnerEvent::DefinitionReloadFailed { category, .. } if category == "photo"))
  );
}

#[tokio::test]
async fn test_picks_up_new_definition_between_runs() {
  let store = Arc::new(MemoryWorkflowStore::with_definitions([booth_def("booth-v1", 1)]));
  let (notifier, mut rx) = ChannelNotifier::channel();
  let config = KioskConfig {
    restart_delay_ms: 50,
    ..fast_config(2)
  };

  let runner = KioskRunner::with_notifier(
    store.clone(),
    passthrough_capture_accepts(),
    config,
    notifier,
  );
  let handle = tokio::spawn(runner.start(CancellationToken::new()));

  let mut started = Vec::new();
  while let Some(event) = rx.recv().await {
    match event {
      RunnerEvent::RunStarted { workflow_id, .. } => started.push(workflow_id),
      RunnerEvent::Restarting { .. } if started.len() == 1 => {
        store.save(&booth_def("booth-v2", 2)).await.unwrap();
      }
      _ => {}
    }
  }

  let summary = handle.await.unwrap().unwrap();
  assert_eq!(summary.completed, 2);
  assert_eq!(started, vec!["booth-v1".to_string(), "booth-v2".to_string()]);
}

#[tokio::test]
async fn test_keeps_previous_definition_when_reload_fails() {
  let store = Arc::new(MemoryWorkflowStore::with_definitions([booth_def("booth", 1)]));
  let (notifier, mut rx) = ChannelNotifier::channel();
  let config = KioskConfig {
    restart_delay_ms: 50,
    ..fast_config(2)
  };

  let runner = KioskRunner::with_notifier(
    store.clone(),
    passthrough_capture_accepts(),
    config,
    notifier,
  );
  let handle = tokio::spawn(runner.start(CancellationToken::new()));

  let mut events = Vec::new();
  while let Some(event) = rx.recv().await {
    if matches!(event, RunnerEvent::Restarting { .. }) && !store.list().await.unwrap().is_empty() {
      store.delete("booth").await.unwrap();
    }
    events.push(event);
  }

  let summary = handle.await.unwrap().unwrap();
  assert_eq!(summary.completed, 2);
  assert!(
    events
      .iter()
      .any(|e| matches!(e, RunnerEvent::DefinitionReloadFailed { .. }))
  );
}

#[tokio::test]
async fn test_cancel_during_step() {
  let store = MemoryWorkflowStore::with_definitions([booth_def("booth", 1)]);
  let renderers =
    RendererRegistry::new().with_fallback(PassthroughRenderer::with_dwell(Duration::from_secs(60)));

  let runner = KioskRunner::new(store, renderers, KioskConfig::new("photo"));
  let cancel = CancellationToken::new();
  let handle = tokio::spawn(runner.start(cancel.clone()));

  tokio::time::sleep(Duration::from_millis(20)).await;
  cancel.cancel();

  let summary = tokio::time::timeout(Duration::from_secs(5), handle)
    .await
    .expect("runner should stop promptly")
    .unwrap()
    .unwrap();
  assert_eq!(
    summary,
    KioskSummary {
      runs: 1,
      completed: 0,
      failed: 0
    }
  );
}
