#![allow(dead_code)]

use boothflow_config::{EdgeDef, NodeDef, NodeOutput, OutputKind, StepType, WorkflowDef};
use boothflow_runner::RunnerEvent;
use tokio::sync::mpsc;

/// countdown -> capture -(accept)-> share, capture -(retake)-> countdown
pub fn booth_def(workflow_id: &str, version: u32) -> WorkflowDef {
  let mut def = WorkflowDef::new(workflow_id, "Photo Booth")
    .with_category("photo")
    .with_start("countdown")
    .with_node(NodeDef::new("countdown", StepType::Countdown))
    .with_node(
      NodeDef::new("capture", StepType::Capture)
        .with_output(NodeOutput::new("accept", OutputKind::Default))
        .with_output(NodeOutput::new("retake", OutputKind::Retake)),
    )
    .with_node(NodeDef::new("share", StepType::Result))
    .with_node(NodeDef::new("oops", StepType::Custom("error-screen".to_string())))
    .with_edge(EdgeDef::default_exit("countdown", "capture"))
    .with_edge(EdgeDef::new("capture", "accept", "share"))
    .with_edge(EdgeDef::new("capture", "retake", "countdown"));
  def.version = version;
  def
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<RunnerEvent>) -> Vec<RunnerEvent> {
  let mut events = Vec::new();
  while let Ok(event) = rx.try_recv() {
    events.push(event);
  }
  events
}
