//! Boothflow Config
//!
//! This crate contains the serializable graph definition types for boothflow.
//! A definition describes the steps of a booth experience (countdown, capture,
//! selection, share, ...) and the labelled transitions between them.
//!
//! Definitions are produced by the authoring canvas and loaded from:
//! - JSON files (via CLI)
//! - A workflow store (as JSON blobs, by id or by category)
//!
//! The engine never interprets step configuration. It only reads node ids,
//! declared outputs and edges.

mod edge;
mod node;
mod step;
mod workflow;

pub use edge::EdgeDef;
pub use node::{NodeDef, NodeOutput, OutputKind, StepConfig};
pub use step::StepType;
pub use workflow::WorkflowDef;

/// Outcome every step implicitly produces when it declares no outputs.
pub const DEFAULT_OUTCOME: &str = "default";
