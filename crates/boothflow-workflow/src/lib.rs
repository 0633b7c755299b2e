//! Boothflow Workflow
//!
//! This crate provides the validated workflow representation for boothflow.
//! A [`Workflow`] is built from a [`WorkflowDef`](boothflow_config::WorkflowDef)
//! and is immutable for the lifetime of a run.
//!
//! Key differences from `boothflow-config`:
//! - Graph structure is validated (non-empty, unique node ids, valid edges)
//! - The start node is always explicit
//! - Outgoing transitions are indexed per node for resolution
//!
//! [`resolve`] is the pure transition function the engine uses to pick the
//! next node from a step's reported outcome.

mod error;
mod graph;
mod resolver;
mod workflow;

pub use error::{WorkflowError, WorkflowWarning};
pub use graph::Graph;
pub use resolver::{Resolution, resolve};
pub use workflow::Workflow;

pub use boothflow_config::{
  DEFAULT_OUTCOME, EdgeDef, NodeDef, NodeOutput, OutputKind, StepConfig, StepType, WorkflowDef,
};
