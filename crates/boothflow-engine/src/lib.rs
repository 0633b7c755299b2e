//! Boothflow Engine
//!
//! This crate provides the booth workflow engine: a small interpreter that
//! walks a validated [`Workflow`], keeps one session's state, and notifies
//! listeners on every state change.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │  - start() / complete_step(outcome, data) / reset()         │
//! │  - on(listener) → Subscription                              │
//! └─────────────────────────────────────────────────────────────┘
//!                │                              │
//!                ▼                              ▼
//! ┌──────────────────────────────┐  ┌──────────────────────────┐
//! │  boothflow_workflow::resolve │  │      SessionState        │
//! │  (current, outcome) → next   │  │  status, current node,   │
//! │  pure, no state              │  │  history, collected data │
//! └──────────────────────────────┘  └──────────────────────────┘
//! ```
//!
//! The engine is synchronous and performs no I/O. Hosts (the kiosk loop and
//! the authoring preview in `boothflow-runner`) render the current step and
//! report its outcome back through [`Engine::complete_step`].
//!
//! # Usage
//!
//! ```ignore
//! let mut engine = Engine::new(def)?;
//! let sub = engine.on(|event| println!("{:?} at {:?}", event.kind, event.node_id));
//!
//! engine.start();
//! engine.complete_step("default", Map::new());
//! engine.unsubscribe(sub);
//! ```

mod engine;
mod events;
mod session;

pub use engine::Engine;
pub use events::{EngineEvent, EventKind, Subscription};
pub use session::{HistoryEntry, SessionState, SessionStatus, StepData, StepFailure};

pub use boothflow_workflow::{Workflow, WorkflowDef, WorkflowError};
