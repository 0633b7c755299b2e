//! Boothflow Runner
//!
//! Hosts that drive a [`boothflow_engine::Engine`]: they render the current
//! step through a registered [`StepRenderer`] and report its outcome back to
//! the engine until the run ends.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        KioskRunner                          │
//! │  - loads the definition for a category before each run      │
//! │  - restarts after a fixed delay, forever (or max_runs)      │
//! │  - start(cancel) runs the loop                              │
//! └─────────────────────────────────────────────────────────────┘
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       PreviewRunner                         │
//! │  - one run, then stops (authoring canvas)                   │
//! │  - run(cancel) or manual step(outcome, data)                │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │               RendererRegistry / StepRenderer               │
//! │  - one renderer per step type, optional fallback            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use boothflow_runner::{KioskConfig, KioskRunner, PassthroughRenderer, RendererRegistry};
//! use tokio_util::sync::CancellationToken;
//!
//! let renderers = RendererRegistry::new().with_fallback(PassthroughRenderer::new());
//! let runner = KioskRunner::new(store, renderers, KioskConfig::new("photo-booth"));
//!
//! let cancel = CancellationToken::new();
//! let summary = runner.start(cancel).await?;
//! ```

mod config;
mod drive;
mod error;
mod events;
mod kiosk;
mod preview;
mod renderer;
mod renderers;

pub use config::KioskConfig;
pub use error::{RenderError, RunnerError};
pub use events::{ChannelNotifier, NoopNotifier, RunnerEvent, RunnerNotifier};
pub use kiosk::{KioskRunner, KioskSummary};
pub use preview::PreviewRunner;
pub use renderer::{RendererRegistry, RunContext, StepContext, StepOutcome, StepRenderer};
pub use renderers::{PassthroughRenderer, ScriptedRenderer};
