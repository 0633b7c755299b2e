use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use boothflow_config::WorkflowDef;
use boothflow_engine::SessionStatus;
use boothflow_runner::{
  ChannelNotifier, KioskConfig, KioskRunner, PassthroughRenderer, PreviewRunner, RendererRegistry,
  ScriptedRenderer,
};
use boothflow_store::{FsWorkflowStore, WorkflowStore};
use boothflow_workflow::Workflow;

/// Boothflow - run interactive booth workflows on kiosks and in preview
#[derive(Parser)]
#[command(name = "boothflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.boothflow)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a workflow definition and print its warnings
  Validate {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Store a workflow definition in the data directory
  Save {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Run one preview session and print the final state
  Preview {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// Outcome to report for each step, in order. Steps past the end of
    /// the list report "default".
    #[arg(long = "outcome")]
    outcomes: Vec<String>,
  },

  /// Run the unattended kiosk loop for a category
  Kiosk {
    /// Category of the workflow to run
    #[arg(long)]
    category: Option<String>,

    /// Kiosk config file (JSON); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay before restarting after a run ends
    #[arg(long)]
    restart_delay_ms: Option<u64>,

    /// Stop after this many runs
    #[arg(long)]
    max_runs: Option<u64>,

    /// How long each step stays on screen
    #[arg(long, default_value_t = 1000)]
    dwell_ms: u64,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("boothflow=info,warn")),
    )
    .with_target(false)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".boothflow"),
  };

  match cli.command {
    Some(Commands::Validate { workflow_file }) => validate(&workflow_file)?,
    Some(Commands::Save { workflow_file }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(save(&workflow_file, &data_dir))?;
    }
    Some(Commands::Preview {
      workflow_file,
      outcomes,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(preview(&workflow_file, outcomes))?;
    }
    Some(Commands::Kiosk {
      category,
      config,
      restart_delay_ms,
      max_runs,
      dwell_ms,
    }) => {
      let mut kiosk_config = match (config, category) {
        (Some(path), category) => {
          let mut loaded = read_kiosk_config(&path)?;
          if let Some(category) = category {
            loaded.category = category;
          }
          loaded
        }
        (None, Some(category)) => KioskConfig::new(category),
        (None, None) => bail!("either --category or --config is required"),
      };
      if let Some(delay) = restart_delay_ms {
        kiosk_config.restart_delay_ms = delay;
      }
      if max_runs.is_some() {
        kiosk_config.max_runs = max_runs;
      }

      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(kiosk(kiosk_config, data_dir, Duration::from_millis(dwell_ms)))?;
    }
    None => {
      println!("boothflow - use --help to see available commands");
    }
  }

  Ok(())
}

fn read_workflow_def(workflow_file: &Path) -> Result<WorkflowDef> {
  let content = std::fs::read_to_string(workflow_file)
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))
}

fn read_kiosk_config(path: &Path) -> Result<KioskConfig> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read kiosk config: {}", path.display()))?;

  KioskConfig::from_json(&content)
    .with_context(|| format!("failed to parse kiosk config: {}", path.display()))
}

fn validate(workflow_file: &Path) -> Result<()> {
  let def = read_workflow_def(workflow_file)?;
  let workflow = Workflow::load(def).context("invalid workflow definition")?;

  eprintln!(
    "Workflow '{}' ({} nodes, {} edges) starts at '{}'",
    workflow.name(),
    workflow.nodes_in_order().len(),
    workflow.edges().len(),
    workflow.start_node_id()
  );

  for warning in workflow.lint() {
    eprintln!("warning: {}", warning);
  }

  Ok(())
}

async fn save(workflow_file: &Path, data_dir: &Path) -> Result<()> {
  let def = read_workflow_def(workflow_file)?;
  Workflow::load(def.clone()).context("refusing to save invalid workflow")?;

  let store = FsWorkflowStore::new(data_dir.join("workflows"));
  store.save(&def).await.context("failed to save workflow")?;

  eprintln!("Saved workflow '{}' to {}", def.workflow_id, store.root().display());
  Ok(())
}

async fn preview(workflow_file: &Path, outcomes: Vec<String>) -> Result<()> {
  let def = read_workflow_def(workflow_file)?;
  eprintln!("Loaded workflow: {}", def.name);

  let renderers =
    RendererRegistry::new().with_fallback(ScriptedRenderer::from_outcomes(outcomes).then_default());
  let mut runner = PreviewRunner::new(def, renderers).context("invalid workflow definition")?;

  for warning in runner.warnings() {
    eprintln!("warning: {}", warning);
  }

  let state = runner
    .run(CancellationToken::new())
    .await
    .context("preview failed")?;

  println!("{}", serde_json::to_string_pretty(&state)?);

  if state.status == SessionStatus::Error {
    bail!("preview ended in error");
  }
  Ok(())
}

async fn kiosk(config: KioskConfig, data_dir: PathBuf, dwell: Duration) -> Result<()> {
  let store = FsWorkflowStore::new(data_dir.join("workflows"));
  let renderers = RendererRegistry::new().with_fallback(PassthroughRenderer::with_dwell(dwell));

  let (notifier, mut events) = ChannelNotifier::channel();
  let printer = tokio::spawn(async move {
    while let Some(event) = events.recv().await {
      match serde_json::to_string(&event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "failed to serialize runner event"),
      }
    }
  });

  let cancel = CancellationToken::new();
  let ctrl_c = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      ctrl_c.cancel();
    }
  });

  let runner = KioskRunner::with_notifier(store, renderers, config, notifier);
  let summary = runner.start(cancel).await.context("kiosk runner failed")?;

  printer.await.context("event printer panicked")?;
  eprintln!(
    "Kiosk stopped after {} runs ({} completed, {} failed)",
    summary.runs, summary.completed, summary.failed
  );
  Ok(())
}
