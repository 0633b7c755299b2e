use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use boothflow_config::WorkflowDef;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::{WorkflowStore, latest_in_category};

/// Filesystem-based workflow store.
///
/// Definitions are stored one per file:
/// ```text
/// {root}/
/// ├── photo-booth.json
/// └── gif-booth.json
/// ```
pub struct FsWorkflowStore {
  root: PathBuf,
}

impl FsWorkflowStore {
  /// Create a new filesystem store at the given root path.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Get the root directory of the store.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Map a workflow id to its file, rejecting ids that would escape the root.
  fn path_for(&self, workflow_id: &str) -> Result<PathBuf, StoreError> {
    let valid = !workflow_id.is_empty()
      && workflow_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
      && !workflow_id.starts_with('.');

    if !valid {
      return Err(StoreError::InvalidId(workflow_id.to_string()));
    }
    Ok(self.root.join(format!("{workflow_id}.json")))
  }

  async fn read_def(path: &Path) -> Result<WorkflowDef, StoreError> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
  }
}

#[async_trait]
impl WorkflowStore for FsWorkflowStore {
  async fn get(&self, workflow_id: &str) -> Result<WorkflowDef, StoreError> {
    let path = self.path_for(workflow_id)?;
    match Self::read_def(&path).await {
      Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
        Err(StoreError::NotFound(workflow_id.to_string()))
      }
      other => other,
    }
  }

  async fn find_by_category(&self, category: &str) -> Result<WorkflowDef, StoreError> {
    let defs = self.list().await?;
    latest_in_category(defs, category)
      .ok_or_else(|| StoreError::NotFound(format!("category '{category}'")))
  }

  async fn save(&self, def: &WorkflowDef) -> Result<(), StoreError> {
    let path = self.path_for(&def.workflow_id)?;
    fs::create_dir_all(&self.root).await?;

    let content = serde_json::to_string_pretty(def)?;
    // write-then-rename so readers never see a half-written file
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, &path).await?;

    debug!(workflow_id = %def.workflow_id, path = %path.display(), "saved workflow");
    Ok(())
  }

  async fn list(&self) -> Result<Vec<WorkflowDef>, StoreError> {
    let mut entries = match fs::read_dir(&self.root).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e.into()),
    };

    let mut defs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }

      match Self::read_def(&path).await {
        Ok(def) => defs.push(def),
        Err(e) => {
          warn!(path = %path.display(), error = %e, "skipping unreadable workflow file");
        }
      }
    }

    defs.sort_by(|a, b| a.workflow_id.cmp(&b.workflow_id));
    Ok(defs)
  }

  async fn delete(&self, workflow_id: &str) -> Result<bool, StoreError> {
    let path = self.path_for(workflow_id)?;
    match fs::remove_file(&path).await {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_path_for_valid_ids() {
    let store = FsWorkflowStore::new("/tmp/workflows");
    assert_eq!(
      store.path_for("photo-booth_v2").unwrap(),
      PathBuf::from("/tmp/workflows/photo-booth_v2.json")
    );
  }

  #[test]
  fn test_path_for_rejects_traversal() {
    let store = FsWorkflowStore::new("/tmp/workflows");
    assert!(matches!(
      store.path_for("../etc/passwd"),
      Err(StoreError::InvalidId(_))
    ));
    assert!(matches!(store.path_for(""), Err(StoreError::InvalidId(_))));
    assert!(matches!(
      store.path_for(".hidden"),
      Err(StoreError::InvalidId(_))
    ));
  }
}
