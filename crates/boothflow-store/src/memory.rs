use std::collections::HashMap;

use async_trait::async_trait;
use boothflow_config::WorkflowDef;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::{WorkflowStore, latest_in_category};

/// In-memory workflow store, for previews and tests.
#[derive(Default)]
pub struct MemoryWorkflowStore {
  defs: RwLock<HashMap<String, WorkflowDef>>,
}

impl MemoryWorkflowStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a store pre-populated with definitions.
  pub fn with_definitions(defs: impl IntoIterator<Item = WorkflowDef>) -> Self {
    let defs = defs
      .into_iter()
      .map(|def| (def.workflow_id.clone(), def))
      .collect();
    Self {
      defs: RwLock::new(defs),
    }
  }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
  async fn get(&self, workflow_id: &str) -> Result<WorkflowDef, StoreError> {
    self
      .defs
      .read()
      .await
      .get(workflow_id)
      .cloned()
      .ok_or_else(|| StoreError::NotFound(workflow_id.to_string()))
  }

  async fn find_by_category(&self, category: &str) -> Result<WorkflowDef, StoreError> {
    let defs = self.defs.read().await;
    latest_in_category(defs.values().cloned(), category)
      .ok_or_else(|| StoreError::NotFound(format!("category '{category}'")))
  }

  async fn save(&self, def: &WorkflowDef) -> Result<(), StoreError> {
    self
      .defs
      .write()
      .await
      .insert(def.workflow_id.clone(), def.clone());
    Ok(())
  }

  async fn list(&self) -> Result<Vec<WorkflowDef>, StoreError> {
    let mut defs: Vec<WorkflowDef> = self.defs.read().await.values().cloned().collect();
    defs.sort_by(|a, b| a.workflow_id.cmp(&b.workflow_id));
    Ok(defs)
  }

  async fn delete(&self, workflow_id: &str) -> Result<bool, StoreError> {
    Ok(self.defs.write().await.remove(workflow_id).is_some())
  }
}
