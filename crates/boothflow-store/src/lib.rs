//! Boothflow Store
//!
//! This crate provides the storage boundary for workflow definitions.
//! Definitions are stored as opaque JSON and fetched either by id or by a
//! logical category key (e.g. the kiosk's "photo-booth" slot).
//!
//! The engine never touches a store. Hosts load a definition, validate it,
//! and hand the result to the engine.

mod error;
mod fs_store;
mod memory;

pub use error::StoreError;
pub use fs_store::FsWorkflowStore;
pub use memory::MemoryWorkflowStore;

use std::sync::Arc;

use async_trait::async_trait;
use boothflow_config::WorkflowDef;

/// Storage trait for workflow definitions.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
  /// Get a definition by ID.
  async fn get(&self, workflow_id: &str) -> Result<WorkflowDef, StoreError>;

  /// Get the active definition for a category.
  ///
  /// When several definitions share a category the highest `version` wins.
  async fn find_by_category(&self, category: &str) -> Result<WorkflowDef, StoreError>;

  /// Create or replace a definition.
  async fn save(&self, def: &WorkflowDef) -> Result<(), StoreError>;

  /// List all stored definitions, ordered by ID.
  async fn list(&self) -> Result<Vec<WorkflowDef>, StoreError>;

  /// Delete a definition. Returns `false` if it did not exist.
  async fn delete(&self, workflow_id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl<T: WorkflowStore + ?Sized> WorkflowStore for Arc<T> {
  async fn get(&self, workflow_id: &str) -> Result<WorkflowDef, StoreError> {
    (**self).get(workflow_id).await
  }

  async fn find_by_category(&self, category: &str) -> Result<WorkflowDef, StoreError> {
    (**self).find_by_category(category).await
  }

  async fn save(&self, def: &WorkflowDef) -> Result<(), StoreError> {
    (**self).save(def).await
  }

  async fn list(&self) -> Result<Vec<WorkflowDef>, StoreError> {
    (**self).list().await
  }

  async fn delete(&self, workflow_id: &str) -> Result<bool, StoreError> {
    (**self).delete(workflow_id).await
  }
}

/// Pick the highest-version definition in `category`.
pub(crate) fn latest_in_category(
  defs: impl IntoIterator<Item = WorkflowDef>,
  category: &str,
) -> Option<WorkflowDef> {
  defs
    .into_iter()
    .filter(|def| def.category.as_deref() == Some(category))
    .max_by(|a, b| {
      a.version
        .cmp(&b.version)
        .then_with(|| b.workflow_id.cmp(&a.workflow_id))
    })
}
