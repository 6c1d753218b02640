pub mod json_backend;

use std::path::Path;

use crate::domain::ScenarioSnapshot;
use crate::errors::EngineResult;

/// Read-only supplier of validated scenario snapshots.
pub trait ScenarioSource: Send + Sync {
    fn load_snapshot(&self, key: &str) -> EngineResult<ScenarioSnapshot>;
    fn list_keys(&self) -> EngineResult<Vec<String>>;

    /// Loads a document outside the managed directory.
    fn load_snapshot_from_path(&self, path: &Path) -> EngineResult<ScenarioSnapshot> {
        json_backend::load_snapshot_from_path(path)
    }
}

pub use json_backend::{canonical_key, save_snapshot_to_path, JsonScenarioStore};
