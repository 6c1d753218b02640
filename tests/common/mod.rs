#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use scenario_core::domain::{ItemDraft, RecurringItem, ScenarioIdentity, ScenarioSnapshot};
use scenario_core::storage::save_snapshot_to_path;
use tempfile::TempDir;

pub fn cost(title: &str, value: Decimal, starts_at: u32) -> RecurringItem {
    ItemDraft::cost(title, value, starts_at)
        .validate()
        .expect("valid cost item")
}

pub fn revenue(title: &str, value: Decimal, starts_at: u32) -> RecurringItem {
    ItemDraft::revenue(title, value, starts_at)
        .validate()
        .expect("valid revenue item")
}

pub fn scenario(
    name: &str,
    funding: Option<Decimal>,
    items: impl IntoIterator<Item = RecurringItem>,
) -> ScenarioSnapshot {
    ScenarioSnapshot::from_items(ScenarioIdentity::new(name), funding, items)
        .expect("valid scenario")
}

/// Isolated home directory for CLI and storage tests.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes the snapshot as a scenario document next to the home dir.
    pub fn write_scenario(&self, file_name: &str, snapshot: &ScenarioSnapshot) -> PathBuf {
        let path = self.dir.path().join(file_name);
        save_snapshot_to_path(snapshot, &path).expect("write scenario document");
        path
    }

    pub fn write_file(&self, file_name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, contents).expect("write file");
        path
    }
}
