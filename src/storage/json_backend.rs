use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::domain::{Identifiable, NamedEntity, ScenarioSnapshot};
use crate::errors::{EngineError, EngineResult};

use super::ScenarioSource;

const SCENARIO_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Directory of `<key>.json` scenario documents.
#[derive(Debug, Clone)]
pub struct JsonScenarioStore {
    root: PathBuf,
}

impl JsonScenarioStore {
    pub fn new(root: impl Into<PathBuf>) -> EngineResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scenario_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_key(key), SCENARIO_EXTENSION))
    }

    /// Writes the snapshot under its canonical key and returns that key.
    pub fn save_snapshot(&self, snapshot: &ScenarioSnapshot, key: &str) -> EngineResult<String> {
        let key = canonical_key(key);
        save_snapshot_to_path(snapshot, &self.scenario_path(&key))?;
        let identity = snapshot.identity();
        debug!(
            key = %key,
            scenario = identity.name(),
            id = %identity.id(),
            items = snapshot.item_count(),
            "saved scenario"
        );
        Ok(key)
    }
}

impl ScenarioSource for JsonScenarioStore {
    fn load_snapshot(&self, key: &str) -> EngineResult<ScenarioSnapshot> {
        let path = self.scenario_path(key);
        if !path.exists() {
            return Err(EngineError::NotFound(format!("scenario `{}`", key)));
        }
        load_snapshot_from_path(&path)
    }

    fn list_keys(&self) -> EngineResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SCENARIO_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

pub fn save_snapshot_to_path(snapshot: &ScenarioSnapshot, path: &Path) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads and validates a scenario document.
pub fn load_snapshot_from_path(path: &Path) -> EngineResult<ScenarioSnapshot> {
    if !path.exists() {
        return Err(EngineError::NotFound(path.display().to_string()));
    }
    let data = fs::read_to_string(path)?;
    let snapshot: ScenarioSnapshot = serde_json::from_str(&data)?;
    debug!(
        path = %path.display(),
        costs = snapshot.costs().len(),
        revenues = snapshot.revenues().len(),
        "loaded scenario"
    );
    Ok(snapshot)
}

/// Lowercase file-safe key; falls back to `scenario` when nothing usable remains.
pub fn canonical_key(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "scenario".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> EngineResult<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemDraft, ScenarioIdentity};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn store_with_temp_dir() -> (JsonScenarioStore, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let store = JsonScenarioStore::new(temp.path()).expect("json store");
        (store, temp)
    }

    fn sample() -> ScenarioSnapshot {
        ScenarioSnapshot::from_items(
            ScenarioIdentity::new("Seed Round"),
            Some(dec!(250000)),
            vec![
                ItemDraft::cost("Engineer", dec!(150000), 1).validate().unwrap(),
                ItemDraft::revenue("MRR", dec!(90000), 3).validate().unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (store, _guard) = store_with_temp_dir();
        let snapshot = sample();
        let key = store.save_snapshot(&snapshot, "Seed Round").expect("save");
        assert_eq!(key, "seed_round");

        let loaded = store.load_snapshot("Seed Round").expect("load");
        assert_eq!(loaded.identity(), snapshot.identity());
        assert_eq!(loaded.costs(), snapshot.costs());
        assert_eq!(loaded.revenues(), snapshot.revenues());
        assert_eq!(store.list_keys().unwrap(), vec!["seed_round".to_string()]);
        assert!(!store.root().join("seed_round.json.tmp").exists());
    }

    #[test]
    fn missing_scenario_is_not_found() {
        let (store, _guard) = store_with_temp_dir();
        let err = store.load_snapshot("ghost").expect_err("nothing saved");
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn invalid_documents_are_rejected_on_load() {
        let (store, _guard) = store_with_temp_dir();
        let path = store.scenario_path("broken");
        fs::write(
            &path,
            r#"{"name":"Broken","costs":[{"title":"Rent","value":"-5","starts_at":1}],"revenues":[]}"#,
        )
        .unwrap();
        let err = store.load_snapshot("broken").expect_err("negative value");
        assert!(matches!(err, EngineError::Serde(_)));
    }

    #[test]
    fn canonical_keys_are_file_safe() {
        assert_eq!(canonical_key("  Plan B / Q3 "), "plan_b___q3");
        assert_eq!(canonical_key("!!!"), "scenario");
    }
}
