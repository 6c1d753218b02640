use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::currency::{FormatSettings, NegativeStyle};
use crate::domain::MonthWindow;
use crate::engine::StageGrouping;
use crate::errors::EngineError;

const DEFAULT_DIR_NAME: &str = ".scenario_core";
const HOME_ENV: &str = "SCENARIO_CORE_HOME";
const CONFIG_FILE: &str = "config.json";
const SCENARIO_DIR: &str = "scenarios";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub negative_style: NegativeStyle,
    pub default_window: MonthWindow,
    pub timeline_grouping: StageGrouping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            decimal_separator: '.',
            grouping_separator: ',',
            negative_style: NegativeStyle::Sign,
            default_window: MonthWindow::FIRST_YEAR,
            timeline_grouping: StageGrouping::Quarterly,
            log_level: None,
        }
    }
}

impl Config {
    pub fn format_settings(&self) -> FormatSettings {
        FormatSettings {
            currency: self.currency.clone(),
            decimal_separator: self.decimal_separator,
            grouping_separator: self.grouping_separator,
            negative_style: self.negative_style,
        }
    }
}

/// Base directory for config and saved scenarios, defaulting to `~/.scenario_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, EngineError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, EngineError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, EngineError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a [`JsonScenarioStore`](crate::storage::JsonScenarioStore) keeps documents.
    pub fn scenarios_dir(&self) -> PathBuf {
        self.base.join(SCENARIO_DIR)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    tmp.set_extension(format!("json.{}", TMP_SUFFIX));
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), EngineError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            currency: "EUR".into(),
            default_window: MonthWindow::new(1, 24).unwrap(),
            timeline_grouping: StageGrouping::Monthly,
            log_level: Some("debug".into()),
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(!temp.path().join("config.json.tmp").exists());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"currency":"GBP"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency, "GBP");
        assert_eq!(config.default_window, MonthWindow::FIRST_YEAR);
        assert_eq!(config.format_settings().currency, "GBP");
    }

    #[test]
    fn invalid_window_is_rejected() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(
            manager.path(),
            r#"{"default_window":{"start":0,"end":12}}"#,
        )
        .unwrap();
        assert!(matches!(manager.load(), Err(EngineError::Serde(_))));
    }
}
