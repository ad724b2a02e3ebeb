//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the statutory
//! schedule and run settings from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{
    ContributionsConfig, RunSettings, ScheduleMetadata, StatutorySchedule, TaxBracketsConfig,
};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/ph_2025/
/// ├── schedule.yaml       # Schedule metadata
/// ├── contributions.yaml  # SSS, PhilHealth and Pag-IBIG parameters
/// ├── tax_brackets.yaml   # Annual withholding tax brackets
/// └── settings.yaml       # Payroll run settings (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/ph_2025").unwrap();
/// println!("Loaded schedule: {}", loader.metadata().name);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    schedule: StatutorySchedule,
    settings: RunSettings,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if a required file is missing, contains invalid YAML,
    /// or describes an inconsistent schedule. A missing `settings.yaml` falls back
    /// to [`RunSettings::default`].
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<ScheduleMetadata>(&path.join("schedule.yaml"))?;
        let contributions =
            Self::load_yaml::<ContributionsConfig>(&path.join("contributions.yaml"))?;

        let brackets_path = path.join("tax_brackets.yaml");
        let brackets = Self::load_yaml::<TaxBracketsConfig>(&brackets_path)?.brackets;

        let settings_path = path.join("settings.yaml");
        let settings = if settings_path.exists() {
            Self::load_yaml::<RunSettings>(&settings_path)?
        } else {
            RunSettings::default()
        };

        let schedule = StatutorySchedule {
            metadata,
            contributions,
            brackets,
        };
        schedule
            .validate()
            .map_err(|message| EngineError::ConfigParseError {
                path: path.display().to_string(),
                message,
            })?;

        debug!(
            schedule = %schedule.metadata.code,
            brackets = schedule.brackets.len(),
            "Loaded statutory schedule"
        );

        Ok(Self { schedule, settings })
    }

    /// Wraps an already-built schedule and settings.
    pub fn from_parts(schedule: StatutorySchedule, settings: RunSettings) -> EngineResult<Self> {
        schedule
            .validate()
            .map_err(|message| EngineError::ConfigParseError {
                path: "<in-memory>".to_string(),
                message,
            })?;
        Ok(Self { schedule, settings })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the statutory schedule.
    pub fn schedule(&self) -> &StatutorySchedule {
        &self.schedule
    }

    /// Returns the schedule metadata.
    pub fn metadata(&self) -> &ScheduleMetadata {
        &self.schedule.metadata
    }

    /// Returns the payroll run settings.
    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }
}
