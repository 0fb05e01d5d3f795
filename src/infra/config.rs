//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. Default: config/dev.toml
//!
//! Every section is optional; missing values fall back to defaults.

use crate::domain::columns::ColumnMap;
use crate::domain::types::DurationUnit;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct ResidencyConfig {
    /// One of seconds, minutes, hours, days, weeks
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl Default for ResidencyConfig {
    fn default() -> Self {
        Self { unit: default_unit() }
    }
}

fn default_unit() -> String {
    "hours".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Detection table in JSONL format
    #[serde(default = "default_input_file")]
    pub file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { file: default_input_file() }
    }
}

fn default_input_file() -> String {
    "detections.jsonl".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the output tables
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_output_dir() }
    }
}

fn default_output_dir() -> String {
    "output".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudyConfig {
    /// Study identifier (e.g., "saginaw-bay-walleye")
    #[serde(default = "default_study_id")]
    pub id: String,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self { id: default_study_id() }
    }
}

fn default_study_id() -> String {
    "study".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub study: StudyConfig,
    #[serde(default)]
    pub columns: ColumnMap,
    #[serde(default)]
    pub residency: ResidencyConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    study_id: String,
    columns: ColumnMap,
    unit: DurationUnit,
    input_file: String,
    output_dir: String,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            study_id: default_study_id(),
            columns: ColumnMap::default(),
            unit: DurationUnit::Hours,
            input_file: default_input_file(),
            output_dir: default_output_dir(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// An unknown residency unit is rejected here rather than at analysis time.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let unit: DurationUnit = toml_config
            .residency
            .unit
            .parse()
            .with_context(|| format!("Invalid residency unit in {}", path.display()))?;

        Ok(Self {
            study_id: toml_config.study.id,
            columns: toml_config.columns,
            unit,
            input_file: toml_config.input.file,
            output_dir: toml_config.output.dir,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - uses defaults only when the file does not exist
    ///
    /// A file that exists but fails to parse or validate is an error.
    pub fn load_from_path(path: &str) -> anyhow::Result<Self> {
        if !Path::new(path).exists() {
            warn!(config_file = %path, "config_file_missing_using_defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    // Getters for all config fields
    pub fn study_id(&self) -> &str {
        &self.study_id
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn unit(&self) -> DurationUnit {
        self.unit
    }

    pub fn input_file(&self) -> &str {
        &self.input_file
    }

    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Override the residency unit (command line takes precedence over the file)
    pub fn with_unit(mut self, unit: DurationUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_input_file(mut self, file: &str) -> Self {
        self.input_file = file.to_string();
        self
    }

    pub fn with_output_dir(mut self, dir: &str) -> Self {
        self.output_dir = dir.to_string();
        self
    }
}
