use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::experiment::{Context, ExperimentDefinition};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
    /// Experiment definitions keyed by experiment ID
    pub experiments: BTreeMap<String, ExperimentDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings for the `simulate` command
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of picks per run
    pub size: u64,
    /// Visitor contexts replayed in round-robin order
    pub traffic: Vec<Context>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            size: 100,
            traffic: Vec::new(),
        }
    }
}

/// Sections whose keys are matched against caller data and must keep their case
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeyedSections {
    simulation: KeyedSimulation,
    experiments: BTreeMap<String, ExperimentDefinition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeyedSimulation {
    traffic: Option<Vec<Context>>,
}

const DEFAULT_FILES: [&str; 2] = ["config/default", "config/local"];
static KEYED_FORMATS: [&str; 2] = ["toml", "json"];

impl AppConfig {
    /// Load configuration from `config/default`, `config/local`, an optional
    /// explicit file and `APP__*` environment variables, later sources winning
    ///
    /// The `config` crate lowercases table keys, so `experiments` and
    /// `simulation.traffic` are read from the files directly. Experiments
    /// merge by ID across files; a later `traffic` list replaces an earlier one.
    /// Only TOML and JSON files are supported.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        for name in DEFAULT_FILES {
            builder = builder.add_source(config::File::with_name(name).required(false));
        }

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.experiments.clear();

        for file in keyed_files(path) {
            let sections = read_keyed_sections(&file)?;
            app_config.experiments.extend(sections.experiments);

            if let Some(traffic) = sections.simulation.traffic {
                app_config.simulation.traffic = traffic;
            }
        }

        Ok(app_config)
    }
}

/// Files that feed the keyed sections, in precedence order
fn keyed_files(path: Option<&Path>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = DEFAULT_FILES
        .iter()
        .flat_map(|name| {
            KEYED_FORMATS
                .iter()
                .map(move |format| Path::new(name).with_extension(format))
        })
        .filter(|file| file.is_file())
        .collect();

    files.extend(path.map(Path::to_path_buf));
    files
}

fn read_keyed_sections(file: &Path) -> Result<KeyedSections, config::ConfigError> {
    let contents =
        fs::read_to_string(file).map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let parse_error = |cause: Box<dyn std::error::Error + Send + Sync>| {
        config::ConfigError::FileParse {
            uri: Some(file.display().to_string()),
            cause,
        }
    };

    match file.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|e| parse_error(Box::new(e))),
        Some("toml") => toml::from_str(&contents).map_err(|e| parse_error(Box::new(e))),
        _ => Err(config::ConfigError::Message(format!(
            "{}: configuration files must be TOML or JSON",
            file.display()
        ))),
    }
}
