use crate::datasources::open_meteo::ARCHIVE_API_URL;
use crate::datasources::{CropCatalog, CropDatabase};
use crate::error::{AgriWaterError, Result};
use crate::logic::FieldRequest;
use crate::models::{MissingDataPolicy, DEFAULT_EFFICIENCY};
use dialoguer::{Input, Select};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub field: FieldConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub crops: CropsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationConfig {
    /// Places offered by `agriwater init`.
    pub const PRESETS: [(&'static str, f64, f64); 4] = [
        ("Montpellier, France", 43.6109, 3.8772),
        ("Paris, France", 48.8566, 2.3522),
        ("Lyon, France", 45.7640, 4.8357),
        ("Toulouse, France", 43.6047, 1.4442),
    ];

    /// Name if configured, otherwise the coordinates.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        let (name, latitude, longitude) = Self::PRESETS[0];
        Self {
            name: Some(name.into()),
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldConfig {
    pub crop: String,
    #[serde(default = "default_stage")]
    pub stage: String,
    #[serde(default = "default_surface")]
    pub surface_ha: f64,
}

fn default_stage() -> String {
    "mid_season".into()
}

fn default_surface() -> f64 {
    1.0
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            crop: "tomato".into(),
            stage: default_stage(),
            surface_ha: default_surface(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Defaults to the crop's maximum irrigation interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_days: Option<u32>,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default = "default_policy")]
    pub missing_data_policy: String,
}

fn default_efficiency() -> f64 {
    DEFAULT_EFFICIENCY
}

fn default_policy() -> String {
    MissingDataPolicy::default().as_str().into()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period_days: None,
            efficiency: default_efficiency(),
            missing_data_policy: default_policy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeatherConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    ARCHIVE_API_URL.into()
}

fn default_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CropsConfig {
    /// Alternative crop database; the bundled one is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn check_crop(crops: &CropDatabase, crop: &str) -> std::result::Result<(), String> {
    if crops.crop_exists(crop) {
        Ok(())
    } else {
        Err(format!(
            "Unknown crop '{}'. Available crops: {}",
            crop,
            crops.available_crops().join(", ")
        ))
    }
}

fn check_stage(crops: &CropDatabase, crop: &str, stage: &str) -> std::result::Result<(), String> {
    if crops.stage_exists(crop, stage) {
        Ok(())
    } else {
        Err(format!("Unknown stage '{}' for {}", stage, crop))
    }
}

impl Config {
    /// Load from `config_override`, else the first config found in the
    /// standard locations, else built-in defaults.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(AgriWaterError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p
            }
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::info!("No config file found, using built-in defaults");
                    return Ok(Self::default());
                }
            },
        };

        tracing::debug!("Loading config from {}", config_path.display());
        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| AgriWaterError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&Self::substitute_env_vars(&config_str))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AgriWaterError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Search for config.yaml in standard locations.
    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("agriwater").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Default path for writing new config files (~/.config/agriwater/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgriWaterError::Config("Cannot determine config directory".into()))?
            .join("agriwater");
        Ok(config_dir.join("config.yaml"))
    }

    /// The field as the orchestrator expects it.
    pub fn field_request(&self) -> FieldRequest {
        FieldRequest {
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            crop: self.field.crop.clone(),
            stage: self.field.stage.clone(),
            surface_ha: self.field.surface_ha,
            missing_data_policy: self.analysis.missing_data_policy.clone(),
        }
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the new Config and the path it was written to.
    pub fn setup_interactive(crops: &CropDatabase) -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up AgriWater!");
        println!();

        // --- Location ---
        println!("Location");
        let mut choices: Vec<&str> = LocationConfig::PRESETS.iter().map(|p| p.0).collect();
        choices.push("Custom coordinates");
        let choice = Select::new()
            .with_prompt("  Field location")
            .items(&choices)
            .default(0)
            .interact()
            .map_err(|e| AgriWaterError::Config(format!("Input error: {}", e)))?;

        let location = match LocationConfig::PRESETS.get(choice) {
            Some(&(name, latitude, longitude)) => LocationConfig {
                name: Some(name.into()),
                latitude,
                longitude,
            },
            None => {
                let latitude: f64 = Input::new()
                    .with_prompt("  Latitude")
                    .default(43.6109)
                    .interact_text()
                    .map_err(|e| AgriWaterError::Config(format!("Input error: {}", e)))?;

                let longitude: f64 = Input::new()
                    .with_prompt("  Longitude")
                    .default(3.8772)
                    .interact_text()
                    .map_err(|e| AgriWaterError::Config(format!("Input error: {}", e)))?;

                LocationConfig {
                    name: None,
                    latitude,
                    longitude,
                }
            }
        };

        println!();

        // --- Field ---
        println!("Field");
        let crop: String = Input::new()
            .with_prompt(format!("  Crop ({})", crops.available_crops().join(", ")))
            .default(FieldConfig::default().crop)
            .validate_with(|input: &String| check_crop(crops, input))
            .interact_text()
            .map_err(|e| AgriWaterError::Config(format!("Input error: {}", e)))?;
        let crop = crop.to_lowercase();

        let stage: String = Input::new()
            .with_prompt("  Stage (initial, development, mid_season, late_season)")
            .default(default_stage())
            .validate_with(|input: &String| check_stage(crops, &crop, input))
            .interact_text()
            .map_err(|e| AgriWaterError::Config(format!("Input error: {}", e)))?;

        let surface_ha: f64 = Input::new()
            .with_prompt("  Surface (ha)")
            .default(default_surface())
            .interact_text()
            .map_err(|e| AgriWaterError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- Analysis ---
        println!("Analysis");
        let efficiency: f64 = Input::new()
            .with_prompt("  Irrigation efficiency (0-1]")
            .default(DEFAULT_EFFICIENCY)
            .interact_text()
            .map_err(|e| AgriWaterError::Config(format!("Input error: {}", e)))?;

        let policy_labels: Vec<String> = MissingDataPolicy::NAMES
            .iter()
            .filter_map(|name| name.parse::<MissingDataPolicy>().ok())
            .map(|p| format!("{:<12} {}", p.as_str(), p.description()))
            .collect();
        let policy_index = Select::new()
            .with_prompt("  Missing data policy")
            .items(&policy_labels)
            .default(0)
            .interact()
            .map_err(|e| AgriWaterError::Config(format!("Input error: {}", e)))?;
        let missing_data_policy = MissingDataPolicy::NAMES
            .get(policy_index)
            .map(|name| name.to_string())
            .unwrap_or_else(default_policy);

        println!();

        let config = Config {
            location,
            field: FieldConfig {
                crop,
                stage,
                surface_ha,
            },
            analysis: AnalysisConfig {
                period_days: None,
                efficiency,
                missing_data_policy,
            },
            ..Default::default()
        };

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| AgriWaterError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# AgriWater Configuration\n# Generated by `agriwater init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .expect("placeholder pattern is valid");

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}
