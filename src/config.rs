use crate::log_debug;
use crate::models::ModelId;
use crate::synth::{
    DEFAULT_RESPONSE_DELAY, GenerationParams, NoDelay, ResponseSynthesizer, SeededRandom,
};

use anyhow::{Context, Result, anyhow};
use dirs::{config_dir, data_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the configured search API key
pub const SEARCH_API_KEY_ENV: &str = "AI_STUDIO_SEARCH_API_KEY";

/// Default keyword-search endpoint (Google Custom Search JSON API)
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Temperature slider bounds and step
pub const TEMPERATURE_RANGE: (f32, f32, f32) = (0.0, 2.0, 0.1);
/// Top-p slider bounds and step
pub const TOP_P_RANGE: (f32, f32, f32) = (0.0, 1.0, 0.05);
/// Max output length slider bounds and step
pub const MAX_TOKENS_RANGE: (u32, u32, u32) = (50, 1000, 50);

/// Configuration structure for AI Studio
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Model selected in the settings panel
    #[serde(default)]
    pub model: ModelId,
    /// Generation parameters
    #[serde(default)]
    pub generation: GenerationSettings,
    /// Keyword search endpoint and credentials
    #[serde(default)]
    pub search: SearchConfig,
    /// Notes storage
    #[serde(default)]
    pub notes: NotesConfig,
    /// File storage
    #[serde(default)]
    pub files: FilesConfig,
    /// Response timing and reproducibility
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Generation parameters as edited in the settings panel
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Shown and persisted, but has no effect on the mock responder
    pub top_p: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: 250,
            top_p: 0.9,
        }
    }
}

/// Partial update of [`GenerationSettings`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SettingsUpdate {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

/// A settings value outside the range the settings panel allows
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("Temperature must be between {min} and {max}, got {value}")]
    Temperature { value: f32, min: f32, max: f32 },
    #[error("Top P must be between {min} and {max}, got {value}")]
    TopP { value: f32, min: f32, max: f32 },
    #[error("Max output length must be between {min} and {max}, got {value}")]
    MaxTokens { value: u32, min: u32, max: u32 },
    #[error("Max output length moves in steps of {step}, got {value}")]
    MaxTokensStep { value: u32, step: u32 },
}

impl GenerationSettings {
    /// Check every field against the settings-panel ranges
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_temperature(self.temperature)?;
        validate_top_p(self.top_p)?;
        validate_max_tokens(self.max_tokens)?;
        Ok(())
    }

    /// Apply a partial update. Nothing changes unless every new value is valid.
    /// Temperature and top-p snap to the nearest slider step.
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<bool, SettingsError> {
        let mut next = *self;
        if let Some(t) = update.temperature {
            next.temperature = validate_temperature(t)?;
        }
        if let Some(n) = update.max_tokens {
            next.max_tokens = validate_max_tokens(n)?;
        }
        if let Some(p) = update.top_p {
            next.top_p = validate_top_p(p)?;
        }
        let changed = next != *self;
        *self = next;
        Ok(changed)
    }

    /// Parameters for one synthesis call with `model`
    pub fn params_for(&self, model: ModelId) -> GenerationParams {
        GenerationParams::new(model.id(), self.temperature, self.max_tokens)
    }
}

/// Round to the nearest multiple of `step`
fn snap(value: f32, step: f32) -> f32 {
    let per_unit = (1.0 / step).round();
    (value * per_unit).round() / per_unit
}

fn validate_temperature(value: f32) -> Result<f32, SettingsError> {
    let (min, max, step) = TEMPERATURE_RANGE;
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(snap(value, step))
    } else {
        Err(SettingsError::Temperature { value, min, max })
    }
}

fn validate_top_p(value: f32) -> Result<f32, SettingsError> {
    let (min, max, step) = TOP_P_RANGE;
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(snap(value, step))
    } else {
        Err(SettingsError::TopP { value, min, max })
    }
}

fn validate_max_tokens(value: u32) -> Result<u32, SettingsError> {
    let (min, max, step) = MAX_TOKENS_RANGE;
    if !(min..=max).contains(&value) {
        return Err(SettingsError::MaxTokens { value, min, max });
    }
    if (value - min) % step != 0 {
        return Err(SettingsError::MaxTokensStep { value, step });
    }
    Ok(value)
}

/// Keyword search configuration
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    /// Search engine id (`cx`)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub engine_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            engine_id: String::new(),
            api_key: String::new(),
            timeout_seconds: 15,
        }
    }
}

impl SearchConfig {
    /// Configured key, unless the environment provides one
    pub fn effective_api_key(&self) -> String {
        std::env::var(SEARCH_API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| self.api_key.clone())
    }
}

/// Notes storage configuration
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NotesConfig {
    /// Identity used to partition notes
    pub user_id: String,
    /// Override for the notes file; defaults to the platform data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            path: None,
        }
    }
}

impl NotesConfig {
    /// Resolved notes file path
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let mut path = data_dir().ok_or_else(|| anyhow!("Unable to determine data directory"))?;
        path.push("ai-studio");
        path.push("notes.json");
        Ok(path)
    }
}

/// File storage configuration
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct FilesConfig {
    /// Override for the storage root; defaults to the platform data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl FilesConfig {
    /// Resolved storage root; each user gets a folder below it
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let mut path = data_dir().ok_or_else(|| anyhow!("Unable to determine data directory"))?;
        path.push("ai-studio");
        path.push("files");
        Ok(path)
    }
}

/// Response timing and reproducibility
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Artificial latency before a reply resolves
    pub response_delay_ms: u64,
    /// Seed for template selection; random when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Whether to include HTTP client logs
    pub verbose_logging: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: u64::try_from(DEFAULT_RESPONSE_DELAY.as_millis()).unwrap_or(1500),
            seed: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// Load the configuration from the user config directory
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let config = Self::load_from(&config_path)?;
        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Load from an explicit path; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            anyhow!(
                "Invalid configuration file format: {}. Please check {} for syntax errors.",
                e,
                path.display()
            )
        })?;
        config
            .generation
            .validate()
            .with_context(|| format!("Invalid generation settings in {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration to the user config directory
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        log_debug!("Configuration saved: {:?}", self);
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("ai-studio");
        path.push("config.toml");
        Ok(path)
    }

    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.performance.response_delay_ms)
    }

    /// Parameters for a synthesis call with the selected model
    pub fn generation_params(&self) -> GenerationParams {
        self.generation.params_for(self.model)
    }

    /// Build a synthesizer honouring the configured latency and seed
    pub fn build_synthesizer(&self) -> ResponseSynthesizer {
        let mut synth = ResponseSynthesizer::new().with_latency(self.response_delay());
        if let Some(seed) = self.performance.seed {
            synth = synth.with_random(SeededRandom::new(seed));
        }
        if self.performance.response_delay_ms == 0 {
            synth = synth.with_delay(NoDelay);
        }
        synth
    }
}
