use crate::config::{Config, SettingsUpdate};
use crate::models::ModelId;
use anyhow::Result;
use clap::Args;

#[derive(Args, Clone, Default, Debug)]
pub struct CommonParams {
    /// Override the selected model
    #[arg(short, long, help = "Override the selected model", value_parser = available_models_parser)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(short, long, help = "Sampling temperature (0.0 - 2.0)")]
    pub temperature: Option<f32>,

    /// Maximum output length (50 - 1000, steps of 50)
    #[arg(long, help = "Maximum output length (50 - 1000, steps of 50)")]
    pub max_tokens: Option<u32>,

    /// Nucleus sampling mass (0.0 - 1.0)
    #[arg(long, help = "Nucleus sampling mass (0.0 - 1.0)")]
    pub top_p: Option<f32>,

    /// Seed template selection for reproducible replies
    #[arg(long, help = "Seed template selection for reproducible replies")]
    pub seed: Option<u64>,

    /// Skip the artificial response delay
    #[arg(long, help = "Skip the artificial response delay")]
    pub instant: bool,
}

impl CommonParams {
    /// Settings part of these parameters
    pub fn settings_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        }
    }

    /// Layer these overrides onto `config`. Returns true if anything changed.
    pub fn apply_to_config(&self, config: &mut Config) -> Result<bool> {
        let mut changes_made = false;

        if let Some(model_str) = &self.model {
            let model: ModelId = model_str.parse()?;
            if config.model != model {
                config.model = model;
                changes_made = true;
            }
        }

        changes_made |= config.generation.apply(self.settings_update())?;

        if let Some(seed) = self.seed
            && config.performance.seed != Some(seed)
        {
            config.performance.seed = Some(seed);
            changes_made = true;
        }

        if self.instant && config.performance.response_delay_ms != 0 {
            config.performance.response_delay_ms = 0;
            changes_made = true;
        }

        Ok(changes_made)
    }
}

/// Validates that a model id is in the catalog
pub fn available_models_parser(s: &str) -> Result<String, String> {
    match s.parse::<ModelId>() {
        Ok(model) => Ok(model.id().to_string()),
        Err(_) => Err(format!(
            "Invalid model '{}'. Available models: {}",
            s,
            ModelId::all_ids().join(", ")
        )),
    }
}
