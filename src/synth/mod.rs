//! Mock response synthesizer.
//!
//! Turns a prompt plus generation parameters into canned text. Keyword rules
//! are tried in priority order; a prompt no rule claims gets an echo template
//! shaped by the model, the requested length and the temperature.

pub mod delay;
pub mod random;
pub mod rules;
pub mod templates;

pub use delay::{DEFAULT_RESPONSE_DELAY, Delay, NoDelay, TokioDelay};
pub use random::{FixedIndex, RandomSource, SeededRandom, ThreadRandom};
pub use rules::{KeywordRule, Reply, ResponseRule, builtin_rules};

use crate::log_debug;
use crate::models::ModelId;
use random::choose;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use templates::{
    CREATIVE, CREATIVE_MIN_TEMPERATURE, ECHO_TEMPLATES, ELABORATION, ELABORATION_MIN_TOKENS,
    PARAGRAPH_BREAK, PRECISE, PRECISE_MAX_TEMPERATURE,
};
use tokio_util::sync::CancellationToken;

/// Knobs that shape a synthesized reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationParams {
    pub fn new(model_id: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model_id: model_id.into(),
            temperature,
            max_tokens,
        }
    }
}

/// Keyword-driven mock responder
pub struct ResponseSynthesizer {
    rules: Vec<Box<dyn ResponseRule>>,
    rng: Arc<dyn RandomSource>,
    delay: Arc<dyn Delay>,
    latency: Duration,
}

impl Default for ResponseSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResponseSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSynthesizer")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl ResponseSynthesizer {
    /// Built-in rules, thread RNG and a 1.5 second timer delay
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
            rng: Arc::new(ThreadRandom),
            delay: Arc::new(TokioDelay),
            latency: DEFAULT_RESPONSE_DELAY,
        }
    }

    /// Replace the keyword table. The echo fallback always runs last.
    pub fn with_rules(mut self, rules: Vec<Box<dyn ResponseRule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Arc::new(rng);
        self
    }

    pub fn with_delay(mut self, delay: impl Delay + 'static) -> Self {
        self.delay = Arc::new(delay);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Wait out the artificial latency, then compose a reply.
    ///
    /// Never fails: every input produces some text.
    pub async fn synthesize(
        &self,
        prompt: &str,
        model_id: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> String {
        log_debug!(
            "Generating response with model: {}, temp: {}, tokens: {}",
            model_id,
            temperature,
            max_tokens
        );
        self.delay.wait(self.latency).await;
        self.compose_parts(prompt, model_id, temperature, max_tokens)
    }

    /// Same as [`Self::synthesize`] with the parameters bundled
    pub async fn respond(&self, prompt: &str, params: &GenerationParams) -> String {
        self.synthesize(prompt, &params.model_id, params.temperature, params.max_tokens)
            .await
    }

    /// Like [`Self::respond`], but gives up if `token` is cancelled during the
    /// latency window. Returns `None` only on cancellation.
    pub async fn synthesize_cancellable(
        &self,
        prompt: &str,
        params: &GenerationParams,
        token: &CancellationToken,
    ) -> Option<String> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                log_debug!("Response generation cancelled before completion");
                None
            }
            reply = self.respond(prompt, params) => Some(reply),
        }
    }

    /// Compose a reply without waiting
    pub fn compose(&self, prompt: &str, params: &GenerationParams) -> String {
        self.compose_parts(prompt, &params.model_id, params.temperature, params.max_tokens)
    }

    fn compose_parts(
        &self,
        prompt: &str,
        model_id: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> String {
        let lowered = prompt.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|r| r.matches(&lowered)) {
            tracing::debug!(rule = rule.name(), "keyword rule matched");
            return rule.respond(self.rng.as_ref());
        }
        self.compose_generic(prompt, model_id, temperature, max_tokens)
    }

    fn compose_generic(
        &self,
        prompt: &str,
        model_id: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> String {
        let mut response = choose(self.rng.as_ref(), &ECHO_TEMPLATES)
            .map(|t| t.render(prompt))
            .unwrap_or_default();

        if let Some(model) = ModelId::from_id(model_id) {
            response.push_str(PARAGRAPH_BREAK);
            response.push_str(model.flavor());
        }

        if max_tokens > ELABORATION_MIN_TOKENS {
            response.push_str(PARAGRAPH_BREAK);
            response.push_str(ELABORATION);
        }

        if temperature > CREATIVE_MIN_TEMPERATURE {
            response.push_str(PARAGRAPH_BREAK);
            response.push_str(CREATIVE);
        } else if temperature < PRECISE_MAX_TEMPERATURE {
            response.push_str(PARAGRAPH_BREAK);
            response.push_str(PRECISE);
        }

        response
    }
}
