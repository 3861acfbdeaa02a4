//! Chat state and turn handling.
//!
//! Holds the transcript, guards against overlapping submissions and turns
//! backend failures into a notification instead of an error.

use crate::config::{GenerationSettings, SettingsError, SettingsUpdate};
use crate::models::ModelId;
use crate::notification::Notification;
use crate::synth::{GenerationParams, ResponseSynthesizer};
use crate::{log_debug, log_error};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title of the notification shown when a reply cannot be generated
pub const GENERATION_FAILED_TITLE: &str = "Error";
/// Description of the notification shown when a reply cannot be generated
pub const GENERATION_FAILED_DESCRIPTION: &str = "Failed to generate AI response. Please try again.";

// ═══════════════════════════════════════════════════════════════════════════════
// Chat Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Role in a chat conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Why a submission was not accepted
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("A response is already being generated")]
    Busy,
    #[error("Message is empty")]
    EmptyMessage,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Chat State
// ═══════════════════════════════════════════════════════════════════════════════

/// Transcript plus the pending flag
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    messages: Vec<ChatMessage>,
    is_responding: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_responding(&self) -> bool {
        self.is_responding
    }

    /// Append a user message
    pub fn add_user_message(&mut self, content: &str) -> &ChatMessage {
        self.push(ChatMessage::user(content))
    }

    /// Append an assistant reply and leave the pending state
    pub fn add_assistant_response(&mut self, content: &str) -> &ChatMessage {
        self.is_responding = false;
        self.push(ChatMessage::assistant(content))
    }

    /// Drop the whole transcript
    pub fn clear(&mut self) {
        self.messages.clear();
        self.is_responding = false;
    }

    fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        let last = self.messages.len() - 1;
        &self.messages[last]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Backend seam
// ═══════════════════════════════════════════════════════════════════════════════

/// Anything that can answer a prompt
#[async_trait]
pub trait ResponseBackend: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> anyhow::Result<String>;
}

#[async_trait]
impl ResponseBackend for ResponseSynthesizer {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> anyhow::Result<String> {
        Ok(self.respond(prompt, params).await)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════════════

/// A turn that has been accepted and is waiting for its reply
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTurn {
    pub prompt: String,
    pub params: GenerationParams,
}

/// Result of a completed turn
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Replied(ChatMessage),
    Failed(Notification),
}

/// A conversation with one backend, the selected model and its settings
pub struct ChatSession<B> {
    backend: B,
    state: ChatState,
    model: ModelId,
    settings: GenerationSettings,
}

impl<B: ResponseBackend> ChatSession<B> {
    pub fn new(backend: B, model: ModelId, settings: GenerationSettings) -> Self {
        Self {
            backend,
            state: ChatState::new(),
            model,
            settings,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    /// Partial settings update, validated against the settings-panel ranges
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<bool, SettingsError> {
        self.settings.apply(update)
    }

    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Accept a submission: append it and mark the session pending
    pub fn begin_turn(&mut self, content: &str) -> Result<PendingTurn, ChatError> {
        if self.state.is_responding {
            return Err(ChatError::Busy);
        }
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.state.add_user_message(content);
        self.state.is_responding = true;
        Ok(PendingTurn {
            prompt: content.to_string(),
            params: self.settings.params_for(self.model),
        })
    }

    /// Record the backend's answer for the pending turn
    pub fn finish_turn(&mut self, result: anyhow::Result<String>) -> SendOutcome {
        match result {
            Ok(reply) => {
                let message = self.state.add_assistant_response(&reply).clone();
                SendOutcome::Replied(message)
            }
            Err(e) => {
                log_error!("Error generating response: {:#}", e);
                self.state.is_responding = false;
                SendOutcome::Failed(Notification::error(
                    GENERATION_FAILED_TITLE,
                    GENERATION_FAILED_DESCRIPTION,
                ))
            }
        }
    }

    /// Submit a message and wait for the reply
    pub async fn send(&mut self, content: &str) -> Result<SendOutcome, ChatError> {
        let turn = self.begin_turn(content)?;
        log_debug!(
            "Sending message to model {} ({} messages in transcript)",
            turn.params.model_id,
            self.state.messages.len()
        );
        let result = self.backend.generate(&turn.prompt, &turn.params).await;
        Ok(self.finish_turn(result))
    }
}
