//! AI Studio - a terminal chat studio backed by a mock AI responder
//!
//! The heart of the crate is [`synth::ResponseSynthesizer`], which turns a prompt
//! and generation parameters into canned, keyword-driven text after an
//! artificial delay. Around it sit chat state, notes, file storage, keyword search
//! and the CLI.

// Allow certain clippy warnings that are stylistic
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped helpers are fine
#![allow(clippy::option_as_ref_cloned)] // .as_ref().cloned() is sometimes clearer

pub mod chat;
pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod files;
pub mod logger;
pub mod messages;
pub mod models;
pub mod notes;
pub mod notification;
pub mod search;
pub mod synth;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use models::ModelId;
pub use notification::Notification;
pub use synth::{GenerationParams, ResponseSynthesizer};
