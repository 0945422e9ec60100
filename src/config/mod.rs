//! Configuration module for the TTS client.
//!
//! Provides CLI argument parsing, pricing tiers and the voice catalogue.

#[allow(clippy::module_inception)]
mod config;
pub mod voices;

pub use config::{AppConfig, Command, Tier};
