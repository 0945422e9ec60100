//! Text-to-speech generation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::info;

use crate::api::{AccountClient, SpeechRequest};
use crate::config::voices;
use crate::session::SessionStore;

/// Longest text accepted, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Accepted speed multiplier range.
pub const SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.5..=2.0;

/// Input rejected before contacting the service.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Please enter some text to convert")]
    EmptyText,

    #[error("Text is too long ({len} characters, maximum is {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("Unknown voice '{0}'. Run with --list-voices to see available voices")]
    UnknownVoice(String),

    #[error("Speed must be between 0.5 and 2.0, got {0}")]
    SpeedOutOfRange(f32),

    #[error("No generations remaining. Run 'tts-client pricing' to get more")]
    NoTokensRemaining,
}

/// Check a generation request against local limits and the cached balance.
pub fn validate(text: &str, voice: &str, speed: f32, tokens_remaining: u32) -> Result<(), InputError> {
    if text.trim().is_empty() {
        return Err(InputError::EmptyText);
    }

    let len = text.chars().count();
    if len > MAX_TEXT_CHARS {
        return Err(InputError::TextTooLong { len, max: MAX_TEXT_CHARS });
    }

    if voices::get_voice(voice).is_none() {
        return Err(InputError::UnknownVoice(voice.to_string()));
    }

    if !SPEED_RANGE.contains(&speed) {
        return Err(InputError::SpeedOutOfRange(speed));
    }

    if tokens_remaining == 0 {
        return Err(InputError::NoTokensRemaining);
    }

    Ok(())
}

/// Resolve the text from either `--text` or `--file`.
pub async fn read_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => tokio::fs::read_to_string(&path).await.with_context(|| format!("Failed to read text from {}", path.display())),
        (None, None) => Err(InputError::EmptyText.into()),
    }
}

/// Generate speech for `text`, save it to `output` and refresh the balance.
///
/// # Errors
/// Returns an `InputError` if validation fails, or the service's message if generation fails.
pub async fn run(store: &SessionStore, client: &AccountClient, text: &str, voice: &str, speed: f32, output: &Path) -> Result<()> {
    validate(text, voice, speed, store.tokens_remaining())?;

    info!("🎙️  Generating speech with voice {} at {}x", voice, speed);

    let request = SpeechRequest { text, voice, speed };
    let audio = client.generate_speech(&request, &store.device_id()).await?;

    tokio::fs::write(output, &audio).await.with_context(|| format!("Failed to write audio to {}", output.display()))?;
    info!("💾 Saved {} bytes to {}", audio.len(), output.display());

    store.refresh().await;
    Ok(())
}
