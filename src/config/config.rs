//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::voices;

/// File name used for downloaded speech.
const DEFAULT_AUDIO_FILE: &str = "murf-tts-audio.mp3";

/// Purchasable pricing tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// One-off pack of 50 generations
    Starter,
    /// One-off pack of 150 generations
    Pro,
    /// Monthly subscription without a generation cap
    Unlimited,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_product_id())
    }
}

impl Tier {
    /// Product identifier understood by the checkout endpoint.
    pub fn as_product_id(&self) -> &'static str {
        match self {
            Tier::Starter => "starter",
            Tier::Pro => "pro",
            Tier::Unlimited => "unlimited",
        }
    }
}

/// Action to run once the device session is initialized.
#[derive(Subcommand, Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    /// Show the device identifier and remaining generations
    Status,

    /// Convert text to speech and save the audio
    Generate {
        /// Text to speak
        #[arg(long, short = 't', conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,

        /// Read the text to speak from a file
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// Voice id (see --list-voices)
        #[arg(long, default_value = voices::DEFAULT_VOICE)]
        voice: String,

        /// Speech speed multiplier (0.5 - 2.0)
        #[arg(long, default_value = "1.0")]
        speed: f32,

        /// Where to write the generated audio
        #[arg(long, short = 'o', default_value_os_t = default_output_path())]
        output: PathBuf,
    },

    /// List pricing tiers
    Pricing,

    /// Start a checkout session for a pricing tier
    Checkout {
        /// Tier to purchase
        #[arg(value_enum)]
        tier: Tier,

        /// Purchase even if this device could not be identified. Credits go to a throwaway id
        /// that later runs will not see.
        #[arg(long)]
        allow_fallback_id: bool,
    },

    /// Refresh the balance after returning from a completed checkout
    PaymentSuccess {
        /// Time to give the payment webhook before refreshing, in milliseconds
        #[arg(long, default_value = "2000")]
        delay_ms: u64,
    },
}

/// Client configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "tts-client")]
#[command(author, version, about = "Text-to-speech client with device token balance and checkout", long_about = None)]
pub struct AppConfig {
    /// List all available voices and exit
    #[arg(long)]
    pub list_voices: bool,

    /// Show detailed information about a specific voice and exit
    #[arg(long)]
    pub voice_info: Option<String>,

    /// Base URL of the account service API
    #[arg(long, short = 'u', env = "TTS_API_URL", default_value = "http://localhost:8000/api/v1")]
    pub api_url: String,

    /// Public site origin the payment provider returns to after checkout
    #[arg(long, env = "TTS_SITE_URL", default_value = "http://localhost:5173")]
    pub site_url: String,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        let config = Self::parse();

        // Handle voice listing commands
        if config.list_voices {
            voices::print_voices();
            std::process::exit(0);
        }

        if let Some(ref voice_id) = config.voice_info {
            match voices::print_voice_info(voice_id) {
                Ok(_) => std::process::exit(0),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// URL the payment provider redirects to once checkout completes.
    pub fn success_url(&self) -> String {
        format!("{}/payment/success", self.site_url.trim_end_matches('/'))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        for (label, url) in [("API URL", &self.api_url), ("Site URL", &self.site_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{} must start with http:// or https://, got '{}'", label, url);
            }
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Configuration:");
        info!("  API URL: {}", self.api_url);
        info!("  Site URL: {}", self.site_url);
        if let Some(ref command) = self.command {
            info!("  Command: {:?}", command);
        }
    }
}

/// Get the default audio output path (~/Downloads/murf-tts-audio.mp3).
fn default_output_path() -> PathBuf {
    if let Some(download_dir) = dirs::download_dir() {
        download_dir.join(DEFAULT_AUDIO_FILE)
    } else {
        PathBuf::from(DEFAULT_AUDIO_FILE)
    }
}
