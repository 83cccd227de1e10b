use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::models::{Language, SettingKey};

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Catch the small spends that leak out of your day.
#[derive(Debug, Parser)]
#[command(name = "axiony", version)]
pub struct Cli {
    /// Directory holding transactions, settings and language
    #[arg(long, env = "AXIONY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Gemini API key; without one every entry falls back to the typed text
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "AXIONY_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    #[arg(long, env = "AXIONY_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    /// Seconds to wait for the model before giving up on a request
    #[arg(long, env = "AXIONY_TIMEOUT_SECS", default_value_t = 20, global = true)]
    pub timeout_secs: u64,

    /// error, warn, info, debug or trace
    #[arg(long, env = "AXIONY_LOG", default_value = "error", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log a spend from free text, e.g. `axiony add 45 for chai`
    Add {
        text: Vec<String>,
        /// Receipt photo to attach
        #[arg(long)]
        image: Option<PathBuf>
    },
    /// Log a spend from a receipt photo or payment screenshot
    Photo {
        path: PathBuf,
        /// Text to fall back on if the photo cannot be read
        #[arg(long, default_value = "")]
        note: String
    },
    /// Log a spend from a voice note
    Voice {
        path: PathBuf,
        #[arg(long)]
        mime: Option<String>
    },
    /// Ingest a simulated bank SMS
    Sms,
    /// Remove a transaction by id
    Delete {
        id: String
    },
    /// Print all transactions, newest first, as CSV
    List,
    /// Print today's total, the weekly projection and the leakage score
    Stats,
    /// Print spend per category as CSV
    Breakdown,
    /// Print a one-sentence insight about recent spends
    Insight,
    /// Show settings, or flip one
    Settings {
        key: Option<SettingKey>
    },
    /// Show the language, or change it
    Lang {
        code: Option<Language>
    }
}

impl Cli {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".axiony")
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn log_filter(&self) -> LevelFilter {
        parse_log_level(&self.log_level)
    }
}

pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

/// Mime type for a capture file, from its extension.
pub fn mime_for_path(path: &std::path::Path) -> &'static str {
    let extension = path.extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "webm" => "audio/webm",
        "ogg" | "oga" => "audio/ogg",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream"
    }
}
