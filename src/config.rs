use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::pipeline::Limits;

/// Caption languages tried in order when the config does not say otherwise
pub const DEFAULT_LANGUAGES: &[&str] = &["ko", "en"];

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: Option<String>,
    pub format: Option<String>,
    pub languages: Option<Vec<String>>,
    pub min_transcript_chars: Option<usize>,
    pub max_transcript_chars: Option<usize>,
    pub max_comments: Option<usize>,
    pub youtube_api_key: Option<String>,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn limits(&self) -> Limits {
        let defaults = Limits::default();
        Limits {
            min_transcript_chars: self.min_transcript_chars.unwrap_or(defaults.min_transcript_chars),
            max_transcript_chars: self.max_transcript_chars.unwrap_or(defaults.max_transcript_chars),
            max_comments: self.max_comments.unwrap_or(defaults.max_comments),
        }
        .sanitized()
    }

    pub fn languages(&self) -> Vec<String> {
        match &self.languages {
            Some(langs) if !langs.is_empty() => langs.clone(),
            _ => DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Config value first, then `YOUTUBE_API_KEY`
    pub fn youtube_api_key(&self) -> Option<String> {
        self.youtube_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("YOUTUBE_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}
