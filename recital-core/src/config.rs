//! Practice configuration (JSON file, all fields optional).

use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RecitalError, Result};
use crate::matching::DEFAULT_PARTIAL_THRESHOLD;
use crate::recognition::RestartPolicy;

const DEFAULT_SENTENCE_PAUSE_MS: u64 = 300;
const MAX_SENTENCE_PAUSE_MS: u64 = 5_000;
const MIN_RATE: f32 = 0.1;
const MAX_RATE: f32 = 4.0;

/// Voice parameters passed to the synthesis backend with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct VoiceSettings {
    /// Backend-specific voice identifier; `None` uses the backend default.
    pub voice_id: Option<String>,
    /// Speaking rate multiplier, 1.0 = normal.
    pub rate: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice_id: None,
            rate: 1.0,
        }
    }
}

impl VoiceSettings {
    pub fn normalize(&mut self) {
        self.rate = if self.rate.is_finite() {
            self.rate.clamp(MIN_RATE, MAX_RATE)
        } else {
            1.0
        };
        self.voice_id = self
            .voice_id
            .as_ref()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct PracticeConfig {
    /// Pause inserted between sentences during `speak_all`.
    pub sentence_pause_ms: u64,
    pub voice: VoiceSettings,
    /// Word-mode similarity at or above which a word is `Partial`.
    pub partial_threshold: f64,
    /// Speak the next sentence when the practice controller advances.
    pub auto_cue_next: bool,
    pub recognition: RestartPolicy,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            sentence_pause_ms: DEFAULT_SENTENCE_PAUSE_MS,
            voice: VoiceSettings::default(),
            partial_threshold: DEFAULT_PARTIAL_THRESHOLD,
            auto_cue_next: true,
            recognition: RestartPolicy::default(),
        }
    }
}

impl PracticeConfig {
    pub fn normalize(&mut self) {
        self.sentence_pause_ms = self.sentence_pause_ms.min(MAX_SENTENCE_PAUSE_MS);
        self.voice.normalize();
        self.partial_threshold = if self.partial_threshold.is_finite() {
            self.partial_threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_PARTIAL_THRESHOLD
        };
        self.recognition.normalize();
    }

    /// Inter-sentence pause. `RECITAL_SENTENCE_PAUSE_MS` overrides the
    /// configured value when set.
    pub fn sentence_pause(&self) -> Duration {
        let ms = env_sentence_pause_ms().unwrap_or(self.sentence_pause_ms);
        Duration::from_millis(ms)
    }
}

fn env_sentence_pause_ms() -> Option<u64> {
    static PAUSE_MS: OnceLock<Option<u64>> = OnceLock::new();
    *PAUSE_MS.get_or_init(|| {
        std::env::var("RECITAL_SENTENCE_PAUSE_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|v| v.min(MAX_SENTENCE_PAUSE_MS))
    })
}

/// Parse and normalise a config document. Unknown fields are ignored,
/// missing ones take their defaults.
///
/// # Errors
/// `RecitalError::Config` when the document is not valid config JSON.
pub fn parse_config(raw: &str) -> Result<PracticeConfig> {
    let mut config: PracticeConfig =
        serde_json::from_str(raw).map_err(|e| RecitalError::Config(e.to_string()))?;
    config.normalize();
    Ok(config)
}

/// Load config from `path`, falling back to defaults when the file is
/// missing or unreadable.
pub fn load_config(path: &Path) -> PracticeConfig {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return PracticeConfig::default(),
    };
    parse_config(&raw).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "invalid practice config — using defaults");
        PracticeConfig::default()
    })
}

pub fn save_config(path: &Path, config: &PracticeConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}
