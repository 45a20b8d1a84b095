//! Host configuration
//!
//! Loaded once at startup from JSON (a file for the native runner, an inline
//! `<script type="application/json" id="pong-settings">` block in the browser).
//! Missing fields take their defaults. Nothing is written back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tuning::Tuning;

/// Id of the inline settings element in the page
pub const SETTINGS_ELEMENT_ID: &str = "pong-settings";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Game balance
    pub tuning: Tuning,

    // === Audio ===
    /// Start muted
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Leaderboard ===
    /// Base URL of the leaderboard API; no online leaderboard when unset
    pub leaderboard_url: Option<String>,

    /// Fixed RNG seed; taken from the clock when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            muted: false,
            master_volume: 0.8,
            leaderboard_url: None,
            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    /// Pull every value into range
    pub fn validated(mut self) -> Self {
        self.tuning = self.tuning.validated();

        if !(0.0..=1.0).contains(&self.master_volume) {
            let clamped = if self.master_volume.is_nan() {
                0.0
            } else {
                self.master_volume.clamp(0.0, 1.0)
            };
            log::warn!("master_volume {} out of range, using {}", self.master_volume, clamped);
            self.master_volume = clamped;
        }

        if let Some(url) = &self.leaderboard_url {
            let trimmed = url.trim();
            if trimmed.is_empty() {
                self.leaderboard_url = None;
            } else if trimmed.len() != url.len() {
                self.leaderboard_url = Some(trimmed.to_string());
            }
        }

        self
    }

    /// Read the inline settings block, falling back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(SETTINGS_ELEMENT_ID))
            .and_then(|el| el.text_content());

        match json {
            Some(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from page");
                    settings
                }
                Err(e) => {
                    log::warn!("{}; using defaults", e);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
