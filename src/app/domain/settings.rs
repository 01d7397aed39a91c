use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::infrastructure::error::AppError;
use crate::app::infrastructure::kv_store::KeyValueStore;

/// Store key holding the serialized `AppSettings`.
pub const SETTINGS_KEY: &str = "settings";
/// Theme key written by earlier versions (`"light"` / `"dark"`).
pub const LEGACY_THEME_KEY: &str = "theme";

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 48;
pub const FONT_SIZE_STEP: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_theme_mode")]
    pub theme_mode: ThemeMode,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_word_wrap")]
    pub word_wrap_enabled: bool,

    /// Maximum number of entries kept in the clipboard history
    #[serde(default = "default_clipboard_history_limit")]
    pub clipboard_history_limit: usize,

    #[serde(default)]
    pub preview_enabled: bool,
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::Dark
}

fn default_font_size() -> u32 {
    14
}

fn default_word_wrap() -> bool {
    true
}

fn default_clipboard_history_limit() -> usize {
    20
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme_mode: default_theme_mode(),
            font_size: default_font_size(),
            word_wrap_enabled: default_word_wrap(),
            clipboard_history_limit: default_clipboard_history_limit(),
            preview_enabled: false,
        }
    }
}

impl AppSettings {
    /// Load settings from the store, or defaults if none were saved.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Some(contents) => match serde_json::from_str::<AppSettings>(&contents) {
                Ok(mut settings) => {
                    settings.font_size = settings.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}. Using defaults.", e);
                    Self::default()
                }
            },
            None => {
                let mut settings = Self::default();
                if store.get(LEGACY_THEME_KEY).as_deref() == Some("light") {
                    settings.theme_mode = ThemeMode::Light;
                }
                settings
            }
        }
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), AppError> {
        let json = serde_json::to_string(self)?;
        store
            .set(SETTINGS_KEY, &json)
            .map_err(|e| AppError::Settings(e.to_string()))
    }

    pub fn zoom_in(&mut self) {
        self.font_size = (self.font_size + FONT_SIZE_STEP).min(MAX_FONT_SIZE);
    }

    pub fn zoom_out(&mut self) {
        self.font_size = self
            .font_size
            .saturating_sub(FONT_SIZE_STEP)
            .max(MIN_FONT_SIZE);
    }
}
