//! Presentation settings snapshot: theme and language tables.
//!
//! The engine never reads this document; it is loaded at startup and handed
//! to the API layer explicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub type Table = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown {kind}: {key}")]
    UnknownKey { kind: &'static str, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Key into `themes`.
    pub theme: String,
    /// Key into `languages`.
    pub language: String,
    #[serde(default)]
    pub themes: BTreeMap<String, Table>,
    #[serde(default)]
    pub languages: BTreeMap<String, Table>,
}

impl Default for Settings {
    fn default() -> Self {
        let light: Table = [
            ("bg_main", "#f8fafc"),
            ("bg_card", "#ffffff"),
            ("primary", "#3b82f6"),
            ("success", "#10b981"),
            ("text_primary", "#1e293b"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let ru: Table = [("app_title".to_string(), "Pro Crypto Simulator".to_string())]
            .into_iter()
            .collect();

        Settings {
            theme: "light".to_string(),
            language: "ru".to_string(),
            themes: [("light".to_string(), light)].into_iter().collect(),
            languages: [("ru".to_string(), ru)].into_iter().collect(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing, unreadable or refers to tables it does not define.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Using default settings");
                Settings::default()
            }
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the selected theme and language exist.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.current_theme()?;
        self.texts()?;
        Ok(())
    }

    pub fn current_theme(&self) -> Result<&Table, SettingsError> {
        self.themes
            .get(&self.theme)
            .ok_or_else(|| SettingsError::UnknownKey {
                kind: "theme",
                key: self.theme.clone(),
            })
    }

    pub fn texts(&self) -> Result<&Table, SettingsError> {
        self.languages
            .get(&self.language)
            .ok_or_else(|| SettingsError::UnknownKey {
                kind: "language",
                key: self.language.clone(),
            })
    }

    /// Switch theme and/or language. Leaves settings unchanged on error.
    pub fn select(
        &mut self,
        theme: Option<String>,
        language: Option<String>,
    ) -> Result<(), SettingsError> {
        let mut next = self.clone();
        if let Some(theme) = theme {
            next.theme = theme;
        }
        if let Some(language) = language {
            next.language = language;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}
