use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::error::AppError;
use crate::orchestration::EngineSnapshot;
use crate::settings::{Settings, SettingsError};

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    pub theme: Option<String>,
    pub language: Option<String>,
}

pub async fn get_snapshot(State(state): State<AppState>) -> Json<EngineSnapshot> {
    Json(state.engine.snapshot().await)
}

pub async fn reset(State(state): State<AppState>) -> Json<EngineSnapshot> {
    state.engine.reset().await;
    Json(state.engine.snapshot().await)
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.settings.read().await.clone())
}

/// Change theme and/or language and persist when a settings file is configured.
///
/// The in-memory settings only change once the file write succeeded.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<Settings>, AppError> {
    let mut settings = state.settings.write().await;
    let mut next = settings.clone();
    next.select(update.theme, update.language).map_err(|e| match e {
        SettingsError::UnknownKey { .. } => AppError::BadRequest(e.to_string()),
        other => AppError::from(other),
    })?;

    if let Some(path) = &state.settings_path {
        next.save(path)?;
        tracing::info!(path = %path.display(), "Settings saved");
    }

    *settings = next.clone();
    Ok(Json(next))
}
