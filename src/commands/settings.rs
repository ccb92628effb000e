use serde::Deserialize;
use tauri::{async_runtime, State};

use crate::error::AppError;
use crate::models::settings::AppSettings;
use crate::services::settings_service::SettingsUpdateInput;

use super::{AppState, CommandError, CommandResult};

#[tauri::command]
pub async fn settings_get(state: State<'_, AppState>) -> CommandResult<AppSettings> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.settings().get()).await
}

#[tauri::command]
pub async fn settings_update(
    state: State<'_, AppState>,
    payload: SettingsUpdatePayload,
) -> CommandResult<AppSettings> {
    let app_state = state.inner().clone();
    let input = payload.into_input();
    run_blocking(move || app_state.settings().update(input)).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsUpdatePayload {
    #[serde(default)]
    simulated_latency_ms: Option<u64>,
    #[serde(default)]
    default_impact_percentage: Option<f64>,
}

impl SettingsUpdatePayload {
    fn into_input(self) -> SettingsUpdateInput {
        SettingsUpdateInput {
            simulated_latency_ms: self.simulated_latency_ms,
            log_directives: None,
            default_impact_percentage: self.default_impact_percentage,
        }
    }
}

async fn run_blocking<T: Send + 'static>(
    task: impl FnOnce() -> Result<T, AppError> + Send + 'static,
) -> CommandResult<T> {
    async_runtime::spawn_blocking(task)
        .await
        .map_err(|err| CommandError::new("UNKNOWN", format!("settings task failed: {err}"), None))?
        .map_err(CommandError::from)
}
