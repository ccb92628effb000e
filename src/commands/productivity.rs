use tauri::{async_runtime, State};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::productivity::{ProductivityReport, ProductivityResponse, RawImpactRecord};
use crate::services::wizard_service::ProductivityView;

use super::{AppState, CommandError, CommandResult};

/// Scores the impact table of a wizard session.
#[tauri::command]
pub async fn productivity_compute_session(
    state: State<'_, AppState>,
    session_id: Uuid,
) -> CommandResult<ProductivityView> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.wizard().compute_productivity(session_id)).await
}

/// Scores an arbitrary record set handed over by the UI.
#[tauri::command]
pub async fn productivity_compute(
    state: State<'_, AppState>,
    records: Vec<RawImpactRecord>,
) -> CommandResult<ProductivityResponse> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.productivity().calculate_raw(&records)).await
}

#[tauri::command]
pub async fn productivity_report_export(
    state: State<'_, AppState>,
    session_id: Uuid,
) -> CommandResult<ProductivityReport> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.wizard().export_report(session_id)).await
}

async fn run_blocking<T: Send + 'static>(
    task: impl FnOnce() -> Result<T, AppError> + Send + 'static,
) -> CommandResult<T> {
    async_runtime::spawn_blocking(task)
        .await
        .map_err(|err| {
            CommandError::new("UNKNOWN", format!("productivity task failed: {err}"), None)
        })?
        .map_err(CommandError::from)
}
