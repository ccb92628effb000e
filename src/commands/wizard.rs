use tauri::{async_runtime, State};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::wizard::{
    AiIntervention, Breadcrumb, CompanyProfile, ImpactEntry, SupportQueue, WizardSession,
    WizardStep,
};
use crate::services::wizard_service::{
    ImpactRationaleView, InterventionUpdate, NewIntervention, ScopeView, SupportQueuesView,
};

use super::{AppState, CommandError, CommandResult};

#[tauri::command]
pub async fn wizard_start(state: State<'_, AppState>, url: String) -> CommandResult<WizardSession> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.wizard().start(&url)).await
}

#[tauri::command]
pub async fn wizard_get(state: State<'_, AppState>, session_id: Uuid) -> CommandResult<WizardSession> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.wizard().get(session_id)).await
}

#[tauri::command]
pub async fn wizard_discard(state: State<'_, AppState>, session_id: Uuid) -> CommandResult<()> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.wizard().discard(session_id)).await
}

#[tauri::command]
pub async fn wizard_breadcrumbs(
    state: State<'_, AppState>,
    session_id: Uuid,
    step: String,
) -> CommandResult<Vec<Breadcrumb>> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        let step = WizardStep::try_from(step.as_str()).map_err(AppError::validation)?;
        app_state.wizard().breadcrumbs(session_id, step)
    })
    .await
}

#[tauri::command]
pub async fn wizard_load_scope(
    state: State<'_, AppState>,
    session_id: Uuid,
) -> CommandResult<ScopeView> {
    let wizard = state.inner().wizard();
    wizard.load_scope(session_id).await.map_err(CommandError::from)
}

#[tauri::command]
pub async fn wizard_update_scope_description(
    state: State<'_, AppState>,
    session_id: Uuid,
    description: String,
) -> CommandResult<CompanyProfile> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        app_state
            .wizard()
            .update_scope_description(session_id, description)
    })
    .await
}

#[tauri::command]
pub async fn wizard_select_activity(
    state: State<'_, AppState>,
    session_id: Uuid,
    activity: String,
) -> CommandResult<WizardSession> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.wizard().select_activity(session_id, &activity)).await
}

#[tauri::command]
pub async fn wizard_load_support_queues(
    state: State<'_, AppState>,
    session_id: Uuid,
) -> CommandResult<SupportQueuesView> {
    let wizard = state.inner().wizard();
    wizard
        .load_support_queues(session_id)
        .await
        .map_err(CommandError::from)
}

#[tauri::command]
pub async fn wizard_toggle_relevance(
    state: State<'_, AppState>,
    session_id: Uuid,
    intervention_id: String,
    queue_id: String,
) -> CommandResult<bool> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        app_state
            .wizard()
            .toggle_relevance(session_id, &intervention_id, &queue_id)
    })
    .await
}

#[tauri::command]
pub async fn wizard_update_queue_description(
    state: State<'_, AppState>,
    session_id: Uuid,
    queue_id: String,
    description: String,
) -> CommandResult<SupportQueue> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        app_state
            .wizard()
            .update_queue_description(session_id, &queue_id, description)
    })
    .await
}

#[tauri::command]
pub async fn wizard_add_queue(
    state: State<'_, AppState>,
    session_id: Uuid,
    name: String,
    description: Option<String>,
) -> CommandResult<SupportQueue> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        app_state
            .wizard()
            .add_queue(session_id, &name, description.unwrap_or_default())
    })
    .await
}

#[tauri::command]
pub async fn wizard_remove_queue(
    state: State<'_, AppState>,
    session_id: Uuid,
    queue_id: String,
) -> CommandResult<()> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.wizard().remove_queue(session_id, &queue_id)).await
}

#[tauri::command]
pub async fn wizard_update_intervention(
    state: State<'_, AppState>,
    session_id: Uuid,
    intervention_id: String,
    payload: InterventionUpdate,
) -> CommandResult<AiIntervention> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        app_state
            .wizard()
            .update_intervention(session_id, &intervention_id, payload)
    })
    .await
}

#[tauri::command]
pub async fn wizard_add_intervention(
    state: State<'_, AppState>,
    session_id: Uuid,
    payload: NewIntervention,
) -> CommandResult<AiIntervention> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.wizard().add_intervention(session_id, payload)).await
}

#[tauri::command]
pub async fn wizard_remove_intervention(
    state: State<'_, AppState>,
    session_id: Uuid,
    intervention_id: String,
) -> CommandResult<()> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        app_state
            .wizard()
            .remove_intervention(session_id, &intervention_id)
    })
    .await
}

#[tauri::command]
pub async fn wizard_load_impact_rationale(
    state: State<'_, AppState>,
    session_id: Uuid,
) -> CommandResult<ImpactRationaleView> {
    let wizard = state.inner().wizard();
    wizard
        .load_impact_rationale(session_id)
        .await
        .map_err(CommandError::from)
}

#[tauri::command]
pub async fn wizard_update_impact_percentage(
    state: State<'_, AppState>,
    session_id: Uuid,
    index: usize,
    value: String,
) -> CommandResult<ImpactEntry> {
    let app_state = state.inner().clone();
    run_blocking(move || {
        app_state
            .wizard()
            .update_impact_percentage(session_id, index, &value)
    })
    .await
}

#[tauri::command]
pub async fn wizard_update_rationale(
    state: State<'_, AppState>,
    session_id: Uuid,
    index: usize,
    rationale: String,
) -> CommandResult<ImpactEntry> {
    let app_state = state.inner().clone();
    run_blocking(move || app_state.wizard().update_rationale(session_id, index, rationale)).await
}

async fn run_blocking<T: Send + 'static>(
    task: impl FnOnce() -> Result<T, AppError> + Send + 'static,
) -> CommandResult<T> {
    async_runtime::spawn_blocking(task)
        .await
        .map_err(|err| CommandError::new("UNKNOWN", format!("wizard task failed: {err}"), None))?
        .map_err(CommandError::from)
}
