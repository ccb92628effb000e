//! Error propagation from the wizard and calculator to the command layer.

use apex_app_lib::commands::{AppState, CommandError};
use apex_app_lib::error::AppError;
use apex_app_lib::models::productivity::RawImpactRecord;
use apex_app_lib::services::settings_service::SettingsService;
use serde_json::json;
use uuid::Uuid;

fn setup_state() -> AppState {
    AppState::new(SettingsService::headless()).expect("Failed to create AppState")
}

#[test]
fn test_invalid_site_maps_to_validation_error() {
    let state = setup_state();

    let error = CommandError::from(state.wizard().start("").unwrap_err());
    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(error.message, "Please enter a company website URL");

    let error = CommandError::from(state.wizard().start("acme.io/careers").unwrap_err());
    assert_eq!(error.code, "VALIDATION_ERROR");
    assert!(error.message.contains("only the domain name"));
}

#[test]
fn test_unknown_session_is_not_found() {
    let state = setup_state();
    let error = CommandError::from(state.wizard().get(Uuid::new_v4()).unwrap_err());
    assert_eq!(error.code, "NOT_FOUND");
}

#[test]
fn test_unknown_activity_is_validation_error() {
    let state = setup_state();
    let session = state.wizard().start("acme.io").unwrap();

    let error = state
        .wizard()
        .select_activity(session.id, "world-domination")
        .unwrap_err();
    assert!(matches!(error, AppError::Validation { .. }));
}

#[test]
fn test_coming_soon_activity_details() {
    let state = setup_state();
    let session = state.wizard().start("acme.io").unwrap();

    let error = CommandError::from(
        state
            .wizard()
            .select_activity(session.id, "add-more")
            .unwrap_err(),
    );
    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(error.details, Some(json!({ "activity": "add-more" })));
}

#[test]
fn test_invalid_record_reports_position_to_ui() {
    let state = setup_state();
    let raw: Vec<RawImpactRecord> = serde_json::from_value(json!([
        { "initiative": "A", "queue": "Q1", "category": "Copilot Agent", "impactPercentage": 45 },
        { "initiative": "A", "queue": "Q2", "category": "Copilot Agent", "impactPercentage": -5 }
    ]))
    .unwrap();

    let error = CommandError::from(state.productivity().calculate_raw(&raw).unwrap_err());
    assert_eq!(error.code, "INVALID_RECORD");
    assert_eq!(error.details, Some(json!({ "index": 1 })));

    let serialized = serde_json::to_value(&error).unwrap();
    assert_eq!(serialized["code"], "INVALID_RECORD");
    assert!(serialized["message"].as_str().unwrap().contains("negative"));
}

#[tokio::test]
async fn test_editing_unknown_rows_is_not_found() {
    let state = setup_state();
    let wizard = state.wizard();
    let session = wizard.start("acme.io").unwrap();
    wizard.select_activity(session.id, "agentify").unwrap();
    wizard.load_support_queues(session.id).await.unwrap();

    assert!(matches!(
        wizard.toggle_relevance(session.id, "chatbot", "nonexistent"),
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        wizard.update_queue_description(session.id, "nonexistent", String::new()),
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        wizard.update_impact_percentage(session.id, 0, "10"),
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        wizard.add_queue(session.id, "   ", String::new()),
        Err(AppError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_productivity_requires_impact_step() {
    let state = setup_state();
    let wizard = state.wizard();
    let session = wizard.start("acme.io").unwrap();
    wizard.select_activity(session.id, "agentify").unwrap();
    wizard.load_support_queues(session.id).await.unwrap();

    let error = CommandError::from(wizard.compute_productivity(session.id).unwrap_err());
    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(error.details.unwrap()["requiredStep"], "impact_rationale");
}
