//! End-to-end wizard flow: site entry, scope, queue configuration, impact
//! editing and the final productivity table.

use std::sync::Arc;

use apex_app_lib::commands::AppState;
use apex_app_lib::error::AppError;
use apex_app_lib::models::productivity::InitiativeCategory;
use apex_app_lib::models::wizard::{Complexity, WizardStep};
use apex_app_lib::services::settings_service::SettingsService;
use apex_app_lib::services::wizard_service::{InterventionUpdate, NewIntervention};

fn setup_state() -> AppState {
    AppState::new(SettingsService::headless()).expect("Failed to create AppState")
}

#[tokio::test]
async fn test_full_wizard_flow() {
    let state = setup_state();
    let wizard = state.wizard();

    let session = wizard.start("https://www.acme.io/").unwrap();
    assert_eq!(session.site, "www.acme.io");
    assert_eq!(session.step, WizardStep::Start);

    let scope = wizard.load_scope(session.id).await.unwrap();
    assert_eq!(scope.profile.company_name, "ACME Corp");
    assert_eq!(scope.activities.len(), 3);
    assert_eq!(scope.activities.iter().filter(|a| a.available).count(), 1);

    wizard
        .update_scope_description(session.id, "Retail platform".to_string())
        .unwrap();
    wizard.select_activity(session.id, "agentify").unwrap();

    let queues = wizard.load_support_queues(session.id).await.unwrap();
    assert_eq!(queues.queues.len(), 4);
    assert_eq!(queues.interventions.len(), 4);
    assert!(queues.relevance.is_relevant("sentiment-analysis", "general"));

    let impacts = wizard.load_impact_rationale(session.id).await.unwrap();
    assert_eq!(impacts.entries.len(), 16);
    assert_eq!(impacts.queue_count, 4);
    assert_eq!(
        impacts.breadcrumbs.last().map(|crumb| crumb.label.as_str()),
        Some("Impact Rationale")
    );

    let view = wizard.compute_productivity(session.id).unwrap();
    assert_eq!(view.result.records.len(), 16);
    assert_eq!(view.result.summary.autonomous_agents, 8);
    assert_eq!(view.result.summary.copilot_agents, 4);
    assert_eq!(view.result.summary.rpa_solutions, 4);

    let chatbot_general = &view.result.records[2];
    assert_eq!(chatbot_general.initiative, "AI Chatbot");
    assert_eq!(chatbot_general.queue, "General Support");
    assert!((chatbot_general.normalized_weight - 35.0).abs() < 1e-9);
    assert!((chatbot_general.final_productivity - 3.5).abs() < 1e-9);

    let current = wizard.get(session.id).unwrap();
    assert_eq!(current.step, WizardStep::Productivity);
    assert_eq!(
        current.profile.map(|profile| profile.scope_description),
        Some("Retail platform".to_string())
    );
}

#[tokio::test]
async fn test_edits_flow_into_productivity() {
    let state = setup_state();
    let wizard = state.wizard();
    let session = wizard.start("globex.com").unwrap();
    wizard.select_activity(session.id, "agentify").unwrap();
    wizard.load_support_queues(session.id).await.unwrap();

    // Chatbot only stays relevant for billing.
    for queue in ["technical", "general", "enterprise"] {
        assert!(!wizard
            .toggle_relevance(session.id, "chatbot", queue)
            .unwrap());
    }
    wizard
        .update_intervention(
            session.id,
            "chatbot",
            InterventionUpdate {
                category: Some(InitiativeCategory::AutonomousAgent),
                ..InterventionUpdate::default()
            },
        )
        .unwrap();

    let impacts = wizard.load_impact_rationale(session.id).await.unwrap();
    assert_eq!(impacts.entries.len(), 13);
    assert_eq!(impacts.entries[0].queue_id, "billing");
    assert_eq!(impacts.entries[0].category, InitiativeCategory::AutonomousAgent);

    let edited = wizard
        .update_impact_percentage(session.id, 0, "250")
        .unwrap();
    assert_eq!(edited.impact_percentage, 100.0);

    let view = wizard.compute_productivity(session.id).unwrap();
    let chatbot = &view.result.records[0];
    assert_eq!(chatbot.initiative, "AI Chatbot");
    assert!((chatbot.normalized_weight - 100.0).abs() < 1e-9);
    assert!((chatbot.final_productivity - 40.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_added_intervention_gets_default_estimates() {
    let state = setup_state();
    let wizard = state.wizard();
    let session = wizard.start("initech.com").unwrap();
    wizard.select_activity(session.id, "agentify").unwrap();
    wizard.load_support_queues(session.id).await.unwrap();

    let added = wizard
        .add_intervention(
            session.id,
            NewIntervention {
                name: "Knowledge Base Assistant".to_string(),
                description: "Suggests articles while agents type".to_string(),
                complexity: Complexity::Moderate,
                category: InitiativeCategory::CopilotAgent,
            },
        )
        .unwrap();
    assert_eq!(added.id, "knowledge-base-assistant");
    wizard.remove_intervention(session.id, "sentiment-analysis").unwrap();

    let impacts = wizard.load_impact_rationale(session.id).await.unwrap();
    let added_entries: Vec<_> = impacts
        .entries
        .iter()
        .filter(|entry| entry.intervention_id == "knowledge-base-assistant")
        .collect();
    assert_eq!(added_entries.len(), 4);
    assert!(added_entries.iter().all(|entry| entry.impact_percentage == 50.0));
    assert_eq!(impacts.entries.len(), 16);

    let view = wizard.compute_productivity(session.id).unwrap();
    assert_eq!(view.result.records.last().unwrap().initiative, "Knowledge Base Assistant");
    assert!((view.result.records.last().unwrap().normalized_weight - 25.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_intervention_names_stay_unique() {
    let state = setup_state();
    let wizard = state.wizard();
    let session = wizard.start("acme.io").unwrap();
    wizard.select_activity(session.id, "agentify").unwrap();
    wizard.load_support_queues(session.id).await.unwrap();

    let renamed = wizard.update_intervention(
        session.id,
        "sentiment-analysis",
        InterventionUpdate {
            name: Some("AI Chatbot".to_string()),
            ..InterventionUpdate::default()
        },
    );
    assert!(matches!(renamed, Err(AppError::Conflict { .. })));

    let added = wizard.add_intervention(
        session.id,
        NewIntervention {
            name: "ai chatbot".to_string(),
            description: String::new(),
            complexity: Complexity::QuickWin,
            category: InitiativeCategory::CopilotAgent,
        },
    );
    assert!(matches!(added, Err(AppError::Conflict { .. })));

    // Renaming an intervention to its own name is not a clash.
    wizard
        .update_intervention(
            session.id,
            "chatbot",
            InterventionUpdate {
                name: Some("AI Chatbot".to_string()),
                ..InterventionUpdate::default()
            },
        )
        .unwrap();

    wizard.load_impact_rationale(session.id).await.unwrap();
    let view = wizard.compute_productivity(session.id).unwrap();
    let chatbot_rows = view
        .result
        .records
        .iter()
        .filter(|record| record.initiative == "AI Chatbot")
        .count();
    assert_eq!(chatbot_rows, 4);
    assert!((view.result.records[0].normalized_weight - 22.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_report_export_and_discard() {
    let state = setup_state();
    let wizard = state.wizard();
    let session = wizard.start("acme.io").unwrap();
    wizard.select_activity(session.id, "agentify").unwrap();
    wizard.load_support_queues(session.id).await.unwrap();
    wizard.load_impact_rationale(session.id).await.unwrap();

    assert!(wizard.export_report(session.id).is_err());

    wizard.compute_productivity(session.id).unwrap();
    let report = wizard.export_report(session.id).unwrap();
    assert_eq!(report.site, "acme.io");
    assert_eq!(report.activity, "agentify");
    assert_eq!(report.summary.total_records, 16);
    assert!(!report.fingerprint.is_empty());

    wizard.discard(session.id).unwrap();
    assert!(matches!(wizard.get(session.id), Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let state = setup_state();
    let wizard = state.wizard();

    let first = wizard.start("acme.io").unwrap();
    let second = wizard.start("globex.com").unwrap();

    let (a, b) = futures::join!(wizard.load_scope(first.id), wizard.load_scope(second.id));
    assert_eq!(a.unwrap().profile.company_name, "ACME Corp");
    assert_eq!(b.unwrap().profile.company_name, "GLOBEX Corp");

    wizard.select_activity(first.id, "agentify").unwrap();
    assert!(wizard.get(second.id).unwrap().activity.is_none());
}

#[tokio::test]
async fn test_custom_provider_can_be_injected() {
    use apex_app_lib::services::analysis_simulator::SimulatedAnalysisProvider;

    let settings = Arc::new(SettingsService::headless());
    let provider = Arc::new(SimulatedAnalysisProvider::new(Arc::clone(&settings)));
    let state = AppState::with_provider(settings, provider);

    let session = state.wizard().start("acme.io").unwrap();
    let crumbs = state.wizard().breadcrumbs(session.id, WizardStep::Scope).unwrap();
    assert_eq!(crumbs.len(), 2);
    assert!(state
        .wizard()
        .breadcrumbs(session.id, WizardStep::SupportQueues)
        .is_err());
}
