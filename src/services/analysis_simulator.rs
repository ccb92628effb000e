use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::debug;

use crate::error::AppResult;
use crate::models::productivity::InitiativeCategory;
use crate::models::wizard::{
    Activity, AiIntervention, CompanyProfile, Complexity, ImpactEntry, RelevanceMatrix,
    SupportQueue,
};
use crate::services::scope_service;
use crate::services::settings_service::SettingsService;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueDiscovery {
    pub queues: Vec<SupportQueue>,
    pub interventions: Vec<AiIntervention>,
}

/// Source of the wizard's "analysis" results. The shipped implementation is
/// simulated; the seam keeps the wizard independent of where the data comes
/// from.
#[async_trait::async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze_scope(&self, site: &str) -> AppResult<CompanyProfile>;

    async fn discover_queues(&self, site: &str, activity: Activity) -> AppResult<QueueDiscovery>;

    async fn estimate_impacts(
        &self,
        interventions: &[AiIntervention],
        queues: &[SupportQueue],
        relevance: &RelevanceMatrix,
    ) -> AppResult<Vec<ImpactEntry>>;
}

/// Fixed sample data behind an artificial minimum latency. Latency and the
/// default estimate are read from the settings on every call.
#[derive(Clone)]
pub struct SimulatedAnalysisProvider {
    settings: Arc<SettingsService>,
}

impl SimulatedAnalysisProvider {
    pub fn new(settings: Arc<SettingsService>) -> Self {
        Self { settings }
    }

    pub fn instant() -> Self {
        Self::new(Arc::new(SettingsService::headless()))
    }

    async fn pace(&self, operation: &'static str) -> AppResult<()> {
        let latency = Duration::from_millis(self.settings.get()?.simulated_latency_ms);
        let started = Instant::now();
        if !latency.is_zero() {
            sleep(latency).await;
        }
        debug!(
            target: "app::simulator",
            operation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "simulated analysis finished"
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for SimulatedAnalysisProvider {
    async fn analyze_scope(&self, site: &str) -> AppResult<CompanyProfile> {
        self.pace("scope").await?;
        Ok(scope_service::company_profile(site))
    }

    async fn discover_queues(&self, _site: &str, _activity: Activity) -> AppResult<QueueDiscovery> {
        self.pace("queues").await?;
        Ok(QueueDiscovery {
            queues: sample_queues(),
            interventions: sample_interventions(),
        })
    }

    async fn estimate_impacts(
        &self,
        interventions: &[AiIntervention],
        queues: &[SupportQueue],
        relevance: &RelevanceMatrix,
    ) -> AppResult<Vec<ImpactEntry>> {
        self.pace("impacts").await?;
        let default_impact_percentage = self.settings.get()?.default_impact_percentage;
        Ok(build_impact_entries(
            interventions,
            queues,
            relevance,
            default_impact_percentage,
        ))
    }
}

/// One entry per relevant (intervention, queue) pair, intervention order
/// first, then queue order.
pub fn build_impact_entries(
    interventions: &[AiIntervention],
    queues: &[SupportQueue],
    relevance: &RelevanceMatrix,
    default_impact_percentage: f64,
) -> Vec<ImpactEntry> {
    let mut entries = Vec::new();
    for intervention in interventions {
        for queue in queues {
            if !relevance.is_relevant(&intervention.id, &queue.id) {
                continue;
            }
            let (impact_percentage, rationale) = match sample_estimate(&intervention.id, &queue.id) {
                Some((percentage, rationale)) => (percentage, rationale.to_string()),
                None => (
                    default_impact_percentage,
                    format!(
                        "{} is expected to take over a share of routine {} requests",
                        intervention.name, queue.name
                    ),
                ),
            };
            entries.push(ImpactEntry {
                intervention_id: intervention.id.clone(),
                initiative: intervention.name.clone(),
                queue_id: queue.id.clone(),
                queue: queue.name.clone(),
                category: intervention.category,
                impact_percentage,
                rationale,
            });
        }
    }
    entries
}

pub fn sample_queues() -> Vec<SupportQueue> {
    [
        ("technical", "Technical Support", "Hardware and software troubleshooting"),
        ("billing", "Billing Inquiries", "Payment and subscription related questions"),
        ("general", "General Support", "Product information and general assistance"),
        ("enterprise", "Enterprise Support", "Dedicated support for enterprise clients"),
    ]
    .into_iter()
    .map(|(id, name, description)| SupportQueue {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

pub fn sample_interventions() -> Vec<AiIntervention> {
    [
        (
            "chatbot",
            "AI Chatbot",
            "Automated first-line customer support",
            Complexity::QuickWin,
            InitiativeCategory::CopilotAgent,
        ),
        (
            "ticket-routing",
            "Smart Ticket Routing",
            "Intelligent assignment of tickets to appropriate agents",
            Complexity::Moderate,
            InitiativeCategory::AutonomousAgent,
        ),
        (
            "auto-responses",
            "Automated Responses",
            "Generate contextual responses for common inquiries",
            Complexity::QuickWin,
            InitiativeCategory::Rpa,
        ),
        (
            "sentiment-analysis",
            "Sentiment Analysis",
            "Analyze customer emotions and prioritize urgent cases",
            Complexity::High,
            InitiativeCategory::AutonomousAgent,
        ),
    ]
    .into_iter()
    .map(|(id, name, description, complexity, category)| AiIntervention {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        complexity,
        category,
    })
    .collect()
}

fn sample_estimate(intervention_id: &str, queue_id: &str) -> Option<(f64, &'static str)> {
    let estimate = match (intervention_id, queue_id) {
        ("chatbot", "technical") => (45.0, "Can handle 45% of common technical queries like password resets, basic troubleshooting, and FAQ responses"),
        ("chatbot", "billing") => (60.0, "Most billing questions are straightforward and can be automated - payment status, invoice requests, plan information"),
        ("chatbot", "general") => (70.0, "General inquiries are ideal for chatbots - product information, hours, contact details, and basic guidance"),
        ("chatbot", "enterprise") => (25.0, "Enterprise clients require more personalized attention, but chatbot can still handle initial triage and basic requests"),
        ("ticket-routing", "technical") => (80.0, "AI can analyze technical keywords, urgency, and complexity to route tickets to specialists with 80% accuracy"),
        ("ticket-routing", "billing") => (90.0, "Billing queries have clear patterns and can be routed very accurately to billing specialists or automated systems"),
        ("ticket-routing", "general") => (75.0, "General support tickets can be categorized and routed effectively based on content analysis and intent recognition"),
        ("ticket-routing", "enterprise") => (95.0, "Enterprise tickets can be immediately identified and routed to dedicated account managers with high accuracy"),
        ("auto-responses", "technical") => (35.0, "Can generate automated responses for common technical issues with links to relevant documentation and troubleshooting steps"),
        ("auto-responses", "billing") => (55.0, "Standard billing responses can be automated - payment confirmations, plan details, billing cycle information"),
        ("auto-responses", "general") => (50.0, "Many general inquiries have standard responses that can be automatically generated and customized"),
        ("auto-responses", "enterprise") => (20.0, "Enterprise responses require more customization, but some standard acknowledgments and status updates can be automated"),
        ("sentiment-analysis", "technical") => (65.0, "Can identify frustrated customers with technical issues and prioritize urgent cases or escalate to senior technicians"),
        ("sentiment-analysis", "billing") => (70.0, "Billing disputes often involve negative sentiment - AI can flag these for immediate attention from billing specialists"),
        ("sentiment-analysis", "general") => (40.0, "General inquiries typically have neutral sentiment, but can still identify dissatisfied customers for proactive outreach"),
        ("sentiment-analysis", "enterprise") => (85.0, "Enterprise sentiment analysis is crucial - can immediately identify at-risk accounts and trigger account manager intervention"),
        _ => return None,
    };
    Some(estimate)
}
