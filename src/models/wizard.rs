use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::productivity::{ImpactRecord, InitiativeCategory};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Start,
    Scope,
    SupportQueues,
    ImpactRationale,
    Productivity,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Start => "start",
            WizardStep::Scope => "scope",
            WizardStep::SupportQueues => "support_queues",
            WizardStep::ImpactRationale => "impact_rationale",
            WizardStep::Productivity => "productivity",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WizardStep {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "start" => Ok(WizardStep::Start),
            "scope" => Ok(WizardStep::Scope),
            "support_queues" => Ok(WizardStep::SupportQueues),
            "impact_rationale" => Ok(WizardStep::ImpactRationale),
            "productivity" => Ok(WizardStep::Productivity),
            other => Err(format!("unsupported wizard step: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Activity {
    #[serde(rename = "agentify")]
    AgentifyCustomerSupport,
    GoToMarket,
    AddMore,
}

impl Activity {
    pub const ALL: [Activity; 3] = [
        Activity::AgentifyCustomerSupport,
        Activity::GoToMarket,
        Activity::AddMore,
    ];

    /// Tag carried between steps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::AgentifyCustomerSupport => "agentify",
            Activity::GoToMarket => "go-to-market",
            Activity::AddMore => "add-more",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Activity::AgentifyCustomerSupport => "Agentify Customer Support",
            Activity::GoToMarket => "Transform Go To Market",
            Activity::AddMore => "Add Activity",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Activity::AgentifyCustomerSupport => {
                "Transform customer support with AI-powered agents and automation"
            }
            Activity::GoToMarket => "Optimize sales and marketing processes with AI insights",
            Activity::AddMore => "Add a new process excellence activity",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Activity::AgentifyCustomerSupport)
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Activity {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "agentify" => Ok(Activity::AgentifyCustomerSupport),
            "go-to-market" => Ok(Activity::GoToMarket),
            "add-more" => Ok(Activity::AddMore),
            other => Err(format!("unsupported activity: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityOption {
    pub tag: Activity,
    pub title: String,
    pub description: String,
    pub available: bool,
}

impl From<Activity> for ActivityOption {
    fn from(activity: Activity) -> Self {
        Self {
            tag: activity,
            title: activity.title().to_string(),
            description: activity.description().to_string(),
            available: activity.is_available(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub company_name: String,
    pub scope_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupportQueue {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Complexity {
    #[serde(rename = "Quick Win")]
    QuickWin,
    Moderate,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::QuickWin => "Quick Win",
            Complexity::Moderate => "Moderate",
            Complexity::High => "High",
        }
    }

    /// Expected delivery window shown next to the complexity badge.
    pub fn timeline(&self) -> &'static str {
        match self {
            Complexity::QuickWin => "2-4 months",
            Complexity::Moderate => "4-6 months",
            Complexity::High => "6-9+ months",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Complexity {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Quick Win" => Ok(Complexity::QuickWin),
            "Moderate" => Ok(Complexity::Moderate),
            "High" => Ok(Complexity::High),
            other => Err(format!("unsupported complexity: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiIntervention {
    pub id: String,
    pub name: String,
    pub description: String,
    pub complexity: Complexity,
    pub category: InitiativeCategory,
}

/// Intervention id -> queue id -> relevant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RelevanceMatrix(BTreeMap<String, BTreeMap<String, bool>>);

impl RelevanceMatrix {
    /// Every intervention starts out relevant to every queue.
    pub fn all_relevant(interventions: &[AiIntervention], queues: &[SupportQueue]) -> Self {
        let mut matrix = Self::default();
        for intervention in interventions {
            matrix.add_intervention(&intervention.id, queues);
        }
        matrix
    }

    pub fn is_relevant(&self, intervention_id: &str, queue_id: &str) -> bool {
        self.0
            .get(intervention_id)
            .and_then(|row| row.get(queue_id))
            .copied()
            .unwrap_or(false)
    }

    /// Flips one cell and returns its new value. A missing cell counts as
    /// not relevant, so the first toggle marks it relevant.
    pub fn toggle(&mut self, intervention_id: &str, queue_id: &str) -> bool {
        let cell = self
            .0
            .entry(intervention_id.to_string())
            .or_default()
            .entry(queue_id.to_string())
            .or_insert(false);
        *cell = !*cell;
        *cell
    }

    pub fn add_intervention(&mut self, intervention_id: &str, queues: &[SupportQueue]) {
        let row = self.0.entry(intervention_id.to_string()).or_default();
        for queue in queues {
            row.insert(queue.id.clone(), true);
        }
    }

    pub fn add_queue(&mut self, queue_id: &str, interventions: &[AiIntervention]) {
        for intervention in interventions {
            self.0
                .entry(intervention.id.clone())
                .or_default()
                .insert(queue_id.to_string(), true);
        }
    }

    pub fn remove_intervention(&mut self, intervention_id: &str) {
        self.0.remove(intervention_id);
    }

    pub fn remove_queue(&mut self, queue_id: &str) {
        for row in self.0.values_mut() {
            row.remove(queue_id);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEntry {
    pub intervention_id: String,
    pub initiative: String,
    pub queue_id: String,
    pub queue: String,
    pub category: InitiativeCategory,
    pub impact_percentage: f64,
    pub rationale: String,
}

impl ImpactEntry {
    pub fn to_impact_record(&self) -> ImpactRecord {
        ImpactRecord::new(
            self.initiative.clone(),
            self.queue.clone(),
            self.category,
            self.impact_percentage,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSession {
    pub id: Uuid,
    pub site: String,
    pub step: WizardStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<CompanyProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,
    pub queues: Vec<SupportQueue>,
    pub interventions: Vec<AiIntervention>,
    pub relevance: RelevanceMatrix,
    pub impacts: Vec<ImpactEntry>,
    pub created_at: String,
    pub updated_at: String,
}

impl WizardSession {
    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    pub fn impact_records(&self) -> Vec<ImpactRecord> {
        self.impacts.iter().map(ImpactEntry::to_impact_record).collect()
    }
}
