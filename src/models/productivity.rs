use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Automation class of an AI initiative. Each class carries a fixed
/// productivity multiplier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InitiativeCategory {
    #[serde(rename = "Copilot Agent")]
    CopilotAgent,
    #[serde(rename = "Autonomous Agent")]
    AutonomousAgent,
    #[serde(rename = "Robotic Process Automation", alias = "RPA")]
    Rpa,
}

impl InitiativeCategory {
    pub const ALL: [InitiativeCategory; 3] = [
        InitiativeCategory::CopilotAgent,
        InitiativeCategory::AutonomousAgent,
        InitiativeCategory::Rpa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InitiativeCategory::CopilotAgent => "Copilot Agent",
            InitiativeCategory::AutonomousAgent => "Autonomous Agent",
            InitiativeCategory::Rpa => "Robotic Process Automation",
        }
    }

    /// Productivity gain in percent.
    pub fn productivity_gain(&self) -> f64 {
        match self {
            InitiativeCategory::CopilotAgent => 10.0,
            InitiativeCategory::AutonomousAgent => 40.0,
            InitiativeCategory::Rpa => 20.0,
        }
    }
}

impl fmt::Display for InitiativeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for InitiativeCategory {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "Copilot Agent" => Ok(InitiativeCategory::CopilotAgent),
            "Autonomous Agent" => Ok(InitiativeCategory::AutonomousAgent),
            "Robotic Process Automation" | "RPA" => Ok(InitiativeCategory::Rpa),
            other => Err(format!("unsupported initiative category: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRecord {
    pub initiative: String,
    pub queue: String,
    pub category: InitiativeCategory,
    pub impact_percentage: f64,
}

impl ImpactRecord {
    pub fn new(
        initiative: impl Into<String>,
        queue: impl Into<String>,
        category: InitiativeCategory,
        impact_percentage: f64,
    ) -> Self {
        Self {
            initiative: initiative.into(),
            queue: queue.into(),
            category,
            impact_percentage,
        }
    }
}

/// Untyped impact record as it arrives from the UI. The category is free text
/// and the percentage can be any JSON value until it is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImpactRecord {
    pub initiative: String,
    pub queue: String,
    pub category: String,
    #[serde(default)]
    pub impact_percentage: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityRecord {
    pub initiative: String,
    pub queue: String,
    pub category: InitiativeCategory,
    pub impact_percentage: f64,
    pub normalized_weight: f64,
    pub productivity_gain: f64,
    pub final_productivity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivitySummary {
    pub total_records: usize,
    pub copilot_agents: usize,
    pub autonomous_agents: usize,
    pub rpa_solutions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityResponse {
    pub records: Vec<ProductivityRecord>,
    pub summary: ProductivitySummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityReport {
    pub site: String,
    pub activity: String,
    pub generated_at: String,
    pub fingerprint: String,
    pub records: Vec<ProductivityRecord>,
    pub summary: ProductivitySummary,
}
