use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Artificial minimum latency applied to every simulated analysis step.
    pub simulated_latency_ms: u64,
    /// Tracing filter, fixed for the lifetime of the process.
    pub log_directives: String,
    /// Impact percentage assigned to (intervention, queue) pairs that have no
    /// sample estimate.
    pub default_impact_percentage: f64,
    pub updated_at: String,
}
