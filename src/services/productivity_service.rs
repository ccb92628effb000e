use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::productivity::{
    ImpactRecord, InitiativeCategory, ProductivityRecord, ProductivityReport,
    ProductivityResponse, ProductivitySummary, RawImpactRecord,
};
use crate::utils::semantic::records_fingerprint;

/// Productivity calculator: normalizes impact percentages within each
/// initiative and scales them by the initiative category's gain.
///
/// The whole batch is validated before anything is computed, so a single bad
/// record rejects the call with its position and no partial output.
pub fn compute_productivity(records: &[ImpactRecord]) -> AppResult<Vec<ProductivityRecord>> {
    for (index, record) in records.iter().enumerate() {
        validate_record(index, record)?;
    }

    let groups = group_by_initiative(records);
    let mut results = Vec::with_capacity(records.len());

    for members in groups {
        let scale = group_scale(records, &members);
        let total: f64 = members
            .iter()
            .map(|&index| records[index].impact_percentage / scale)
            .sum();

        for index in members {
            let record = &records[index];
            let normalized_weight = if total > 0.0 {
                (record.impact_percentage / scale / total) * 100.0
            } else {
                0.0
            };
            let productivity_gain = record.category.productivity_gain();
            let final_productivity = normalized_weight * productivity_gain / 100.0;

            results.push(ProductivityRecord {
                initiative: record.initiative.clone(),
                queue: record.queue.clone(),
                category: record.category,
                impact_percentage: record.impact_percentage,
                normalized_weight,
                productivity_gain,
                final_productivity,
            });
        }
    }

    debug!(
        target: "app::productivity",
        records = results.len(),
        "productivity computed"
    );

    Ok(results)
}

/// Validates untyped UI records and computes productivity over them.
pub fn compute_productivity_raw(records: &[RawImpactRecord]) -> AppResult<Vec<ProductivityRecord>> {
    let typed = records
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_raw_record(index, raw))
        .collect::<AppResult<Vec<_>>>()?;
    compute_productivity(&typed)
}

pub fn parse_raw_record(index: usize, raw: &RawImpactRecord) -> AppResult<ImpactRecord> {
    let category = InitiativeCategory::try_from(raw.category.as_str())
        .map_err(|reason| AppError::invalid_record(index, reason))?;

    let impact_percentage = match &raw.impact_percentage {
        JsonValue::Number(number) => number.as_f64().ok_or_else(|| {
            AppError::invalid_record(index, "impact percentage is not representable")
        })?,
        other => {
            return Err(AppError::invalid_record(
                index,
                format!("impact percentage must be a number, got {other}"),
            ))
        }
    };

    let record = ImpactRecord::new(raw.initiative.clone(), raw.queue.clone(), category, impact_percentage);
    validate_record(index, &record)?;
    Ok(record)
}

pub fn summarize(records: &[ProductivityRecord]) -> ProductivitySummary {
    let mut summary = ProductivitySummary {
        total_records: records.len(),
        ..ProductivitySummary::default()
    };
    for record in records {
        match record.category {
            InitiativeCategory::CopilotAgent => summary.copilot_agents += 1,
            InitiativeCategory::AutonomousAgent => summary.autonomous_agents += 1,
            InitiativeCategory::Rpa => summary.rpa_solutions += 1,
        }
    }
    summary
}

fn validate_record(index: usize, record: &ImpactRecord) -> AppResult<()> {
    if record.initiative.trim().is_empty() {
        return Err(AppError::invalid_record(index, "initiative must not be empty"));
    }
    if record.queue.trim().is_empty() {
        return Err(AppError::invalid_record(index, "queue must not be empty"));
    }
    if !record.impact_percentage.is_finite() {
        return Err(AppError::invalid_record(index, "impact percentage must be finite"));
    }
    if record.impact_percentage < 0.0 {
        return Err(AppError::invalid_record(
            index,
            format!(
                "impact percentage must not be negative, got {}",
                record.impact_percentage
            ),
        ));
    }
    Ok(())
}

/// Record indices grouped by initiative, groups in first-seen order.
/// Divisor applied to a group's impacts before summing. Groups whose sum
/// overflows `f64` are expressed relative to their largest impact.
fn group_scale(records: &[ImpactRecord], members: &[usize]) -> f64 {
    let total: f64 = members
        .iter()
        .map(|&index| records[index].impact_percentage)
        .sum();
    if total.is_finite() {
        return 1.0;
    }
    members
        .iter()
        .map(|&index| records[index].impact_percentage)
        .fold(0.0, f64::max)
}

fn group_by_initiative(records: &[ImpactRecord]) -> Vec<Vec<usize>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let slot = *positions
            .entry(record.initiative.as_str())
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[slot].push(index);
    }

    groups
}

/// Stateless facade used by the command layer.
#[derive(Debug, Clone, Default)]
pub struct ProductivityService;

impl ProductivityService {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(&self, records: &[ImpactRecord]) -> AppResult<ProductivityResponse> {
        let records = compute_productivity(records)?;
        let summary = summarize(&records);
        Ok(ProductivityResponse { records, summary })
    }

    pub fn calculate_raw(&self, records: &[RawImpactRecord]) -> AppResult<ProductivityResponse> {
        let records = compute_productivity_raw(records)?;
        let summary = summarize(&records);
        Ok(ProductivityResponse { records, summary })
    }

    pub fn build_report(
        &self,
        site: &str,
        activity: &str,
        records: &[ImpactRecord],
    ) -> AppResult<ProductivityReport> {
        let ProductivityResponse { records, summary } = self.calculate(records)?;
        let fingerprint = records_fingerprint(&records)?;

        Ok(ProductivityReport {
            site: site.to_string(),
            activity: activity.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            fingerprint,
            records,
            summary,
        })
    }
}
