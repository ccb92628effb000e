use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::productivity::{InitiativeCategory, ProductivityReport, ProductivityResponse};
use crate::models::wizard::{
    Activity, ActivityOption, AiIntervention, Breadcrumb, CompanyProfile, Complexity,
    ImpactEntry, RelevanceMatrix, SupportQueue, WizardSession, WizardStep,
};
use crate::services::analysis_simulator::AnalysisProvider;
use crate::services::navigation::breadcrumbs;
use crate::services::productivity_service::ProductivityService;
use crate::services::scope_service::normalize_site;

const COMING_SOON_MESSAGE: &str = "This feature will be available in a future update.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeView {
    pub session_id: Uuid,
    pub site: String,
    pub profile: CompanyProfile,
    pub activities: Vec<ActivityOption>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportQueuesView {
    pub session_id: Uuid,
    pub queues: Vec<SupportQueue>,
    pub interventions: Vec<AiIntervention>,
    pub relevance: RelevanceMatrix,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRationaleView {
    pub session_id: Uuid,
    pub queue_count: usize,
    pub entries: Vec<ImpactEntry>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityView {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub result: ProductivityResponse,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub complexity: Option<Complexity>,
    #[serde(default)]
    pub category: Option<InitiativeCategory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIntervention {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub complexity: Complexity,
    pub category: InitiativeCategory,
}

/// In-memory wizard sessions. Each session walks the steps in order; the
/// analysis steps go through the [`AnalysisProvider`], everything else is
/// plain editing of the session's lists.
pub struct WizardService {
    provider: Arc<dyn AnalysisProvider>,
    productivity: ProductivityService,
    sessions: RwLock<HashMap<Uuid, WizardSession>>,
}

impl WizardService {
    pub fn new(provider: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            provider,
            productivity: ProductivityService::new(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Validates the company site and opens a new session for it.
    pub fn start(&self, site_input: &str) -> AppResult<WizardSession> {
        let site = normalize_site(site_input)?;
        let now = Utc::now().to_rfc3339();
        let session = WizardSession {
            id: Uuid::new_v4(),
            site,
            step: WizardStep::Start,
            profile: None,
            activity: None,
            queues: Vec::new(),
            interventions: Vec::new(),
            relevance: RelevanceMatrix::default(),
            impacts: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.sessions
            .write()
            .map_err(|_| lock_poisoned())?
            .insert(session.id, session.clone());

        info!(target: "app::wizard", session_id = %session.id, site = %session.site, "analysis started");
        Ok(session)
    }

    pub fn get(&self, session_id: Uuid) -> AppResult<WizardSession> {
        self.sessions
            .read()
            .map_err(|_| lock_poisoned())?
            .get(&session_id)
            .cloned()
            .ok_or_else(AppError::not_found)
    }

    /// Drops the session; used when the user starts a new analysis.
    pub fn discard(&self, session_id: Uuid) -> AppResult<()> {
        self.sessions
            .write()
            .map_err(|_| lock_poisoned())?
            .remove(&session_id)
            .map(|_| ())
            .ok_or_else(AppError::not_found)
    }

    pub fn breadcrumbs(&self, session_id: Uuid, step: WizardStep) -> AppResult<Vec<Breadcrumb>> {
        let session = self.get(session_id)?;
        ensure_reachable(&session, step)?;
        Ok(session_breadcrumbs(&session, step))
    }

    pub async fn load_scope(&self, session_id: Uuid) -> AppResult<ScopeView> {
        let session = self.get(session_id)?;
        let profile = match session.profile {
            Some(profile) => profile,
            None => self.provider.analyze_scope(&session.site).await?,
        };

        self.with_session(session_id, |session| {
            let profile = session.profile.get_or_insert(profile).clone();
            advance(session, WizardStep::Scope);
            Ok(ScopeView {
                session_id,
                site: session.site.clone(),
                profile,
                activities: Activity::ALL.into_iter().map(ActivityOption::from).collect(),
                breadcrumbs: session_breadcrumbs(session, WizardStep::Scope),
            })
        })
    }

    pub fn update_scope_description(
        &self,
        session_id: Uuid,
        description: String,
    ) -> AppResult<CompanyProfile> {
        self.with_session(session_id, |session| {
            let profile = session
                .profile
                .as_mut()
                .ok_or_else(|| AppError::validation("scope has not been analyzed yet"))?;
            profile.scope_description = description;
            Ok(profile.clone())
        })
    }

    pub fn select_activity(&self, session_id: Uuid, tag: &str) -> AppResult<WizardSession> {
        let activity = Activity::try_from(tag).map_err(AppError::validation)?;
        if !activity.is_available() {
            return Err(AppError::validation_with_details(
                COMING_SOON_MESSAGE,
                serde_json::json!({ "activity": activity.as_str() }),
            ));
        }

        self.with_session(session_id, |session| {
            ensure_reachable(session, WizardStep::Scope)?;
            if session.activity != Some(activity) {
                session.activity = Some(activity);
                session.queues.clear();
                session.interventions.clear();
                session.relevance = RelevanceMatrix::default();
                session.impacts.clear();
                session.step = WizardStep::Scope;
            }
            debug!(target: "app::wizard", %session_id, activity = %activity, "activity selected");
            Ok(session.clone())
        })
    }

    pub async fn load_support_queues(&self, session_id: Uuid) -> AppResult<SupportQueuesView> {
        let session = self.get(session_id)?;
        ensure_reachable(&session, WizardStep::SupportQueues)?;

        let discovery = if session.queues.is_empty() && session.interventions.is_empty() {
            let activity = require_activity(&session)?;
            Some(self.provider.discover_queues(&session.site, activity).await?)
        } else {
            None
        };

        self.with_session(session_id, |session| {
            if let Some(discovery) = discovery {
                if session.queues.is_empty() && session.interventions.is_empty() {
                    session.relevance =
                        RelevanceMatrix::all_relevant(&discovery.interventions, &discovery.queues);
                    session.queues = discovery.queues;
                    session.interventions = discovery.interventions;
                }
            }
            advance(session, WizardStep::SupportQueues);
            Ok(SupportQueuesView {
                session_id,
                queues: session.queues.clone(),
                interventions: session.interventions.clone(),
                relevance: session.relevance.clone(),
                breadcrumbs: session_breadcrumbs(session, WizardStep::SupportQueues),
            })
        })
    }

    pub fn toggle_relevance(
        &self,
        session_id: Uuid,
        intervention_id: &str,
        queue_id: &str,
    ) -> AppResult<bool> {
        self.with_session(session_id, |session| {
            find_intervention(session, intervention_id)?;
            find_queue(session, queue_id)?;
            let relevant = session.relevance.toggle(intervention_id, queue_id);
            if !relevant {
                session.impacts.retain(|entry| {
                    !(entry.intervention_id == intervention_id && entry.queue_id == queue_id)
                });
            }
            Ok(relevant)
        })
    }

    pub fn update_queue_description(
        &self,
        session_id: Uuid,
        queue_id: &str,
        description: String,
    ) -> AppResult<SupportQueue> {
        self.with_session(session_id, |session| {
            let index = find_queue(session, queue_id)?;
            session.queues[index].description = description;
            Ok(session.queues[index].clone())
        })
    }

    pub fn add_queue(
        &self,
        session_id: Uuid,
        name: &str,
        description: String,
    ) -> AppResult<SupportQueue> {
        let name = require_name(name)?;
        let id = slugify(&name)?;

        self.with_session(session_id, |session| {
            ensure_reachable(session, WizardStep::SupportQueues)?;
            if session.queues.iter().any(|queue| queue.id == id) {
                return Err(AppError::conflict(format!("queue `{id}` already exists")));
            }
            let queue = SupportQueue {
                id,
                name,
                description,
            };
            session.relevance.add_queue(&queue.id, &session.interventions);
            session.queues.push(queue.clone());
            Ok(queue)
        })
    }

    pub fn remove_queue(&self, session_id: Uuid, queue_id: &str) -> AppResult<()> {
        self.with_session(session_id, |session| {
            let index = find_queue(session, queue_id)?;
            session.queues.remove(index);
            session.relevance.remove_queue(queue_id);
            session.impacts.retain(|entry| entry.queue_id != queue_id);
            Ok(())
        })
    }

    pub fn update_intervention(
        &self,
        session_id: Uuid,
        intervention_id: &str,
        update: InterventionUpdate,
    ) -> AppResult<AiIntervention> {
        let name = update.name.as_deref().map(require_name).transpose()?;

        self.with_session(session_id, |session| {
            let index = find_intervention(session, intervention_id)?;
            if let Some(name) = name.as_deref() {
                ensure_unique_intervention(session, name, Some(intervention_id))?;
            }
            let intervention = &mut session.interventions[index];
            if let Some(name) = name {
                intervention.name = name;
            }
            if let Some(description) = update.description {
                intervention.description = description;
            }
            if let Some(complexity) = update.complexity {
                intervention.complexity = complexity;
            }
            if let Some(category) = update.category {
                intervention.category = category;
            }

            let updated = intervention.clone();
            for entry in session
                .impacts
                .iter_mut()
                .filter(|entry| entry.intervention_id == updated.id)
            {
                entry.initiative = updated.name.clone();
                entry.category = updated.category;
            }
            Ok(updated)
        })
    }

    pub fn add_intervention(
        &self,
        session_id: Uuid,
        input: NewIntervention,
    ) -> AppResult<AiIntervention> {
        let name = require_name(&input.name)?;
        let id = slugify(&name)?;

        self.with_session(session_id, |session| {
            ensure_reachable(session, WizardStep::SupportQueues)?;
            ensure_unique_intervention(session, &name, None)?;
            let intervention = AiIntervention {
                id,
                name,
                description: input.description,
                complexity: input.complexity,
                category: input.category,
            };
            session
                .relevance
                .add_intervention(&intervention.id, &session.queues);
            session.interventions.push(intervention.clone());
            Ok(intervention)
        })
    }

    pub fn remove_intervention(&self, session_id: Uuid, intervention_id: &str) -> AppResult<()> {
        self.with_session(session_id, |session| {
            let index = find_intervention(session, intervention_id)?;
            session.interventions.remove(index);
            session.relevance.remove_intervention(intervention_id);
            session
                .impacts
                .retain(|entry| entry.intervention_id != intervention_id);
            Ok(())
        })
    }

    /// Re-estimates every relevant pair and keeps the user's edits for pairs
    /// that were already on the table.
    pub async fn load_impact_rationale(&self, session_id: Uuid) -> AppResult<ImpactRationaleView> {
        let session = self.get(session_id)?;
        ensure_reachable(&session, WizardStep::ImpactRationale)?;

        let estimates = self
            .provider
            .estimate_impacts(&session.interventions, &session.queues, &session.relevance)
            .await?;

        self.with_session(session_id, |session| {
            let entries = merge_impacts(estimates, &session.impacts);
            session.impacts = entries;
            advance(session, WizardStep::ImpactRationale);
            Ok(ImpactRationaleView {
                session_id,
                queue_count: session.queue_count(),
                entries: session.impacts.clone(),
                breadcrumbs: session_breadcrumbs(session, WizardStep::ImpactRationale),
            })
        })
    }

    /// Applies a percentage typed into the table. Non-numeric input counts as
    /// 0 and the value is clamped to 0..=100.
    pub fn update_impact_percentage(
        &self,
        session_id: Uuid,
        index: usize,
        raw_value: &str,
    ) -> AppResult<ImpactEntry> {
        let percentage = parse_percentage_input(raw_value);
        self.with_session(session_id, |session| {
            let entry = session.impacts.get_mut(index).ok_or_else(AppError::not_found)?;
            entry.impact_percentage = percentage;
            Ok(entry.clone())
        })
    }

    pub fn update_rationale(
        &self,
        session_id: Uuid,
        index: usize,
        rationale: String,
    ) -> AppResult<ImpactEntry> {
        self.with_session(session_id, |session| {
            let entry = session.impacts.get_mut(index).ok_or_else(AppError::not_found)?;
            entry.rationale = rationale;
            Ok(entry.clone())
        })
    }

    pub fn compute_productivity(&self, session_id: Uuid) -> AppResult<ProductivityView> {
        self.with_session(session_id, |session| {
            ensure_reachable(session, WizardStep::Productivity)?;
            let result = self.productivity.calculate(&session.impact_records())?;
            advance(session, WizardStep::Productivity);
            info!(
                target: "app::wizard",
                %session_id,
                records = result.summary.total_records,
                "productivity computed for session"
            );
            Ok(ProductivityView {
                session_id,
                result,
                breadcrumbs: session_breadcrumbs(session, WizardStep::Productivity),
            })
        })
    }

    pub fn export_report(&self, session_id: Uuid) -> AppResult<ProductivityReport> {
        let session = self.get(session_id)?;
        if session.step < WizardStep::Productivity {
            return Err(AppError::validation(
                "compute productivity before exporting the report",
            ));
        }
        let activity = require_activity(&session)?;
        self.productivity
            .build_report(&session.site, activity.as_str(), &session.impact_records())
    }

    fn with_session<T>(
        &self,
        session_id: Uuid,
        apply: impl FnOnce(&mut WizardSession) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut guard = self.sessions.write().map_err(|_| lock_poisoned())?;
        let session = guard.get_mut(&session_id).ok_or_else(AppError::not_found)?;
        let result = apply(session)?;
        session.updated_at = Utc::now().to_rfc3339();
        Ok(result)
    }
}

fn lock_poisoned() -> AppError {
    AppError::other("wizard session store lock poisoned")
}

fn advance(session: &mut WizardSession, step: WizardStep) {
    session.step = session.step.max(step);
}

fn session_breadcrumbs(session: &WizardSession, step: WizardStep) -> Vec<Breadcrumb> {
    breadcrumbs(step, &session.site, session.activity, session.queue_count())
}

fn require_activity(session: &WizardSession) -> AppResult<Activity> {
    session
        .activity
        .ok_or_else(|| AppError::validation("select a process excellence activity first"))
}

/// A step needs the data of every step before it; callers that skip ahead
/// are sent back with the step they still have to complete.
fn ensure_reachable(session: &WizardSession, step: WizardStep) -> AppResult<()> {
    match step {
        WizardStep::Start | WizardStep::Scope => Ok(()),
        WizardStep::SupportQueues => require_activity(session).map(|_| ()),
        WizardStep::ImpactRationale | WizardStep::Productivity => {
            require_activity(session)?;
            let previous = if step == WizardStep::ImpactRationale {
                WizardStep::SupportQueues
            } else {
                WizardStep::ImpactRationale
            };
            if session.step < previous {
                return Err(AppError::validation_with_details(
                    format!("step `{step}` is not reachable yet"),
                    serde_json::json!({ "currentStep": session.step, "requiredStep": previous }),
                ));
            }
            Ok(())
        }
    }
}

fn find_queue(session: &WizardSession, queue_id: &str) -> AppResult<usize> {
    session
        .queues
        .iter()
        .position(|queue| queue.id == queue_id)
        .ok_or_else(AppError::not_found)
}

fn find_intervention(session: &WizardSession, intervention_id: &str) -> AppResult<usize> {
    session
        .interventions
        .iter()
        .position(|item| item.id == intervention_id)
        .ok_or_else(AppError::not_found)
}

fn merge_impacts(estimates: Vec<ImpactEntry>, existing: &[ImpactEntry]) -> Vec<ImpactEntry> {
    estimates
        .into_iter()
        .map(|mut entry| {
            if let Some(previous) = existing.iter().find(|previous| {
                previous.intervention_id == entry.intervention_id
                    && previous.queue_id == entry.queue_id
            }) {
                entry.impact_percentage = previous.impact_percentage;
                entry.rationale = previous.rationale.clone();
            }
            entry
        })
        .collect()
}

/// Productivity groups by initiative name, so two interventions must never
/// share a name or slug. `except` is the intervention being renamed.
fn ensure_unique_intervention(
    session: &WizardSession,
    name: &str,
    except: Option<&str>,
) -> AppResult<()> {
    let slug = slugify(name)?;
    let clash = session
        .interventions
        .iter()
        .filter(|item| Some(item.id.as_str()) != except)
        .find(|item| {
            item.id == slug
                || item.name == name
                || slugify(&item.name).is_ok_and(|existing| existing == slug)
        });
    match clash {
        Some(item) => Err(AppError::conflict(format!(
            "intervention `{}` already uses the name `{name}`",
            item.id
        ))),
        None => Ok(()),
    }
}

fn require_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn slugify(name: &str) -> AppResult<String> {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        return Err(AppError::validation(format!(
            "`{name}` does not contain any letters or digits"
        )));
    }
    Ok(slug)
}

/// Leading integer of `raw` (`"45%"` -> 45), 0 when there is none, clamped
/// to 0..=100.
pub fn parse_percentage_input(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = match digits[..end].parse::<u64>() {
        Ok(value) => value.min(100) as f64,
        Err(_) if end > 0 => 100.0,
        Err(_) => 0.0,
    };
    if negative {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analysis_simulator::SimulatedAnalysisProvider;

    fn service() -> WizardService {
        WizardService::new(Arc::new(SimulatedAnalysisProvider::instant()))
    }

    #[test]
    fn test_parse_percentage_input() {
        assert_eq!(parse_percentage_input("45"), 45.0);
        assert_eq!(parse_percentage_input(" 45% "), 45.0);
        assert_eq!(parse_percentage_input("abc"), 0.0);
        assert_eq!(parse_percentage_input(""), 0.0);
        assert_eq!(parse_percentage_input("150"), 100.0);
        assert_eq!(parse_percentage_input("-20"), 0.0);
        assert_eq!(parse_percentage_input("99999999999999999999999"), 100.0);
        assert_eq!(parse_percentage_input("12.7"), 12.0);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Returns & Refunds").unwrap(), "returns-refunds");
        assert_eq!(slugify("  VIP  ").unwrap(), "vip");
        assert!(slugify("!!!").is_err());
    }

    #[test]
    fn test_start_rejects_invalid_site() {
        let service = service();
        assert!(service.start("not a domain").is_err());
        assert!(service.start("acme.io/pricing").is_err());
    }

    #[test]
    fn test_coming_soon_activity_rejected() {
        let service = service();
        let session = service.start("acme.io").unwrap();

        let err = service.select_activity(session.id, "go-to-market").unwrap_err();
        match err {
            AppError::Validation { message, .. } => assert_eq!(message, COMING_SOON_MESSAGE),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(service.get(session.id).unwrap().activity.is_none());
    }

    #[tokio::test]
    async fn test_steps_require_activity() {
        let service = service();
        let session = service.start("acme.io").unwrap();

        assert!(service.load_support_queues(session.id).await.is_err());
        assert!(service.load_impact_rationale(session.id).await.is_err());
        assert!(service.compute_productivity(session.id).is_err());
    }

    #[tokio::test]
    async fn test_impact_edits_survive_reload() {
        let service = service();
        let session = service.start("acme.io").unwrap();
        service.load_scope(session.id).await.unwrap();
        service.select_activity(session.id, "agentify").unwrap();
        service.load_support_queues(session.id).await.unwrap();
        service.load_impact_rationale(session.id).await.unwrap();

        service.update_impact_percentage(session.id, 0, "10").unwrap();
        service
            .update_rationale(session.id, 0, "edited".to_string())
            .unwrap();

        let view = service.load_impact_rationale(session.id).await.unwrap();
        assert_eq!(view.entries[0].impact_percentage, 10.0);
        assert_eq!(view.entries[0].rationale, "edited");
        assert_eq!(view.queue_count, 4);
    }

    #[tokio::test]
    async fn test_remove_queue_drops_related_entries() {
        let service = service();
        let session = service.start("acme.io").unwrap();
        service.select_activity(session.id, "agentify").unwrap();
        service.load_support_queues(session.id).await.unwrap();
        service.load_impact_rationale(session.id).await.unwrap();

        service.remove_queue(session.id, "billing").unwrap();

        let current = service.get(session.id).unwrap();
        assert_eq!(current.queues.len(), 3);
        assert_eq!(current.impacts.len(), 12);
        assert!(current.impacts.iter().all(|entry| entry.queue_id != "billing"));
        assert!(matches!(
            service.remove_queue(session.id, "billing"),
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_queue_conflicts() {
        let service = service();
        let session = service.start("acme.io").unwrap();
        service.select_activity(session.id, "agentify").unwrap();
        service.load_support_queues(session.id).await.unwrap();

        let added = service
            .add_queue(session.id, "Returns", "Refund requests".to_string())
            .unwrap();
        assert_eq!(added.id, "returns");

        let current = service.get(session.id).unwrap();
        assert!(current.relevance.is_relevant("chatbot", "returns"));
        assert!(matches!(
            service.add_queue(session.id, "returns", String::new()),
            Err(AppError::Conflict { .. })
        ));
    }
}
