use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::settings::AppSettings;
use crate::utils::logger::DEFAULT_LOG_DIRECTIVES;

pub const SETTINGS_FILE_NAME: &str = "apex.yaml";

const DEFAULT_SIMULATED_LATENCY_MS: u64 = 2_000;
const MAX_SIMULATED_LATENCY_MS: u64 = 60_000;
const DEFAULT_IMPACT_PERCENTAGE: f64 = 50.0;

#[derive(Debug, Default, Clone)]
pub struct SettingsUpdateInput {
    pub simulated_latency_ms: Option<u64>,
    pub log_directives: Option<String>,
    pub default_impact_percentage: Option<f64>,
}

/// Optional overrides read from `apex.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SettingsFile {
    simulated_latency_ms: Option<u64>,
    log_directives: Option<String>,
    default_impact_percentage: Option<f64>,
}

impl SettingsFile {
    fn into_input(self) -> SettingsUpdateInput {
        SettingsUpdateInput {
            simulated_latency_ms: self.simulated_latency_ms,
            log_directives: self.log_directives,
            default_impact_percentage: self.default_impact_percentage,
        }
    }
}

/// In-memory settings. Overrides from disk are read once; updates are never
/// written back.
pub struct SettingsService {
    source: Option<PathBuf>,
    cache: RwLock<AppSettings>,
}

impl SettingsService {
    pub fn new() -> Self {
        Self {
            source: None,
            cache: RwLock::new(default_settings()),
        }
    }

    /// Defaults without artificial latency, for headless use and tests.
    pub fn headless() -> Self {
        let mut settings = default_settings();
        settings.simulated_latency_ms = 0;
        Self {
            source: None,
            cache: RwLock::new(settings),
        }
    }

    /// Loads `apex.yaml` from `data_dir` when it exists.
    pub fn from_data_dir(data_dir: &Path) -> AppResult<Self> {
        let path = data_dir.join(SETTINGS_FILE_NAME);
        if !path.exists() {
            info!(target: "app::settings", path = %path.display(), "no settings file, using defaults");
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(&path)?;
        let file: SettingsFile = if contents.trim().is_empty() {
            SettingsFile::default()
        } else {
            serde_yaml::from_str(&contents)?
        };

        let mut settings = default_settings();
        apply_update(&mut settings, file.into_input())?;
        info!(target: "app::settings", path = %path.display(), "settings loaded");

        Ok(Self {
            source: Some(path),
            cache: RwLock::new(settings),
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn get(&self) -> AppResult<AppSettings> {
        self.cache
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| AppError::other("settings lock poisoned"))
    }

    /// Applies a runtime change. Log directives feed the tracing filter
    /// installed at startup, so they can only be changed in `apex.yaml`.
    pub fn update(&self, input: SettingsUpdateInput) -> AppResult<AppSettings> {
        if input.log_directives.is_some() {
            return Err(AppError::validation_with_details(
                "log directives are read from apex.yaml at startup",
                serde_json::json!({ "field": "logDirectives" }),
            ));
        }

        let mut guard = self
            .cache
            .write()
            .map_err(|_| AppError::other("settings lock poisoned"))?;

        let mut next = guard.clone();
        apply_update(&mut next, input)?;
        *guard = next.clone();
        Ok(next)
    }
}

impl Default for SettingsService {
    fn default() -> Self {
        Self::new()
    }
}

fn default_settings() -> AppSettings {
    AppSettings {
        simulated_latency_ms: DEFAULT_SIMULATED_LATENCY_MS,
        log_directives: DEFAULT_LOG_DIRECTIVES.to_string(),
        default_impact_percentage: DEFAULT_IMPACT_PERCENTAGE,
        updated_at: Utc::now().to_rfc3339(),
    }
}

fn apply_update(settings: &mut AppSettings, input: SettingsUpdateInput) -> AppResult<()> {
    if let Some(latency) = input.simulated_latency_ms {
        if latency > MAX_SIMULATED_LATENCY_MS {
            return Err(AppError::validation(format!(
                "simulated latency must not exceed {MAX_SIMULATED_LATENCY_MS} ms"
            )));
        }
        settings.simulated_latency_ms = latency;
    }

    if let Some(directives) = input.log_directives {
        let trimmed = directives.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("log directives must not be empty"));
        }
        settings.log_directives = trimmed.to_string();
    }

    if let Some(percentage) = input.default_impact_percentage {
        if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
            warn!(target: "app::settings", percentage, "rejecting default impact percentage");
            return Err(AppError::validation(
                "default impact percentage must be between 0 and 100",
            ));
        }
        settings.default_impact_percentage = percentage;
    }

    settings.updated_at = Utc::now().to_rfc3339();
    Ok(())
}
