#[cfg(feature = "desktop")]
pub mod productivity;
#[cfg(feature = "desktop")]
pub mod settings;
#[cfg(feature = "desktop")]
pub mod wizard;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::services::analysis_simulator::{AnalysisProvider, SimulatedAnalysisProvider};
use crate::services::productivity_service::ProductivityService;
use crate::services::settings_service::SettingsService;
use crate::services::wizard_service::WizardService;

#[derive(Clone)]
pub struct AppState {
    settings_service: Arc<SettingsService>,
    productivity_service: Arc<ProductivityService>,
    wizard_service: Arc<WizardService>,
}

impl AppState {
    pub fn new(settings_service: SettingsService) -> AppResult<Self> {
        let settings_service = Arc::new(settings_service);
        // Surface a poisoned or unreadable settings store at startup.
        settings_service.get()?;

        let provider: Arc<dyn AnalysisProvider> =
            Arc::new(SimulatedAnalysisProvider::new(Arc::clone(&settings_service)));
        Ok(Self::with_provider(settings_service, provider))
    }

    pub fn with_provider(
        settings_service: Arc<SettingsService>,
        provider: Arc<dyn AnalysisProvider>,
    ) -> Self {
        Self {
            settings_service,
            productivity_service: Arc::new(ProductivityService::new()),
            wizard_service: Arc::new(WizardService::new(provider)),
        }
    }

    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings_service)
    }

    pub fn productivity(&self) -> Arc<ProductivityService> {
        Arc::clone(&self.productivity_service)
    }

    pub fn wizard(&self) -> Arc<WizardService> {
        Arc::clone(&self.wizard_service)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation {
                message, details, ..
            } => CommandError::new("VALIDATION_ERROR", message, details),
            AppError::InvalidRecord { index, reason } => CommandError::new(
                "INVALID_RECORD",
                reason,
                Some(serde_json::json!({ "index": index })),
            ),
            AppError::NotFound => {
                CommandError::new("NOT_FOUND", "the requested resource does not exist", None)
            }
            AppError::Conflict { message } => CommandError::new("CONFLICT", message, None),
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Config(error) => {
                error!(target: "app::command", error = %error, "configuration error in command");
                CommandError::new("CONFIG_ERROR", error.to_string(), None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "file system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_record_maps_to_indexed_command_error() {
        let error = CommandError::from(AppError::invalid_record(2, "impact percentage must be finite"));
        assert_eq!(error.code, "INVALID_RECORD");
        assert_eq!(error.message, "impact percentage must be finite");
        assert_eq!(error.details, Some(serde_json::json!({ "index": 2 })));
    }

    #[test]
    fn validation_keeps_details() {
        let error = CommandError::from(AppError::validation_with_details(
            "coming soon",
            serde_json::json!({ "activity": "go-to-market" }),
        ));
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert_eq!(error.details.unwrap()["activity"], "go-to-market");
    }

    #[test]
    fn app_state_shares_services() {
        let state = AppState::new(SettingsService::headless()).unwrap();
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.wizard(), &clone.wizard()));
        assert!(Arc::ptr_eq(&state.settings(), &clone.settings()));
    }
}
