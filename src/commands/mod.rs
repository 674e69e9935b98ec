pub mod dashboard;
pub mod export;
pub mod filters;
pub mod session;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{error, warn};

use crate::error::{AppError, AppResult};
use crate::services::api_client::ApiClient;
use crate::services::dashboard_service::DashboardService;
use crate::services::export_service::ExportService;
use crate::services::filter_service::FilterService;
use crate::services::session_service::SessionService;

#[derive(Clone)]
pub struct AppState {
    session: Arc<SessionService>,
    api_client: Arc<ApiClient>,
    filter_service: Arc<FilterService>,
    dashboard_service: Arc<DashboardService>,
    export_service: Arc<ExportService>,
}

impl AppState {
    pub fn new(data_dir: &Path) -> AppResult<Self> {
        let session = Arc::new(SessionService::new(data_dir));
        let api_client = Arc::new(ApiClient::new(Arc::clone(&session))?);
        let filter_service = Arc::new(FilterService::new(Arc::clone(&api_client)));
        let dashboard_service = Arc::new(DashboardService::new(
            Arc::clone(&api_client),
            Arc::clone(&session),
        ));
        let export_service = Arc::new(ExportService::new(data_dir)?);

        Ok(Self {
            session,
            api_client,
            filter_service,
            dashboard_service,
            export_service,
        })
    }

    pub fn session(&self) -> Arc<SessionService> {
        Arc::clone(&self.session)
    }

    pub fn api(&self) -> Arc<ApiClient> {
        Arc::clone(&self.api_client)
    }

    pub fn filters(&self) -> Arc<FilterService> {
        Arc::clone(&self.filter_service)
    }

    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard_service)
    }

    pub fn export(&self) -> Arc<ExportService> {
        Arc::clone(&self.export_service)
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
            AppError::Api {
                code,
                message,
                correlation_id,
                details,
            } => {
                let mut merged = serde_json::Map::new();
                if let Some(existing) = details {
                    match existing {
                        JsonValue::Object(map) => {
                            for (key, value) in map {
                                merged.insert(key, value);
                            }
                        }
                        value => {
                            merged.insert("info".to_string(), value);
                        }
                    }
                }
                if let Some(id) = correlation_id {
                    merged.insert("correlationId".to_string(), JsonValue::String(id));
                }
                let detail_value = if merged.is_empty() {
                    None
                } else {
                    Some(JsonValue::Object(merged))
                };
                CommandError::new(code.as_str(), message, detail_value)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "序列化失败", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "文件系统读写失败", None)
            }
            AppError::Other(message) => {
                warn!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
