use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiErrorCode, AppError, AppResult};
use crate::models::api::ApiEnvelope;
use crate::models::dashboard::MonthlyAggregate;
use crate::models::detail::DetailRow;
use crate::models::filter::{FilterKind, FilterOption, FilterSelection};
use crate::services::session_service::SessionService;

const RESOURCE_PLANNING_PATH: &str = "/project-management/dashboard/resource-planning";
const RESOURCE_PLANNING_DETAILS_PATH: &str =
    "/project-management/dashboard/resource-planning/details";

/// Structured request lifecycle hook. One collaborator receives every
/// started/succeeded/failed event instead of log calls scattered through the
/// fetch path.
pub trait ApiObserver: Send + Sync {
    fn request_started(&self, correlation_id: &str, method: &str, path: &str);
    fn request_succeeded(&self, correlation_id: &str, path: &str, status: u16, latency_ms: u128);
    fn request_failed(&self, correlation_id: &str, path: &str, error: &AppError);
}

/// Default observer: emits the lifecycle as `tracing` events under `app::api`.
pub struct TracingObserver;

impl ApiObserver for TracingObserver {
    fn request_started(&self, correlation_id: &str, method: &str, path: &str) {
        debug!(
            target: "app::api",
            correlation_id = %correlation_id,
            method = %method,
            path = %path,
            "request started"
        );
    }

    fn request_succeeded(&self, correlation_id: &str, path: &str, status: u16, latency_ms: u128) {
        debug!(
            target: "app::api",
            correlation_id = %correlation_id,
            path = %path,
            status,
            latency_ms,
            "request succeeded"
        );
    }

    fn request_failed(&self, correlation_id: &str, path: &str, error: &AppError) {
        warn!(
            target: "app::api",
            correlation_id = %correlation_id,
            path = %path,
            error = %error,
            "request failed"
        );
    }
}

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub http_timeout: StdDuration,
}

impl ApiClientConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("PLANBOARD_API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "https://api-oos.jojonomic.com/14".to_string());
        let http_timeout = std::env::var("PLANBOARD_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(StdDuration::from_secs)
            .unwrap_or(StdDuration::from_secs(10));

        Self {
            base_url,
            http_timeout,
        }
    }
}

/// Authenticated client for the project-management backend. Every call sends
/// the session token verbatim in `Authorization`; an empty token aborts
/// before any request leaves the process.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionService>,
    observer: Arc<dyn ApiObserver>,
}

impl ApiClient {
    pub fn new(session: Arc<SessionService>) -> AppResult<Self> {
        Self::with_config(ApiClientConfig::from_env(), session, Arc::new(TracingObserver))
    }

    pub fn with_config(
        config: ApiClientConfig,
        session: Arc<SessionService>,
        observer: Arc<dyn ApiObserver>,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| AppError::other(format!("初始化 HTTP 客户端失败: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            observer,
        })
    }

    pub async fn fetch_index(&self, kind: FilterKind) -> AppResult<Vec<FilterOption>> {
        self.execute(Method::GET, kind.endpoint(), &[]).await
    }

    pub async fn fetch_resource_planning(
        &self,
        selection: &FilterSelection,
    ) -> AppResult<Vec<MonthlyAggregate>> {
        let year = selection
            .year_value()
            .ok_or_else(|| AppError::validation("请先选择年份"))?;

        let mut params = vec![("year", year)];
        params.extend(selection.optional_params());

        self.execute(Method::POST, RESOURCE_PLANNING_PATH, &params)
            .await
    }

    pub async fn fetch_resource_planning_details(
        &self,
        id: &str,
        month: u32,
        selection: &FilterSelection,
    ) -> AppResult<Vec<DetailRow>> {
        let mut params = vec![("id", id.to_string()), ("month", month.to_string())];
        params.extend(selection.optional_params());

        self.execute(Method::POST, RESOURCE_PLANNING_DETAILS_PATH, &params)
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<Vec<T>> {
        let token = self.session.auth_token();
        if token.is_empty() {
            return Err(AppError::missing_token());
        }

        let correlation_id = Uuid::new_v4().to_string();
        let url = format!("{}{}", self.base_url, path);
        self.observer
            .request_started(&correlation_id, method.as_str(), path);

        let start = Instant::now();
        let response = self
            .client
            .request(method, &url)
            .header("Authorization", token.as_str())
            .query(params)
            .send()
            .await;

        let result = match response {
            Ok(resp) => {
                let status = resp.status();
                let latency_ms = start.elapsed().as_millis();
                let envelope: Option<ApiEnvelope<JsonValue>> = resp.json().await.ok();

                if !status.is_success() {
                    let message = envelope.as_ref().and_then(|body| body.message_if_any());
                    Err(Self::map_http_error(status, message, &correlation_id))
                } else {
                    match envelope {
                        None => Err(AppError::api_with_details(
                            ApiErrorCode::InvalidResponse,
                            "解析服务端响应失败",
                            Some(correlation_id.as_str()),
                            Some(json!({ "reason": "invalid_json" })),
                        )),
                        Some(body) if body.error => Err(AppError::api_with_details(
                            ApiErrorCode::BackendRejected,
                            body.message_if_any().unwrap_or("服务端返回错误").to_string(),
                            Some(correlation_id.as_str()),
                            Some(json!({ "code": body.code })),
                        )),
                        Some(body) => {
                            self.observer.request_succeeded(
                                &correlation_id,
                                path,
                                status.as_u16(),
                                latency_ms,
                            );
                            Self::decode_items(body.data, &correlation_id)
                        }
                    }
                }
            }
            Err(err) => Err(Self::error_from_reqwest(err, &correlation_id)),
        };

        if let Err(error) = &result {
            self.observer.request_failed(&correlation_id, path, error);
        }

        result
    }

    fn decode_items<T: DeserializeOwned>(
        items: Vec<JsonValue>,
        correlation_id: &str,
    ) -> AppResult<Vec<T>> {
        items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|err| {
                    AppError::api_with_details(
                        ApiErrorCode::InvalidResponse,
                        format!("服务端数据格式异常: {err}"),
                        Some(correlation_id),
                        Some(json!({ "reason": "invalid_item" })),
                    )
                })
            })
            .collect()
    }

    fn map_http_error(
        status: StatusCode,
        envelope_message: Option<&str>,
        correlation_id: &str,
    ) -> AppError {
        let (code, default_message) = match status {
            StatusCode::UNAUTHORIZED => {
                (ApiErrorCode::Unauthorized, "访问令牌无效或未授权".to_string())
            }
            StatusCode::FORBIDDEN => (ApiErrorCode::Forbidden, "没有访问该资源的权限".to_string()),
            StatusCode::NOT_FOUND => (ApiErrorCode::InvalidRequest, "接口地址无效".to_string()),
            StatusCode::BAD_REQUEST => {
                (ApiErrorCode::InvalidRequest, "请求参数无效".to_string())
            }
            status if status.is_server_error() => (
                ApiErrorCode::BackendUnavailable,
                format!("服务暂时不可用 (状态码 {})", status.as_u16()),
            ),
            status => (
                ApiErrorCode::Unknown,
                format!("服务端返回错误状态码 {}", status.as_u16()),
            ),
        };

        let message = envelope_message
            .map(|value| value.to_string())
            .unwrap_or(default_message);

        AppError::api_with_details(
            code,
            message,
            Some(correlation_id),
            Some(json!({ "status": status.as_u16() })),
        )
    }

    fn error_from_reqwest(err: reqwest::Error, correlation_id: &str) -> AppError {
        if err.is_timeout() {
            AppError::api_with_details(
                ApiErrorCode::HttpTimeout,
                "请求超时，请稍后重试",
                Some(correlation_id),
                None,
            )
        } else if err.is_connect() {
            AppError::api_with_details(
                ApiErrorCode::BackendUnavailable,
                "网络连接失败",
                Some(correlation_id),
                None,
            )
        } else if let Some(status) = err.status() {
            Self::map_http_error(status, None, correlation_id)
        } else {
            AppError::api_with_details(
                ApiErrorCode::Unknown,
                format!("请求失败: {err}"),
                Some(correlation_id),
                None,
            )
        }
    }
}

pub mod testing {
    use super::*;
    use std::path::Path;

    /// Expose the status mapping for integration tests without widening the
    /// public API surface.
    pub fn map_http_error(status: StatusCode, envelope_message: Option<&str>) -> AppError {
        ApiClient::map_http_error(status, envelope_message, "test-correlation-id")
    }

    /// Client against an arbitrary base URL (mock server) backed by a session
    /// rooted in `data_dir`.
    pub fn client_with_base_url(
        base_url: &str,
        data_dir: &Path,
        timeout: StdDuration,
    ) -> (ApiClient, Arc<SessionService>) {
        let session = Arc::new(SessionService::new(data_dir));
        let config = ApiClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_timeout: timeout,
        };
        let client = ApiClient::with_config(config, Arc::clone(&session), Arc::new(TracingObserver))
            .expect("build test client");
        (client, session)
    }
}
