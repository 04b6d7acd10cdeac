use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{
    ActiveQueue, AnalyticsMetrics, ConversationListPayload, DashboardSummary, EmailListPayload,
    EscalationStatus, LpoQueuePayload, ProcessingStatus, SettingsRecord,
};
use crate::services::aggregator::{DashboardBackend, DashboardQuery};
use crate::services::settings::{ResourceKind, SettingsBackend};

pub type ClientResult<T> = Result<T, ClientError>;

/// Query string pairs in the order they are sent.
pub type QueryParams = Vec<(&'static str, String)>;

#[derive(Clone)]
pub struct LpoClient {
    inner: reqwest::Client,
    config: Arc<AppConfig>,
    base_url: String,
    escalation_base_url: String,
}

impl LpoClient {
    pub fn new(config: AppConfig) -> ClientResult<Self> {
        let base_url = normalize_base_url(&config.api_base_url);
        let escalation_base_url = normalize_base_url(&config.escalation_endpoint());

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout);

        let client = builder
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            inner: client,
            config: Arc::new(config),
            base_url,
            escalation_base_url,
        })
    }

    pub async fn get_dashboard_summary(
        &self,
        query: &DashboardQuery,
    ) -> ClientResult<DashboardSummary> {
        let builder = self.request(Method::GET, "dashboard/summary").query(query);
        self.send_data(builder).await
    }

    pub async fn get_processing_status(
        &self,
        query: &DashboardQuery,
    ) -> ClientResult<ProcessingStatus> {
        let builder = self
            .request(Method::GET, "dashboard/processing-status")
            .query(query);
        self.send_data(builder).await
    }

    pub async fn get_analytics(&self, query: &DashboardQuery) -> ClientResult<AnalyticsMetrics> {
        let builder = self.request(Method::GET, "analytics/overview").query(query);
        self.send_data(builder).await
    }

    pub async fn get_active_queue(&self, query: &DashboardQuery) -> ClientResult<ActiveQueue> {
        let builder = self
            .request(Method::GET, "dashboard/active-queue")
            .query(query);
        self.send_data(builder).await
    }

    pub async fn get_lpo_queue(&self, params: &QueryParams) -> ClientResult<LpoQueuePayload> {
        let builder = self.request(Method::GET, "lpos/queue").query(params);
        self.send_data(builder).await
    }

    pub async fn get_emails(&self, params: &QueryParams) -> ClientResult<EmailListPayload> {
        let builder = self.request(Method::GET, "emails").query(params);
        self.send_data(builder).await
    }

    pub async fn get_conversations(
        &self,
        params: &QueryParams,
    ) -> ClientResult<ConversationListPayload> {
        let builder = self.request(Method::GET, "conversations").query(params);
        self.send_data(builder).await
    }

    /// Escalation status lives on a separate, cross-origin service and is the
    /// only call bounded by its own deadline.
    pub async fn get_escalation_status(
        &self,
        conversation_id: &str,
    ) -> ClientResult<EscalationStatus> {
        let url = format!(
            "{}/escalations/{}/status",
            self.escalation_base_url,
            conversation_id.trim()
        );
        let limit = self.config.escalation_timeout;
        let builder = self.authorize(self.inner.request(Method::GET, url));
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(limit);

        with_deadline(self.send_data(builder), limit).await
    }

    pub async fn list_settings(&self, kind: ResourceKind) -> ClientResult<Vec<SettingsRecord>> {
        let builder = self.request(Method::GET, &settings_path(kind, None));
        self.send_data(builder).await
    }

    pub async fn create_settings(&self, kind: ResourceKind, body: &Value) -> ClientResult<()> {
        let builder = self
            .request(Method::POST, &settings_path(kind, None))
            .json(body);
        self.send_ack(builder).await
    }

    pub async fn update_settings(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Value,
    ) -> ClientResult<()> {
        let builder = self
            .request(Method::PUT, &settings_path(kind, Some(id)))
            .json(body);
        self.send_ack(builder).await
    }

    pub async fn delete_settings(&self, kind: ResourceKind, id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &settings_path(kind, Some(id)));
        self.send_ack(builder).await
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.join_path(path);
        self.authorize(self.inner.request(method, url))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.bearer_token() {
            Some(token) => builder.header(header::AUTHORIZATION, token),
            None => builder,
        }
    }

    fn join_path(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Accepts a response only when it is 2xx, parses as an envelope, carries
    /// `status: "success"` and has a `data` payload.
    async fn send_data<T>(&self, builder: reqwest::RequestBuilder) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let envelope: ApiEnvelope<T> = self.send(builder).await?;
        envelope.data.ok_or(ClientError::MissingData)
    }

    /// Mutations may answer with a bare success marker and no payload.
    async fn send_ack(&self, builder: reqwest::RequestBuilder) -> ClientResult<()> {
        let _: ApiEnvelope<Value> = self.send(builder).await?;
        Ok(())
    }

    async fn send<T>(&self, builder: reqwest::RequestBuilder) -> ClientResult<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await.map_err(ClientError::from)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::from)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiEnvelope<Value>>(&bytes)
                .ok()
                .and_then(|envelope| envelope.message);
            return Err(match message {
                Some(message) => ClientError::Api {
                    status: Some(status),
                    message,
                },
                None => ClientError::UnexpectedStatus {
                    status,
                    body: bytes.to_vec(),
                },
            });
        }

        if bytes.is_empty() {
            return Err(ClientError::EmptyResponse(status));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes).map_err(ClientError::from)?;

        match envelope.status {
            ApiStatus::Success => Ok(envelope),
            _ => Err(ClientError::Api {
                status: Some(status),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request rejected by server".to_string()),
            }),
        }
    }
}

fn settings_path(kind: ResourceKind, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("settings/{}/{}", kind.path(), id.trim()),
        None => format!("settings/{}", kind.path()),
    }
}

fn normalize_base_url(input: &str) -> String {
    input.trim_end_matches('/').to_string()
}

#[cfg(target_arch = "wasm32")]
async fn with_deadline<F, T>(request: F, limit: Duration) -> ClientResult<T>
where
    F: std::future::Future<Output = ClientResult<T>>,
{
    use futures::future::{select, Either};
    use gloo_timers::future::TimeoutFuture;

    let millis = u32::try_from(limit.as_millis()).unwrap_or(u32::MAX);
    let timer = TimeoutFuture::new(millis);
    futures::pin_mut!(request);

    match select(request, timer).await {
        Either::Left((result, _)) => result,
        // Dropping the request future aborts the underlying fetch.
        Either::Right(_) => Err(ClientError::Timeout(limit)),
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn with_deadline<F, T>(request: F, limit: Duration) -> ClientResult<T>
where
    F: std::future::Future<Output = ClientResult<T>>,
{
    match request.await {
        Err(ClientError::Transport(err)) if err.is_timeout() => Err(ClientError::Timeout(limit)),
        other => other,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub status: ApiStatus,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{message}")]
    Api {
        status: Option<StatusCode>,
        message: String,
    },
    #[error("response carried no data payload")]
    MissingData,
    #[error("empty response body: {0}")]
    EmptyResponse(StatusCode),
    #[error("unexpected status {status}: {body:?}")]
    UnexpectedStatus { status: StatusCode, body: Vec<u8> },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("client setup failed: {0}")]
    Setup(#[from] anyhow::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => *status,
            Self::EmptyResponse(status) => Some(*status),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

#[async_trait(?Send)]
impl DashboardBackend for LpoClient {
    async fn summary(&self, query: &DashboardQuery) -> ClientResult<DashboardSummary> {
        self.get_dashboard_summary(query).await
    }

    async fn processing_status(&self, query: &DashboardQuery) -> ClientResult<ProcessingStatus> {
        self.get_processing_status(query).await
    }

    async fn lpo_queue(&self, params: &QueryParams) -> ClientResult<LpoQueuePayload> {
        self.get_lpo_queue(params).await
    }

    async fn analytics(&self, query: &DashboardQuery) -> ClientResult<AnalyticsMetrics> {
        self.get_analytics(query).await
    }

    async fn active_queue(&self, query: &DashboardQuery) -> ClientResult<ActiveQueue> {
        self.get_active_queue(query).await
    }
}

#[async_trait(?Send)]
impl SettingsBackend for LpoClient {
    async fn list(&self, kind: ResourceKind) -> ClientResult<Vec<SettingsRecord>> {
        self.list_settings(kind).await
    }

    async fn create(&self, kind: ResourceKind, body: &Value) -> ClientResult<()> {
        self.create_settings(kind, body).await
    }

    async fn update(&self, kind: ResourceKind, id: &str, body: &Value) -> ClientResult<()> {
        self.update_settings(kind, id, body).await
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> ClientResult<()> {
        self.delete_settings(kind, id).await
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> LpoClient {
        let config = AppConfig {
            api_base_url: format!("{}/api/", server.uri()),
            auth_token: Some("secret".into()),
            escalation_timeout: Duration::from_millis(200),
            ..AppConfig::default()
        };
        LpoClient::new(config).expect("client builds")
    }

    #[tokio::test]
    async fn accepts_success_envelope_with_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard/summary"))
            .and(query_param("date", "2024-05-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"emails_processed": 120, "lpos_extracted": 40}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let query = DashboardQuery {
            date: Some("2024-05-01".into()),
            ..DashboardQuery::default()
        };
        let summary = client.get_dashboard_summary(&query).await.unwrap();
        assert_eq!(summary.emails_processed, 120);
        assert_eq!(summary.lpos_extracted, 40);
    }

    #[tokio::test]
    async fn rejects_error_status_marker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "message": "database unavailable"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_processing_status(&DashboardQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { ref message, .. } if message == "database unavailable"));
    }

    #[tokio::test]
    async fn rejects_success_without_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_analytics(&DashboardQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MissingData));
    }

    #[tokio::test]
    async fn non_2xx_is_reported_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_active_queue(&DashboardQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_lpo_queue(&Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn delete_accepts_bare_success_and_sends_token() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/settings/price-tolerances/12"))
            .and(wiremock::matchers::header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "message": "deleted"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .delete_settings(ResourceKind::PriceTolerance, "12")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn escalation_status_respects_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/escalations/c-9/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success", "data": {"state": "active"}}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_escalation_status("c-9")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)));
    }
}
