//! HTTP implementation of the Powerdrill team API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::client::PowerdrillApi;
use crate::api::types::{ApiEnvelope, CreateJobRequest, CreateSessionRequest, JobData, SessionData};
use crate::error::{PowerdrillError, Result};

/// Header carrying the team API key
pub const API_KEY_HEADER: &str = "x-pd-api-key";

/// Public Powerdrill endpoint
pub const DEFAULT_BASE_URL: &str = "https://ai.data.cloud/api/v2";

const SESSIONS_PATH: &str = "/team/sessions";
const JOBS_PATH: &str = "/team/jobs";

/// Connection settings for one API key against one deployment
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// `None` waits for upstream as long as it takes
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Powerdrill API client
pub struct PowerdrillClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PowerdrillClient {
    /// Create a client with its own connection pool
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self::with_http(client, config.base_url, config.api_key))
    }

    /// Create a client that shares an existing connection pool
    pub fn with_http(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and unwrap the `data` member of the response
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        log::debug!("POST {} payload: {}", url, serde_json::to_string(body)?);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::warn!("POST {} failed with {}: {}", url, status, error_body);
            return Err(PowerdrillError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let text = response.text().await?;
        log::debug!("POST {} response: {}", url, text);

        let envelope: ApiEnvelope<T> = serde_json::from_str(&text)?;
        envelope
            .data
            .ok_or_else(|| PowerdrillError::InvalidResponse(format!("{} response has no data", path)))
    }
}

#[async_trait]
impl PowerdrillApi for PowerdrillClient {
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<String> {
        let data: SessionData = self.post(SESSIONS_PATH, request).await?;
        Ok(data.id)
    }

    async fn create_job(&self, request: &CreateJobRequest) -> Result<JobData> {
        self.post(JOBS_PATH, request).await
    }
}

impl std::fmt::Debug for PowerdrillClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerdrillClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Block;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PowerdrillClient {
        PowerdrillClient::new(ClientConfig::new(server.uri(), "test-key")).unwrap()
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let client = PowerdrillClient::with_http(Client::new(), "http://host/api/v2/", "k");
        assert_eq!(client.base_url(), "http://host/api/v2");
        assert_eq!(client.endpoint(SESSIONS_PATH), "http://host/api/v2/team/sessions");
    }

    #[test]
    fn test_debug_impl_hides_api_key() {
        let client = PowerdrillClient::with_http(Client::new(), "http://host", "secret-key");
        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("PowerdrillClient"));
        assert!(!debug_str.contains("secret-key"));

        let config = ClientConfig::new("http://host", "secret-key");
        assert!(!format!("{:?}", config).contains("secret-key"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PowerdrillClient>();
    }

    #[tokio::test]
    async fn test_create_session_posts_fixed_config() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/team/sessions"))
            .and(header("x-pd-api-key", "test-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "name": "Session for alice",
                "user_id": "alice",
                "output_language": "AUTO",
                "job_mode": "AUTO",
                "max_contextual_job_history": 10
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"id": "sess-123"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server)
            .create_session(&CreateSessionRequest::for_user("alice"))
            .await
            .unwrap();

        assert_eq!(id, "sess-123");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_create_job_posts_payload_and_parses_blocks() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/team/jobs"))
            .and(header("x-pd-api-key", "test-key"))
            .and(body_json(json!({
                "session_id": "sess-123",
                "user_id": "alice",
                "dataset_id": "ds-1",
                "datasource_ids": ["a", "b"],
                "stream": false,
                "question": "What is the total?",
                "output_language": "AUTO",
                "custom_options": {"with_citation": true},
                "job_mode": "AUTO"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {
                    "job_id": "job-1",
                    "blocks": [
                        {"type": "MESSAGE", "content": "42"},
                        {"type": "TABLE", "content": {"url": "http://x/t.csv"}}
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = CreateJobRequest::new("sess-123", "alice", "ds-1", "What is the total?")
            .with_datasource_ids(Some(vec!["a".into(), "b".into()]))
            .with_citation(true);
        let data = client_for(&server).create_job(&request).await.unwrap();

        assert_eq!(data.blocks.len(), 2);
        assert_eq!(data.blocks[0], Block::message("42"));
        assert!(matches!(data.blocks[1], Block::Unknown { .. }));
        server.verify().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/team/jobs"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_job(&CreateJobRequest::new("s", "u", "d", "q"))
            .await
            .unwrap_err();

        match err {
            PowerdrillError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal failure");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_session_id_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/team/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_session(&CreateSessionRequest::for_user("u"))
            .await
            .unwrap_err();

        assert!(matches!(err, PowerdrillError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client = PowerdrillClient::new(
            ClientConfig::new("http://127.0.0.1:1", "k").with_timeout(Some(Duration::from_secs(2))),
        )
        .unwrap();

        let err = client
            .create_session(&CreateSessionRequest::for_user("u"))
            .await
            .unwrap_err();

        assert!(matches!(err, PowerdrillError::Network(_)));
    }
}
