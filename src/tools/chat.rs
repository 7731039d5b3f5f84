//! powerdrill_chat tool - ask a question about a Powerdrill dataset

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{ChatParameters, Tool, ToolMessages};
use crate::api::{Block, CreateJobRequest, PowerdrillApi, PowerdrillClient};
use crate::dispatch::{BlockDispatcher, ToolMessage};
use crate::error::Result;
use crate::session::SessionCache;

/// Long-lived tool instance; owns the session cache shared by invocations
pub struct PowerdrillChatTool {
    http: Client,
    sessions: SessionCache,
}

impl PowerdrillChatTool {
    /// Tool without a request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http(builder.build()?))
    }

    /// Tool sharing an existing connection pool
    pub fn with_http(http: Client) -> Self {
        Self {
            http,
            sessions: SessionCache::new(),
        }
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    /// Resolve the session, submit the question, and dispatch the answer
    pub async fn run(
        &self,
        api: &dyn PowerdrillApi,
        params: &ChatParameters,
    ) -> Result<BlockDispatcher<std::vec::IntoIter<Block>>> {
        let session_id = self.sessions.resolve(api, &params.user_id).await?;

        let request = CreateJobRequest::new(
            session_id,
            params.user_id.as_str(),
            params.dataset_id.as_str(),
            params.question.as_str(),
        )
        .with_datasource_ids(params.datasource_ids.clone())
        .with_citation(params.with_citation);

        let job = api.create_job(&request).await?;
        log::info!(
            "Job for user {} in dataset {} returned {} blocks",
            params.user_id,
            params.dataset_id,
            job.blocks.len()
        );

        Ok(BlockDispatcher::new(job.blocks, params.with_citation))
    }
}

#[async_trait]
impl Tool for PowerdrillChatTool {
    fn name(&self) -> &'static str {
        "powerdrill_chat"
    }

    fn description(&self) -> &'static str {
        "Ask a question about a Powerdrill dataset and get the answer with optional citations and images."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "api_key": {
                    "type": "string",
                    "description": "Powerdrill team API key"
                },
                "base_url": {
                    "type": "string",
                    "description": "Powerdrill API base URL, e.g. https://ai.data.cloud/api/v2"
                },
                "user_id": {
                    "type": "string",
                    "description": "Powerdrill user the session belongs to"
                },
                "question": {
                    "type": "string",
                    "description": "Question to ask about the dataset"
                },
                "dataset_id": {
                    "type": "string",
                    "description": "Dataset to query"
                },
                "datasource_id": {
                    "type": "string",
                    "description": "Comma-separated datasource ids to narrow the search (default: all)"
                },
                "with_citation": {
                    "type": "boolean",
                    "description": "Append the sources the answer was drawn from",
                    "default": false
                }
            },
            "required": ["api_key", "base_url", "user_id", "question", "dataset_id"]
        })
    }

    async fn invoke(&self, params: Value) -> Result<ToolMessages> {
        // Parameter problems become a message; no request is sent
        let params = match ChatParameters::from_value(&params) {
            Ok(params) => params,
            Err(e) => {
                log::warn!("Rejected invocation: {}", e);
                return Ok(Box::new(std::iter::once(ToolMessage::error(e.to_string()))));
            }
        };

        let api = PowerdrillClient::with_http(
            self.http.clone(),
            params.base_url.as_str(),
            params.api_key.as_str(),
        );
        let messages = self.run(&api, &params).await?;

        Ok(Box::new(messages))
    }
}
