//! Wire types for the Powerdrill team API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Language and mode sent on every request; upstream picks the best fit
pub const AUTO: &str = "AUTO";

/// How many previous jobs upstream keeps as context for a session
pub const MAX_CONTEXTUAL_JOB_HISTORY: u32 = 10;

/// Body of `POST /team/sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub user_id: String,
    pub output_language: String,
    pub job_mode: String,
    pub max_contextual_job_history: u32,
}

impl CreateSessionRequest {
    /// Session request with the fixed configuration used for every user
    pub fn for_user(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            name: format!("Session for {}", user_id),
            user_id,
            output_language: AUTO.to_string(),
            job_mode: AUTO.to_string(),
            max_contextual_job_history: MAX_CONTEXTUAL_JOB_HISTORY,
        }
    }
}

/// Per-job options understood by upstream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomOptions {
    pub with_citation: bool,
}

/// Body of `POST /team/jobs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub session_id: String,
    pub user_id: String,
    pub dataset_id: String,
    /// `None` serializes as `null`, meaning every datasource in the dataset
    pub datasource_ids: Option<Vec<String>>,
    pub stream: bool,
    pub question: String,
    pub output_language: String,
    pub custom_options: CustomOptions,
    pub job_mode: String,
}

impl CreateJobRequest {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        dataset_id: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            dataset_id: dataset_id.into(),
            datasource_ids: None,
            stream: false,
            question: question.into(),
            output_language: AUTO.to_string(),
            custom_options: CustomOptions::default(),
            job_mode: AUTO.to_string(),
        }
    }

    pub fn with_datasource_ids(mut self, ids: Option<Vec<String>>) -> Self {
        self.datasource_ids = ids;
        self
    }

    pub fn with_citation(mut self, with_citation: bool) -> Self {
        self.custom_options.with_citation = with_citation;
        self
    }
}

/// Split a comma-separated datasource filter into ids.
///
/// Returns `None` when nothing usable remains, which upstream reads as
/// "search all datasources".
pub fn parse_datasource_ids(raw: Option<&str>) -> Option<Vec<String>> {
    let ids: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect();

    if ids.is_empty() { None } else { Some(ids) }
}

/// Every response wraps its payload in `data`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionData {
    pub id: String,
}

/// Payload of a finished job
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobData {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// One unit of a job's answer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum Block {
    /// Answer text
    Message { content: Option<String> },

    /// Citation entries, one `source` per entry when present
    Sources { sources: Vec<Option<String>> },

    /// Rendered image
    Image { url: Option<String> },

    /// Any block kind this tool does not render (CODE, TABLE, ...)
    Unknown { kind: String },
}

impl Block {
    pub fn message(content: impl Into<String>) -> Self {
        Block::Message {
            content: Some(content.into()),
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Block::Image { url: Some(url.into()) }
    }
}

/// Blocks are read from raw JSON so an odd entry never fails the whole job
impl From<Value> for Block {
    fn from(raw: Value) -> Self {
        let content = raw.get("content").unwrap_or(&Value::Null);
        let kind = match raw.get("type") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(Value::Null) | None => "",
            Some(_) => {
                return Block::Unknown {
                    kind: raw["type"].to_string(),
                };
            }
        };

        match kind {
            "MESSAGE" => Block::Message {
                content: content.as_str().map(String::from),
            },
            "SOURCES" => {
                let sources = content
                    .as_array()
                    .map(|entries| {
                        entries
                            .iter()
                            .map(|entry| entry.get("source").and_then(Value::as_str).map(String::from))
                            .collect()
                    })
                    .unwrap_or_default();
                Block::Sources { sources }
            }
            "IMAGE" => {
                let url = match content {
                    Value::String(url) => Some(url.clone()),
                    other => other.get("url").and_then(Value::as_str).map(String::from),
                };
                Block::Image { url }
            }
            other => Block::Unknown { kind: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_request_for_user() {
        let req = CreateSessionRequest::for_user("alice");
        let body = serde_json::to_value(&req).unwrap();

        assert_eq!(
            body,
            json!({
                "name": "Session for alice",
                "user_id": "alice",
                "output_language": "AUTO",
                "job_mode": "AUTO",
                "max_contextual_job_history": 10
            })
        );
    }

    #[test]
    fn test_job_request_defaults() {
        let req = CreateJobRequest::new("sess", "alice", "ds", "How many rows?");
        let body = serde_json::to_value(&req).unwrap();

        assert_eq!(body["stream"], false);
        assert_eq!(body["datasource_ids"], Value::Null);
        assert_eq!(body["custom_options"]["with_citation"], false);
        assert_eq!(body["output_language"], "AUTO");
        assert_eq!(body["job_mode"], "AUTO");
    }

    #[test]
    fn test_job_request_with_filter_and_citation() {
        let req = CreateJobRequest::new("sess", "alice", "ds", "q")
            .with_datasource_ids(Some(vec!["a".into(), "b".into()]))
            .with_citation(true);
        let body = serde_json::to_value(&req).unwrap();

        assert_eq!(body["datasource_ids"], json!(["a", "b"]));
        assert_eq!(body["custom_options"], json!({"with_citation": true}));
    }

    #[test]
    fn test_parse_datasource_ids_trims_and_keeps_order() {
        assert_eq!(
            parse_datasource_ids(Some("a, b ,c")),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_parse_datasource_ids_empty() {
        assert_eq!(parse_datasource_ids(None), None);
        assert_eq!(parse_datasource_ids(Some("")), None);
        assert_eq!(parse_datasource_ids(Some("  ")), None);
        assert_eq!(parse_datasource_ids(Some(" , ,")), None);
    }

    #[test]
    fn test_parse_datasource_ids_single() {
        assert_eq!(parse_datasource_ids(Some("only")), Some(vec!["only".to_string()]));
    }

    #[test]
    fn test_block_parsing() {
        let blocks: Vec<Block> = serde_json::from_value(json!([
            {"type": "MESSAGE", "content": "hi"},
            {"type": "IMAGE", "content": {"name": "chart", "url": "http://x/y.png"}},
            {"type": "SOURCES", "content": [{"source": "doc1"}, {"notsource": "x"}, "junk"]},
            {"type": "CODE", "content": "print(1)"},
            {"type": "MESSAGE"}
        ]))
        .unwrap();

        assert_eq!(blocks[0], Block::message("hi"));
        assert_eq!(blocks[1], Block::image("http://x/y.png"));
        assert_eq!(
            blocks[2],
            Block::Sources {
                sources: vec![Some("doc1".to_string()), None, None]
            }
        );
        assert_eq!(
            blocks[3],
            Block::Unknown {
                kind: "CODE".to_string()
            }
        );
        assert_eq!(blocks[4], Block::Message { content: None });
    }

    #[test]
    fn test_malformed_blocks_do_not_fail_the_job() {
        let data: JobData = serde_json::from_value(json!({
            "blocks": [
                {"type": null, "content": "x"},
                {"type": 7},
                "junk",
                {"type": "MESSAGE", "content": "hi"},
                {"content": "no tag"}
            ]
        }))
        .unwrap();

        assert_eq!(
            data.blocks,
            vec![
                Block::Unknown { kind: String::new() },
                Block::Unknown { kind: "7".to_string() },
                Block::Unknown { kind: String::new() },
                Block::message("hi"),
                Block::Unknown { kind: String::new() },
            ]
        );
    }

    #[test]
    fn test_image_block_without_url() {
        let block: Block = serde_json::from_value(json!({"type": "IMAGE", "content": {}})).unwrap();
        assert_eq!(block, Block::Image { url: None });
    }

    #[test]
    fn test_job_data_without_blocks() {
        let data: JobData = serde_json::from_value(json!({"job_id": "j1"})).unwrap();
        assert!(data.blocks.is_empty());
    }

    #[test]
    fn test_envelope_without_data() {
        let env: ApiEnvelope<SessionData> = serde_json::from_value(json!({"code": 0})).unwrap();
        assert!(env.data.is_none());
    }
}
