//! Invocation parameters for the chat tool

use serde_json::Value;

use crate::api::parse_datasource_ids;
use crate::error::{PowerdrillError, Result};

/// Mandatory parameters, in the order they are checked
pub const REQUIRED_PARAMS: [&str; 5] = ["api_key", "base_url", "user_id", "question", "dataset_id"];

/// Validated parameters of one invocation
#[derive(Clone, PartialEq, Eq)]
pub struct ChatParameters {
    pub api_key: String,
    pub base_url: String,
    /// Powerdrill user id, not the id of whoever is driving the host
    pub user_id: String,
    pub question: String,
    pub dataset_id: String,
    pub datasource_ids: Option<Vec<String>>,
    pub with_citation: bool,
}

impl ChatParameters {
    /// Read parameters from the host's JSON object.
    ///
    /// Empty strings count as missing, as do `null` values. Every error is a
    /// parameter error (`MissingParameter` or `InvalidParameter`).
    pub fn from_value(params: &Value) -> Result<Self> {
        Ok(Self {
            api_key: required(params, "api_key")?,
            base_url: required(params, "base_url")?,
            user_id: required(params, "user_id")?,
            question: required(params, "question")?,
            dataset_id: required(params, "dataset_id")?,
            datasource_ids: parse_datasource_ids(optional_str(params, "datasource_id")?),
            with_citation: flag(params, "with_citation")?,
        })
    }
}

impl std::fmt::Debug for ChatParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatParameters")
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .field("question", &self.question)
            .field("dataset_id", &self.dataset_id)
            .field("datasource_ids", &self.datasource_ids)
            .field("with_citation", &self.with_citation)
            .finish()
    }
}

fn required(params: &Value, name: &str) -> Result<String> {
    match optional_str(params, name)? {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(PowerdrillError::MissingParameter(name.to_string())),
    }
}

fn optional_str<'a>(params: &'a Value, name: &str) -> Result<Option<&'a str>> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(PowerdrillError::InvalidParameter {
            name: name.to_string(),
            message: "expected a string".to_string(),
        }),
    }
}

fn flag(params: &Value, name: &str) -> Result<bool> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        // Form-based hosts send booleans as text
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            _ => Err(PowerdrillError::InvalidParameter {
                name: name.to_string(),
                message: format!("expected a boolean, got {:?}", s),
            }),
        },
        Some(_) => Err(PowerdrillError::InvalidParameter {
            name: name.to_string(),
            message: "expected a boolean".to_string(),
        }),
    }
}
