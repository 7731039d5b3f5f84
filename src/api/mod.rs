//! Powerdrill API layer
//!
//! This module provides:
//! - Wire types for session and job requests and the typed response blocks
//! - PowerdrillApi trait for API abstraction
//! - PowerdrillClient implementation over reqwest
//! - MockPowerdrillApi for tests

pub mod client;
pub mod http;
pub mod types;

pub use client::{MockPowerdrillApi, PowerdrillApi};
pub use http::{API_KEY_HEADER, ClientConfig, DEFAULT_BASE_URL, PowerdrillClient};
pub use types::{
    ApiEnvelope, Block, CreateJobRequest, CreateSessionRequest, CustomOptions, JobData, SessionData,
    parse_datasource_ids,
};
