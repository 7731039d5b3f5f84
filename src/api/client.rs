//! Client trait for the Powerdrill team API, plus an in-memory mock

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::types::{CreateJobRequest, CreateSessionRequest, JobData};
use crate::error::{PowerdrillError, Result};

/// The two upstream calls this tool makes. Each call is independent.
#[async_trait]
pub trait PowerdrillApi: Send + Sync {
    /// Create a session and return its id
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<String>;

    /// Run one question to completion (non-streaming) and return its payload
    async fn create_job(&self, request: &CreateJobRequest) -> Result<JobData>;
}

/// Scripted client for tests: records every request and replays queued jobs
#[derive(Debug, Default)]
pub struct MockPowerdrillApi {
    session_requests: Mutex<Vec<CreateSessionRequest>>,
    job_requests: Mutex<Vec<CreateJobRequest>>,
    jobs: Mutex<VecDeque<JobData>>,
    fail_sessions_with: Mutex<Option<u16>>,
    fail_jobs_with: Mutex<Option<u16>>,
}

impl MockPowerdrillApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a job payload; jobs are returned in FIFO order, then empty
    pub fn with_job(self, job: JobData) -> Self {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).push_back(job);
        self
    }

    /// Make every session creation fail with the given HTTP status
    pub fn fail_sessions(self, status: u16) -> Self {
        *self.fail_sessions_with.lock().unwrap_or_else(|e| e.into_inner()) = Some(status);
        self
    }

    /// Make every job creation fail with the given HTTP status
    pub fn fail_jobs(self, status: u16) -> Self {
        *self.fail_jobs_with.lock().unwrap_or_else(|e| e.into_inner()) = Some(status);
        self
    }

    pub fn session_requests(&self) -> Vec<CreateSessionRequest> {
        self.session_requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn job_requests(&self) -> Vec<CreateJobRequest> {
        self.job_requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn failure(status: Option<u16>) -> Result<()> {
        match status {
            Some(status) => Err(PowerdrillError::Api {
                status,
                message: "mock failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PowerdrillApi for MockPowerdrillApi {
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<String> {
        let count = {
            let mut requests = self.session_requests.lock().unwrap_or_else(|e| e.into_inner());
            requests.push(request.clone());
            requests.len()
        };
        Self::failure(*self.fail_sessions_with.lock().unwrap_or_else(|e| e.into_inner()))?;
        Ok(format!("session-{}-{}", request.user_id, count))
    }

    async fn create_job(&self, request: &CreateJobRequest) -> Result<JobData> {
        self.job_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        Self::failure(*self.fail_jobs_with.lock().unwrap_or_else(|e| e.into_inner()))?;
        Ok(self
            .jobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_default())
    }
}
